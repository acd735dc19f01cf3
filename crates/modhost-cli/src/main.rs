//! Command-line host for the modhost extension framework.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use modhost_core::config::env_vars;
use modhost_core::prelude::*;
use modhost_core::{
    discover, register_warhead_handler, BinaryLoader, Broadcaster, ConsoleSink, EventManager,
    NativeLoader, WarheadDetonated,
};

/// Loads plugins and patches from the modhost directory tree.
#[derive(Parser, Debug)]
#[command(name = "modhost")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Action to perform. Defaults to `run`.
    #[command(subcommand)]
    command: Option<Command>,

    /// Configuration file (TOML).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Base directory holding Plugins/, Configs/, Logs/ and Patches/.
    #[arg(short, long, global = true)]
    base_dir: Option<PathBuf>,

    /// Do not print the startup banner.
    #[arg(long, global = true)]
    no_banner: bool,

    /// Write coloured console lines instead of tracing events.
    #[arg(long, global = true)]
    console: bool,

    /// Verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Bootstrap the layout, load every plugin and patch, then shut down.
    Run,
    /// Load everything and list the registered units.
    List {
        /// Print descriptors as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Check that a binary loads and show the units it exports.
    Validate {
        /// Path to the binary.
        #[arg(required = true)]
        path: PathBuf,
    },
    /// Load everything and dispatch a warhead-detonated event.
    Warhead,
}

/// Broadcasts through the log, for hosts without connected players.
struct LogBroadcaster;

impl Broadcaster for LogBroadcaster {
    fn broadcast(&self, message: &str, duration: Duration) {
        tracing::info!(target: "modhost", seconds = duration.as_secs(), "Broadcast: {}", message);
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut config = FrameworkConfig::load(args.config.as_deref())
        .with_context(|| "Failed to load configuration")?;
    if let Some(base_dir) = &args.base_dir {
        config.base_dir = base_dir.clone();
    }
    if args.no_banner {
        config.show_banner = false;
    }

    let sink: Arc<dyn LogSink> = if args.console {
        Arc::new(ConsoleSink)
    } else {
        Arc::new(TracingSink)
    };

    match args.command.unwrap_or(Command::Run) {
        Command::Run => run(config, sink),
        Command::List { json } => list(config, sink, json),
        Command::Validate { path } => validate(&path),
        Command::Warhead => warhead(config, sink),
    }
}

fn init_tracing(verbose: bool) {
    let json_logging = std::env::var(env_vars::LOG_JSON)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(false);

    let default_filter = if verbose { "modhost=debug" } else { "modhost=info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .compact()
            .with_level(false)
            .init();
    }
}

fn run(config: FrameworkConfig, sink: Arc<dyn LogSink>) -> Result<()> {
    let mut manager = ExtensionManager::new(config, sink);
    manager.initialize();
    shutdown(&mut manager);
    Ok(())
}

fn list(mut config: FrameworkConfig, sink: Arc<dyn LogSink>, json: bool) -> Result<()> {
    config.show_banner = false;
    let mut manager = ExtensionManager::new(config, sink);
    manager.initialize();

    let descriptors = manager.registry().descriptors();
    if json {
        println!("{}", serde_json::to_string_pretty(&descriptors)?);
    } else if descriptors.is_empty() {
        println!("No units loaded.");
    } else {
        for d in &descriptors {
            let version = d.version.as_deref().map(|v| format!(" v{v}")).unwrap_or_default();
            println!(
                "{:<7} {}{}  ({})",
                d.capability.as_str(),
                d.name,
                version,
                d.source.display()
            );
        }
    }

    shutdown(&mut manager);
    Ok(())
}

fn validate(path: &std::path::Path) -> Result<()> {
    let mut loader = NativeLoader::new();
    let binary = loader
        .load(path)
        .with_context(|| format!("{} is not a valid unit binary", path.display()))?;

    println!("{}", binary.path().display());
    for capability in [Capability::Plugin, Capability::Patch] {
        for export in discover(&binary, capability) {
            println!("  {:<7} {}", capability.as_str(), export.type_name);
        }
    }
    if binary.exports().is_empty() {
        println!("  (no units exported)");
    }
    Ok(())
}

fn warhead(config: FrameworkConfig, sink: Arc<dyn LogSink>) -> Result<()> {
    let mut manager = ExtensionManager::new(config, Arc::clone(&sink));
    manager.initialize();

    let events = EventManager::new();
    register_warhead_handler(&events, sink, Arc::new(LogBroadcaster));
    events.dispatch(&WarheadDetonated);

    shutdown(&mut manager);
    Ok(())
}

fn shutdown(manager: &mut ExtensionManager) {
    for result in manager.shutdown() {
        if let Err(e) = result {
            tracing::warn!(target: "modhost", error = %e, "Unit teardown failed");
        }
    }
}
