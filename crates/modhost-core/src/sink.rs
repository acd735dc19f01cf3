//! Log sink abstraction.
//!
//! Every outcome the framework produces goes through a [`LogSink`] as soon as
//! it happens. The host decides where lines end up: [`TracingSink`] forwards
//! them to `tracing`, [`MemorySink`] keeps them for inspection.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Console colour attached to every log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsoleColor {
    Gray,
    Green,
    Blue,
    Cyan,
    Yellow,
    Red,
    DarkRed,
    DarkMagenta,
}

impl ConsoleColor {
    /// `tracing` level used when a line of this colour is forwarded.
    pub fn level(&self) -> tracing::Level {
        match self {
            ConsoleColor::Red | ConsoleColor::DarkRed => tracing::Level::ERROR,
            ConsoleColor::Gray => tracing::Level::DEBUG,
            _ => tracing::Level::INFO,
        }
    }

    /// ANSI foreground escape sequence.
    pub fn ansi(&self) -> &'static str {
        match self {
            ConsoleColor::Gray => "\x1b[37m",
            ConsoleColor::Green => "\x1b[92m",
            ConsoleColor::Blue => "\x1b[94m",
            ConsoleColor::Cyan => "\x1b[96m",
            ConsoleColor::Yellow => "\x1b[93m",
            ConsoleColor::Red => "\x1b[91m",
            ConsoleColor::DarkRed => "\x1b[31m",
            ConsoleColor::DarkMagenta => "\x1b[35m",
        }
    }
}

/// Append-only destination for framework log lines.
pub trait LogSink: Send + Sync {
    fn log(&self, message: &str, color: ConsoleColor);
}

/// Forwards lines to `tracing`, choosing the level from the colour.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, message: &str, color: ConsoleColor) {
        let level = color.level();
        if level == tracing::Level::ERROR {
            tracing::error!(target: "modhost", ?color, "{}", message);
        } else if level == tracing::Level::DEBUG {
            tracing::debug!(target: "modhost", ?color, "{}", message);
        } else {
            tracing::info!(target: "modhost", ?color, "{}", message);
        }
    }
}

/// Writes coloured lines straight to stdout, like a server console.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl LogSink for ConsoleSink {
    fn log(&self, message: &str, color: ConsoleColor) {
        println!("{}{}\x1b[0m", color.ansi(), message);
    }
}

/// A recorded log line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogLine {
    pub message: String,
    pub color: ConsoleColor,
}

/// Keeps every line in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<LogLine>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<LogLine> {
        self.lines.lock().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.lines.lock().iter().map(|l| l.message.clone()).collect()
    }

    /// Number of lines whose message contains `needle`.
    pub fn count_containing(&self, needle: &str) -> usize {
        self.lines
            .lock()
            .iter()
            .filter(|l| l.message.contains(needle))
            .count()
    }

    pub fn clear(&self) {
        self.lines.lock().clear();
    }
}

impl LogSink for MemorySink {
    fn log(&self, message: &str, color: ConsoleColor) {
        self.lines.lock().push(LogLine {
            message: message.to_string(),
            color,
        });
    }
}
