//! Native loader integration tests.
//!
//! These build real unit libraries from the workspace and load them through
//! `ExtensionManager::new`, which uses `NativeLoader`.

mod common;

use std::path::Path;
use std::sync::Arc;

use modhost_core::prelude::*;
use modhost_core::{BinaryLoader, MemorySink, NativeLoader};

fn setup(base: &Path) -> (ExtensionManager, Arc<MemorySink>) {
    let mut config = FrameworkConfig::with_base_dir(base);
    config.show_banner = false;
    let sink = Arc::new(MemorySink::new());
    let manager = ExtensionManager::new(config, sink.clone());
    manager.bootstrap().unwrap();
    (manager, sink)
}

#[test]
fn test_sample_units_load_and_unload() {
    let library = common::unit_library("modhost-sample-units", &[]);
    let temp = tempfile::tempdir().unwrap();
    let (mut manager, sink) = setup(temp.path());
    common::install(&library, &manager.layout().plugins, "samples");
    common::install(&library, &manager.layout().patches, "samples");

    let report = manager.run();

    assert_eq!(report.error_count(), 0, "{:?}", sink.messages());
    let plugins: Vec<_> = manager
        .registry()
        .plugins()
        .map(|(_, p)| format!("{} v{}", p.name(), p.version()))
        .collect();
    assert_eq!(plugins, vec!["welcome v1.0.0", "night-lights v0.2.1"]);
    let patches: Vec<_> = manager
        .registry()
        .patches()
        .map(|(_, p)| p.name().to_string())
        .collect();
    assert_eq!(patches, vec!["fast-doors", "night-lights"]);
    assert_eq!(sink.count_containing("Loaded: welcome v1.0.0"), 1);
    assert_eq!(sink.count_containing("The patch has been loaded: fast-doors"), 1);

    let results = manager.shutdown();

    assert_eq!(results.len(), 4);
    assert!(results.iter().all(|r| r.is_ok()));
    assert!(manager.registry().is_empty());
    assert_eq!(sink.count_containing("Unloaded patch: fast-doors"), 1);
    assert_eq!(sink.count_containing("Unloaded plugin: welcome"), 1);
}

#[test]
fn test_native_loader_caches_by_canonical_path() {
    let library = common::unit_library("modhost-sample-units", &[]);
    let temp = tempfile::tempdir().unwrap();
    let installed = common::install(&library, temp.path(), "samples");

    let mut loader = NativeLoader::new();
    let first = loader.load(&installed).unwrap();
    let again = loader.load(&installed).unwrap();

    assert_eq!(first.exports().len(), 4);
    assert_eq!(again.exports().len(), 4);
    assert!(first.library().is_some());
    assert_eq!(loader.loaded_count(), 1);
}

#[test]
fn test_panicking_units_are_isolated() {
    let library = common::unit_library("modhost-test-units", &[]);
    let temp = tempfile::tempdir().unwrap();
    let (mut manager, sink) = setup(temp.path());
    common::install(&library, &manager.layout().plugins, "fixtures");
    common::install(&library, &manager.layout().patches, "fixtures");

    let report = manager.run();

    // `Panicky` panics in on_enabled, `Stillborn` in its constructor.
    assert_eq!(report.initialization_errors(), 2);
    assert_eq!(report.load_errors(), 0);
    assert_eq!(sink.count_containing("panicked: enable exploded"), 1);
    assert_eq!(sink.count_containing("panicked: constructor exploded"), 1);
    assert_eq!(sink.count_containing("Loaded: steady v0.1.0"), 1);
    assert_eq!(manager.registry().plugin_count(), 1);
    assert_eq!(manager.registry().patch_count(), 1);
    assert_eq!(sink.count_containing("Framework loaded successfully!"), 1);

    let results = manager.shutdown();

    assert_eq!(results.len(), 2);
    match &results[0] {
        Err(Error::Teardown { name, reason }) => {
            assert_eq!(name, "sticky");
            assert!(reason.contains("unapply exploded"), "{reason}");
        }
        other => panic!("expected a teardown error, got {other:?}"),
    }
    assert!(results[1].is_ok());
    assert!(manager.registry().is_empty());
}

#[test]
fn test_stale_abi_version_is_a_load_error() {
    let library = common::unit_library("modhost-test-units", &["stale-abi"]);
    let temp = tempfile::tempdir().unwrap();
    let (mut manager, sink) = setup(temp.path());
    let installed = common::install(&library, &manager.layout().plugins, "stale");

    let report = manager.run();

    assert_eq!(report.load_errors(), 1);
    assert!(manager.registry().is_empty());
    assert_eq!(sink.count_containing("ABI version mismatch"), 1);
    let name = installed.file_name().unwrap().to_string_lossy().into_owned();
    assert_eq!(sink.count_containing(&format!("Error loading {name}")), 1);
}
