//! Extension manager: drives discovery passes and owns the unit registry.
//!
//! # Pass algorithm
//!
//! For one target directory and one capability:
//!
//! 1. enumerate candidate binaries; a missing or empty directory ends the pass
//!    with an informational outcome;
//! 2. for each binary in enumeration order, load it (a failure is recorded
//!    against that binary only) and discover the exports for the capability;
//! 3. for each export in discovery order, construct the unit and run its
//!    initialization hook (`on_enabled` / `apply`). Only a unit whose hook
//!    returned `Ok` is registered. Errors and panics are recorded against that
//!    unit and the pass moves on.
//!
//! A panic in unit code counts as a failed hook. Native units are guarded on
//! their own side of the library boundary, since a panic cannot unwind from
//! one copy of the standard library into another.
//!
//! Every outcome is sent to the log sink the moment it happens and also
//! collected into the returned [`PassReport`].

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;

use modhost_sdk::{Capability, UnitExport, UnitFactory};

use crate::banner;
use crate::config::FrameworkConfig;
use crate::discovery::discover;
use crate::error::{panic_message, Error, Result};
use crate::layout::Layout;
use crate::loader::{candidate_binaries, BinaryLoader, LoadedBinary, NativeLoader};
use crate::outcome::{Outcome, PassReport};
use crate::registry::{LoadedUnit, RegistryEntry, UnitDescriptor, UnitHandle, UnitRegistry};
use crate::sink::LogSink;

pub struct ExtensionManager {
    config: FrameworkConfig,
    layout: Layout,
    loader: Box<dyn BinaryLoader>,
    registry: UnitRegistry,
    sink: Arc<dyn LogSink>,
}

impl ExtensionManager {
    /// Manager loading native libraries from the configured base directory.
    pub fn new(config: FrameworkConfig, sink: Arc<dyn LogSink>) -> Self {
        Self::with_loader(config, Box::new(NativeLoader::new()), sink)
    }

    /// Manager using a custom binary loader.
    pub fn with_loader(
        config: FrameworkConfig,
        loader: Box<dyn BinaryLoader>,
        sink: Arc<dyn LogSink>,
    ) -> Self {
        let layout = Layout::new(&config.base_dir);
        Self {
            config,
            layout,
            loader,
            registry: UnitRegistry::new(),
            sink,
        }
    }

    pub fn config(&self) -> &FrameworkConfig {
        &self.config
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn registry(&self) -> &UnitRegistry {
        &self.registry
    }

    pub fn sink(&self) -> Arc<dyn LogSink> {
        Arc::clone(&self.sink)
    }

    /// Startup hook: banner, directory bootstrap, plugin pass, patch pass.
    ///
    /// Never fails; every outcome is observable through the log sink.
    pub fn initialize(&mut self) {
        self.run();
    }

    /// Same as [`initialize`](Self::initialize) but returns what was recorded.
    pub fn run(&mut self) -> PassReport {
        let mut report = PassReport::default();

        if self.config.show_banner {
            banner::display(self.sink.as_ref());
        }

        // Best effort: a bootstrap failure is reported and startup continues.
        if let Err(err) = self.layout.create_all() {
            self.record(
                &mut report,
                Outcome::BootstrapError {
                    reason: err.to_string(),
                },
            );
        }

        report.extend(self.load_plugins());
        report.extend(self.load_patches());

        self.record(
            &mut report,
            Outcome::FrameworkLoaded {
                plugins: self.registry.plugin_count(),
                patches: self.registry.patch_count(),
            },
        );
        report
    }

    /// Create the directory layout.
    pub fn bootstrap(&self) -> Result<()> {
        self.layout.create_all()
    }

    /// Discovery pass over the plugins directory.
    pub fn load_plugins(&mut self) -> PassReport {
        let dir = self.layout.plugins.clone();
        self.load_directory(&dir, Capability::Plugin)
    }

    /// Discovery pass over the patches directory.
    pub fn load_patches(&mut self) -> PassReport {
        let dir = self.layout.patches.clone();
        self.load_directory(&dir, Capability::Patch)
    }

    /// Discovery pass over `dir` for one capability.
    pub fn load_directory(&mut self, dir: &Path, capability: Capability) -> PassReport {
        let mut report = PassReport::default();

        let binaries = match candidate_binaries(dir, &self.config.binary_extension) {
            Ok(binaries) => binaries,
            Err(Error::DirectoryMissing(dir)) => {
                self.record(&mut report, Outcome::DirectoryMissing { capability, dir });
                return report;
            }
            Err(err) => {
                self.record(&mut report, Outcome::load_error(dir, &err));
                return report;
            }
        };

        if binaries.is_empty() {
            self.record(
                &mut report,
                Outcome::NoCandidates {
                    capability,
                    dir: dir.to_path_buf(),
                },
            );
            return report;
        }

        self.record(
            &mut report,
            Outcome::Searching {
                capability,
                dir: dir.to_path_buf(),
                candidates: binaries.len(),
            },
        );

        for path in &binaries {
            let binary = match self.load_binary(path) {
                Ok(binary) => binary,
                Err(err) => {
                    self.record(&mut report, Outcome::load_error(path, &err));
                    continue;
                }
            };

            for export in discover(&binary, capability) {
                self.activate(&binary, export, &mut report);
            }
        }

        report
    }

    fn load_binary(&mut self, path: &Path) -> Result<LoadedBinary> {
        let loader = &mut self.loader;
        catch_unwind(AssertUnwindSafe(|| loader.load(path))).unwrap_or_else(|payload| {
            Err(Error::Load {
                path: path.to_path_buf(),
                reason: format!("Loader {}", panic_message(payload.as_ref())),
            })
        })
    }

    /// Construct and initialize one export, registering it on success.
    fn activate(&mut self, binary: &LoadedBinary, export: &UnitExport, report: &mut PassReport) {
        let unit = match initialize_unit(export) {
            Ok(unit) => unit,
            Err(Error::Initialization {
                capability,
                type_name,
                reason,
            }) => {
                self.record(
                    report,
                    Outcome::InitializationError {
                        capability,
                        type_name,
                        path: binary.path().to_path_buf(),
                        reason,
                    },
                );
                return;
            }
            Err(err) => {
                self.record(report, Outcome::load_error(binary.path(), &err));
                return;
            }
        };

        let outcome = match &unit {
            LoadedUnit::Plugin(plugin) => Outcome::PluginEnabled {
                name: plugin.name().to_string(),
                author: plugin.author().to_string(),
                version: plugin.version().to_string(),
                source: binary.path().to_path_buf(),
            },
            LoadedUnit::Patch(patch) => Outcome::PatchApplied {
                name: patch.name().to_string(),
                source: binary.path().to_path_buf(),
            },
        };

        let handle = self.registry.insert(RegistryEntry::new(
            unit,
            export.type_name,
            binary.path(),
            binary.library(),
        ));
        tracing::debug!(
            handle = handle.index(),
            unit = export.type_name,
            capability = %export.capability(),
            "Registered unit"
        );
        self.record(report, outcome);
    }

    /// Tear down and remove one unit.
    ///
    /// The entry is removed even if its teardown hook fails; the failure is
    /// returned as [`Error::Teardown`].
    pub fn unload(&mut self, handle: UnitHandle) -> Result<UnitDescriptor> {
        let mut entry = self
            .registry
            .take(handle)
            .ok_or(Error::UnknownHandle(handle.index()))?;
        let descriptor = entry.descriptor();

        let unit = &mut entry.unit;
        let result = catch_unwind(AssertUnwindSafe(|| match unit {
            LoadedUnit::Plugin(plugin) => plugin.on_disabled(),
            LoadedUnit::Patch(patch) => patch.unapply(),
        }));
        drop(entry);

        let failure = match result {
            Ok(Ok(())) => None,
            Ok(Err(err)) => Some(err.to_string()),
            Err(payload) => Some(panic_message(payload.as_ref())),
        };

        let mut report = PassReport::default();
        match failure {
            None => {
                self.record(
                    &mut report,
                    Outcome::UnitUnloaded {
                        capability: descriptor.capability,
                        name: descriptor.name.clone(),
                    },
                );
                Ok(descriptor)
            }
            Some(reason) => {
                self.record(
                    &mut report,
                    Outcome::TeardownError {
                        name: descriptor.name.clone(),
                        reason: reason.clone(),
                    },
                );
                Err(Error::Teardown {
                    name: descriptor.name,
                    reason,
                })
            }
        }
    }

    /// Unload every unit, most recently registered first.
    pub fn shutdown(&mut self) -> Vec<Result<UnitDescriptor>> {
        let mut handles = self.registry.handles();
        handles.reverse();
        handles.into_iter().map(|h| self.unload(h)).collect()
    }

    fn record(&self, report: &mut PassReport, outcome: Outcome) {
        self.sink.log(&outcome.message(), outcome.color());
        report.push(outcome);
    }
}

/// Construct a unit and run its initialization hook.
///
/// Units from native binaries catch their own panics (`modhost_sdk::guard`);
/// the `catch_unwind` here covers units linked into the host.
fn initialize_unit(export: &UnitExport) -> Result<LoadedUnit> {
    let attempt = catch_unwind(AssertUnwindSafe(|| -> std::result::Result<LoadedUnit, String> {
        match export.factory {
            UnitFactory::Plugin(create) => {
                let mut plugin = create().map_err(|e| e.to_string())?;
                plugin.on_enabled().map_err(|e| e.to_string())?;
                Ok(LoadedUnit::Plugin(plugin))
            }
            UnitFactory::Patch(create) => {
                let mut patch = create().map_err(|e| e.to_string())?;
                patch.apply().map_err(|e| e.to_string())?;
                Ok(LoadedUnit::Patch(patch))
            }
        }
    }));

    let reason = match attempt {
        Ok(Ok(unit)) => return Ok(unit),
        Ok(Err(reason)) => reason,
        Err(payload) => panic_message(payload.as_ref()),
    };
    Err(Error::Initialization {
        capability: export.capability(),
        type_name: export.type_name.to_string(),
        reason,
    })
}
