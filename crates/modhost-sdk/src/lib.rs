//! modhost Unit SDK
//!
//! This SDK defines the contract between the modhost host and the units it
//! loads from dynamic libraries. A unit is either a [`Plugin`] (long-lived,
//! enabled once at load) or a [`Patch`] (applied once at load).
//!
//! # Quick Start
//!
//! ```rust
//! use modhost_sdk::prelude::*;
//!
//! struct Greeter {
//!     version: Version,
//! }
//!
//! impl Default for Greeter {
//!     fn default() -> Self {
//!         Self { version: Version::new(0, 1, 0) }
//!     }
//! }
//!
//! impl Plugin for Greeter {
//!     fn name(&self) -> &str { "greeter" }
//!     fn author(&self) -> &str { "someone" }
//!     fn version(&self) -> &Version { &self.version }
//!     fn on_enabled(&mut self) -> UnitResult<()> { Ok(()) }
//! }
//!
//! modhost_sdk::export_units!(plugin: Greeter);
//! ```
//!
//! # FFI Exports
//!
//! A unit binary exports two symbols, both generated by [`export_units!`]:
//! - `modhost_abi_version()` -> u32 (must equal [`UNIT_ABI_VERSION`])
//! - `modhost_register_units(&mut UnitRegistrar)`
//!
//! Host and units must be built with the same toolchain and the same
//! version of this crate, since trait objects cross the library boundary.
//!
//! # Panics
//!
//! A panic cannot unwind across the library boundary. Units exported with
//! `plugin:` / `patch:` are wrapped in [`GuardedPlugin`] / [`GuardedPatch`],
//! and the generated registration function runs under
//! [`UnitRegistrar::run_guarded`], so panics reach the host as
//! [`UnitError::Panicked`]. Units must not be built with `panic = "abort"`.

pub mod contract;
pub mod error;
pub mod guard;
#[macro_use]
pub mod macros;
pub mod registrar;

pub use contract::{Capability, Patch, Plugin};
pub use error::{UnitError, UnitResult};
pub use guard::{GuardedPatch, GuardedPlugin};
pub use registrar::{
    PatchFactory, PluginFactory, RegisterFn, UnitExport, UnitFactory, UnitRegistrar,
    ABI_VERSION_SYMBOL, REGISTER_SYMBOL, UNIT_ABI_VERSION,
};

/// Re-exported so units do not need their own `semver` dependency.
pub use semver::Version;

/// Prelude module with common imports
pub mod prelude {
    pub use crate::contract::{Capability, Patch, Plugin};
    pub use crate::error::{UnitError, UnitResult};
    pub use crate::registrar::{UnitExport, UnitFactory, UnitRegistrar};
    pub use semver::Version;
}
