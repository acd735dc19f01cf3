//! Registration entry point convention.
//!
//! Instead of scanning a binary for types, the host calls one exported
//! function per binary and hands it a [`UnitRegistrar`]. The binary appends
//! one [`UnitExport`] per unit type it provides, in a fixed order.

use std::any::type_name;

use crate::contract::{Capability, Patch, Plugin};
use crate::error::UnitResult;
use crate::guard::{self, GuardedPatch, GuardedPlugin};

/// Current unit ABI version.
/// Binaries must report this version to be loaded.
pub const UNIT_ABI_VERSION: u32 = 1;

/// Exported symbol returning the binary's ABI version.
pub const ABI_VERSION_SYMBOL: &[u8] = b"modhost_abi_version\0";

/// Exported symbol that fills a [`UnitRegistrar`].
pub const REGISTER_SYMBOL: &[u8] = b"modhost_register_units\0";

/// Signature of the registration symbol.
pub type RegisterFn = fn(&mut UnitRegistrar);

/// Constructs a fresh plugin instance.
pub type PluginFactory = fn() -> UnitResult<Box<dyn Plugin>>;

/// Constructs a fresh patch instance.
pub type PatchFactory = fn() -> UnitResult<Box<dyn Patch>>;

/// Factory for one capability of one exported type.
#[derive(Clone, Copy)]
pub enum UnitFactory {
    Plugin(PluginFactory),
    Patch(PatchFactory),
}

impl UnitFactory {
    pub fn capability(&self) -> Capability {
        match self {
            UnitFactory::Plugin(_) => Capability::Plugin,
            UnitFactory::Patch(_) => Capability::Patch,
        }
    }
}

impl std::fmt::Debug for UnitFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "UnitFactory::{:?}", self.capability())
    }
}

/// One exported unit type and how to construct it.
#[derive(Debug, Clone)]
pub struct UnitExport {
    /// Fully qualified Rust type name of the unit
    pub type_name: &'static str,

    /// Constructor for the capability this export satisfies
    pub factory: UnitFactory,
}

impl UnitExport {
    pub fn capability(&self) -> Capability {
        self.factory.capability()
    }

    pub fn satisfies(&self, capability: Capability) -> bool {
        self.capability() == capability
    }
}

/// Collects the unit exports of one binary.
#[derive(Debug, Default)]
pub struct UnitRegistrar {
    exports: Vec<UnitExport>,
    failure: Option<String>,
}

impl UnitRegistrar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run a registration function, catching a panic in it.
    ///
    /// On a panic every export collected so far is discarded and the panic
    /// message is kept in [`failure`](Self::failure).
    pub fn run_guarded<F>(&mut self, register: F)
    where
        F: FnOnce(&mut Self),
    {
        let result = guard::catch(|| {
            register(self);
            Ok(())
        });
        if let Err(err) = result {
            self.exports.clear();
            self.failure = Some(err.to_string());
        }
    }

    /// Why registration failed, if it did.
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// Export a default-constructible plugin type.
    ///
    /// Construction and every hook run behind a [`GuardedPlugin`].
    pub fn plugin<T>(&mut self) -> &mut Self
    where
        T: Plugin + Default + 'static,
    {
        self.plugin_with(type_name::<T>(), default_plugin::<T>)
    }

    /// Export a patch type that is default-constructible.
    ///
    /// Construction and every hook run behind a [`GuardedPatch`].
    pub fn patch<T>(&mut self) -> &mut Self
    where
        T: Patch + Default + 'static,
    {
        self.patch_with(type_name::<T>(), default_patch::<T>)
    }

    /// Export a plugin with a fallible constructor.
    ///
    /// The factory runs unguarded. Wrap the unit it returns in
    /// [`GuardedPlugin`] to keep its hooks from unwinding into the host.
    pub fn plugin_with(&mut self, type_name: &'static str, factory: PluginFactory) -> &mut Self {
        self.exports.push(UnitExport {
            type_name,
            factory: UnitFactory::Plugin(factory),
        });
        self
    }

    /// Export a patch with a fallible constructor. See
    /// [`plugin_with`](Self::plugin_with).
    pub fn patch_with(&mut self, type_name: &'static str, factory: PatchFactory) -> &mut Self {
        self.exports.push(UnitExport {
            type_name,
            factory: UnitFactory::Patch(factory),
        });
        self
    }

    pub fn exports(&self) -> &[UnitExport] {
        &self.exports
    }

    pub fn into_exports(self) -> Vec<UnitExport> {
        self.exports
    }

    pub fn is_empty(&self) -> bool {
        self.exports.is_empty()
    }
}

fn default_plugin<T: Plugin + Default + 'static>() -> UnitResult<Box<dyn Plugin>> {
    let plugin = guard::catch(|| Ok(T::default()))?;
    Ok(Box::new(GuardedPlugin::new(plugin)?))
}

fn default_patch<T: Patch + Default + 'static>() -> UnitResult<Box<dyn Patch>> {
    let patch = guard::catch(|| Ok(T::default()))?;
    Ok(Box::new(GuardedPatch::new(patch)?))
}
