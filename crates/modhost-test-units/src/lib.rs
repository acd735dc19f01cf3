//! Unit binary used by the native loader tests.
//!
//! Every unit here misbehaves in one place except `Steady`. Built with the
//! `stale-abi` feature the binary reports an ABI version one past the host's.

use modhost_sdk::prelude::*;

macro_rules! plugin {
    ($ty:ident, $name:expr, on_enabled: $enabled:expr) => {
        pub struct $ty {
            version: Version,
        }

        impl Default for $ty {
            fn default() -> Self {
                Self {
                    version: Version::new(0, 1, 0),
                }
            }
        }

        impl Plugin for $ty {
            fn name(&self) -> &str {
                $name
            }
            fn author(&self) -> &str {
                "fixtures"
            }
            fn version(&self) -> &Version {
                &self.version
            }
            fn on_enabled(&mut self) -> UnitResult<()> {
                $enabled
            }
        }
    };
}

plugin!(Panicky, "panicky", on_enabled: panic!("enable exploded"));
plugin!(Steady, "steady", on_enabled: Ok(()));

/// Panics before it exists.
pub struct Stillborn {
    version: Version,
}

impl Default for Stillborn {
    fn default() -> Self {
        panic!("constructor exploded")
    }
}

impl Plugin for Stillborn {
    fn name(&self) -> &str {
        "stillborn"
    }
    fn author(&self) -> &str {
        "fixtures"
    }
    fn version(&self) -> &Version {
        &self.version
    }
    fn on_enabled(&mut self) -> UnitResult<()> {
        Ok(())
    }
}

/// Applies cleanly and panics on the way out.
#[derive(Default)]
pub struct Sticky;

impl Patch for Sticky {
    fn name(&self) -> &str {
        "sticky"
    }
    fn apply(&mut self) -> UnitResult<()> {
        Ok(())
    }
    fn unapply(&mut self) -> UnitResult<()> {
        panic!("unapply exploded")
    }
}

#[cfg(not(feature = "stale-abi"))]
modhost_sdk::export_units!(
    plugin: Panicky,
    plugin: Stillborn,
    plugin: Steady,
    patch: Sticky,
);

#[cfg(feature = "stale-abi")]
#[no_mangle]
pub extern "C" fn modhost_abi_version() -> u32 {
    modhost_sdk::UNIT_ABI_VERSION + 1
}

#[cfg(feature = "stale-abi")]
#[no_mangle]
pub fn modhost_register_units(registrar: &mut UnitRegistrar) {
    registrar.run_guarded(|registrar| {
        registrar.plugin::<Steady>();
    });
}
