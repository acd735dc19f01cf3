//! Integration tests for the `export_units!` registration convention.

use modhost_sdk::prelude::*;
use modhost_sdk::UNIT_ABI_VERSION;

struct Motd {
    version: Version,
}

impl Default for Motd {
    fn default() -> Self {
        Self {
            version: Version::new(1, 0, 0),
        }
    }
}

impl Plugin for Motd {
    fn name(&self) -> &str {
        "motd"
    }

    fn author(&self) -> &str {
        "Test Author"
    }

    fn version(&self) -> &Version {
        &self.version
    }

    fn on_enabled(&mut self) -> UnitResult<()> {
        Ok(())
    }
}

struct LockedDoors {
    applied: bool,
    version: Version,
}

impl Default for LockedDoors {
    fn default() -> Self {
        Self {
            applied: false,
            version: Version::new(0, 1, 0),
        }
    }
}

impl Patch for LockedDoors {
    fn name(&self) -> &str {
        "locked-doors"
    }

    fn apply(&mut self) -> UnitResult<()> {
        self.applied = true;
        Ok(())
    }

    fn unapply(&mut self) -> UnitResult<()> {
        self.applied = false;
        Ok(())
    }
}

impl Plugin for LockedDoors {
    fn name(&self) -> &str {
        "locked-doors"
    }

    fn author(&self) -> &str {
        "Test Author"
    }

    fn version(&self) -> &Version {
        &self.version
    }

    fn on_enabled(&mut self) -> UnitResult<()> {
        Ok(())
    }
}

modhost_sdk::export_units!(
    plugin: Motd,
    patch: LockedDoors,
    plugin: LockedDoors,
);

#[test]
fn test_abi_version_symbol() {
    assert_eq!(modhost_abi_version(), UNIT_ABI_VERSION);
}

#[test]
fn test_register_units_in_declaration_order() {
    let mut registrar = UnitRegistrar::new();
    modhost_register_units(&mut registrar);

    let exports = registrar.into_exports();
    assert_eq!(exports.len(), 3);

    assert!(exports[0].type_name.ends_with("Motd"));
    assert_eq!(exports[0].capability(), Capability::Plugin);

    assert!(exports[1].type_name.ends_with("LockedDoors"));
    assert_eq!(exports[1].capability(), Capability::Patch);

    assert_eq!(exports[2].type_name, exports[1].type_name);
    assert_eq!(exports[2].capability(), Capability::Plugin);
}

#[test]
fn test_exported_patch_applies() {
    let mut registrar = UnitRegistrar::new();
    modhost_register_units(&mut registrar);

    let patch_export = registrar
        .exports()
        .iter()
        .find(|e| e.satisfies(Capability::Patch))
        .expect("patch export");

    let UnitFactory::Patch(create) = patch_export.factory else {
        panic!("expected a patch factory");
    };
    let mut patch = create().unwrap();
    assert_eq!(patch.name(), "locked-doors");
    assert!(patch.apply().is_ok());
    assert!(patch.unapply().is_ok());
}
