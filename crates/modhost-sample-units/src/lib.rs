//! Sample units for modhost.
//!
//! Build with `cargo build -p modhost-sample-units` and copy the resulting
//! dynamic library into `Plugins/`, `Patches/` or both.

use modhost_sdk::prelude::*;

/// Greets the server once it is up.
pub struct Welcome {
    version: Version,
    greeted: bool,
}

impl Default for Welcome {
    fn default() -> Self {
        Self {
            version: Version::new(1, 0, 0),
            greeted: false,
        }
    }
}

impl Welcome {
    pub fn greeted(&self) -> bool {
        self.greeted
    }
}

impl Plugin for Welcome {
    fn name(&self) -> &str {
        "welcome"
    }

    fn author(&self) -> &str {
        "modhost"
    }

    fn version(&self) -> &Version {
        &self.version
    }

    fn on_enabled(&mut self) -> UnitResult<()> {
        self.greeted = true;
        Ok(())
    }

    fn on_disabled(&mut self) -> UnitResult<()> {
        self.greeted = false;
        Ok(())
    }
}

/// Halves the door animation time.
#[derive(Default)]
pub struct FastDoors {
    speed: f32,
}

impl FastDoors {
    pub const BOOST: f32 = 2.0;

    pub fn speed(&self) -> f32 {
        self.speed
    }
}

impl Patch for FastDoors {
    fn name(&self) -> &str {
        "fast-doors"
    }

    fn apply(&mut self) -> UnitResult<()> {
        if self.speed != 0.0 {
            return Err(UnitError::initialization("already applied"));
        }
        self.speed = Self::BOOST;
        Ok(())
    }

    fn unapply(&mut self) -> UnitResult<()> {
        self.speed = 0.0;
        Ok(())
    }
}

/// A plugin that also patches the facility lighting.
pub struct NightLights {
    version: Version,
    dimmed: bool,
}

impl Default for NightLights {
    fn default() -> Self {
        Self {
            version: Version::new(0, 2, 1),
            dimmed: false,
        }
    }
}

impl Plugin for NightLights {
    fn name(&self) -> &str {
        "night-lights"
    }

    fn author(&self) -> &str {
        "modhost"
    }

    fn version(&self) -> &Version {
        &self.version
    }

    fn on_enabled(&mut self) -> UnitResult<()> {
        Ok(())
    }
}

impl Patch for NightLights {
    fn name(&self) -> &str {
        "night-lights"
    }

    fn apply(&mut self) -> UnitResult<()> {
        self.dimmed = true;
        Ok(())
    }

    fn unapply(&mut self) -> UnitResult<()> {
        self.dimmed = false;
        Ok(())
    }
}

modhost_sdk::export_units!(
    plugin: Welcome,
    patch: FastDoors,
    plugin: NightLights,
    patch: NightLights,
);
