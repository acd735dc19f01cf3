//! The two capability contracts a loadable unit may implement.

use std::fmt::{self, Display, Formatter};

use semver::Version;

use crate::error::UnitResult;

/// A long-lived feature module.
///
/// The host calls [`Plugin::on_enabled`] exactly once, after construction and
/// before the instance becomes visible in the registry. [`Plugin::on_disabled`]
/// is only called when the host explicitly unloads the unit.
pub trait Plugin: Send {
    /// Display name.
    fn name(&self) -> &str;

    /// Author name.
    fn author(&self) -> &str;

    /// Semantic version of the plugin.
    fn version(&self) -> &Version;

    /// Enable the plugin. An error keeps the plugin out of the registry.
    fn on_enabled(&mut self) -> UnitResult<()>;

    /// Disable the plugin before it is dropped.
    fn on_disabled(&mut self) -> UnitResult<()> {
        Ok(())
    }
}

/// A one-shot behavioural modification.
///
/// [`Patch::apply`] is called exactly once at load; [`Patch::unapply`] only on
/// explicit unload.
pub trait Patch: Send {
    /// Display name.
    fn name(&self) -> &str;

    /// Apply the modification. An error keeps the patch out of the registry.
    fn apply(&mut self) -> UnitResult<()>;

    /// Revert the modification.
    fn unapply(&mut self) -> UnitResult<()>;
}

/// Capability kinds a unit type can be discovered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Plugin,
    Patch,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Plugin => "plugin",
            Capability::Patch => "patch",
        }
    }
}

impl Display for Capability {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Dummy(Version);

    impl Plugin for Dummy {
        fn name(&self) -> &str {
            "dummy"
        }
        fn author(&self) -> &str {
            "tests"
        }
        fn version(&self) -> &Version {
            &self.0
        }
        fn on_enabled(&mut self) -> UnitResult<()> {
            Ok(())
        }
    }

    #[test]
    fn test_capability_display() {
        assert_eq!(Capability::Plugin.to_string(), "plugin");
        assert_eq!(Capability::Patch.to_string(), "patch");
    }

    #[test]
    fn test_default_on_disabled_is_noop() {
        let mut plugin = Dummy(Version::new(1, 2, 3));
        assert!(plugin.on_enabled().is_ok());
        assert!(plugin.on_disabled().is_ok());
        assert_eq!(plugin.version().to_string(), "1.2.3");
    }
}
