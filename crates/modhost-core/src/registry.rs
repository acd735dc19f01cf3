//! Unit registry.
//!
//! An append-only arena of initialized units. Handles stay valid until the
//! unit they name is unloaded; slots are never reused.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use libloading::Library;
use modhost_sdk::{Capability, Patch, Plugin};
use serde::Serialize;

/// Stable reference to a registered unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct UnitHandle(usize);

impl UnitHandle {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// An initialized unit instance.
pub enum LoadedUnit {
    Plugin(Box<dyn Plugin>),
    Patch(Box<dyn Patch>),
}

impl LoadedUnit {
    pub fn capability(&self) -> Capability {
        match self {
            LoadedUnit::Plugin(_) => Capability::Plugin,
            LoadedUnit::Patch(_) => Capability::Patch,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            LoadedUnit::Plugin(p) => p.name(),
            LoadedUnit::Patch(p) => p.name(),
        }
    }
}

impl std::fmt::Debug for LoadedUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedUnit")
            .field("capability", &self.capability())
            .field("name", &self.name())
            .finish()
    }
}

/// Read-only description of a registered unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitDescriptor {
    #[serde(serialize_with = "serialize_capability")]
    pub capability: Capability,
    pub name: String,
    /// Plugins only.
    pub author: Option<String>,
    /// Plugins only.
    pub version: Option<String>,
    pub type_name: String,
    pub source: PathBuf,
    pub loaded_at: DateTime<Utc>,
}

fn serialize_capability<S: serde::Serializer>(
    capability: &Capability,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(capability.as_str())
}

/// Registry slot. Field order matters: the unit is dropped before the
/// library that contains its code.
#[derive(Debug)]
pub(crate) struct RegistryEntry {
    pub(crate) unit: LoadedUnit,
    pub(crate) type_name: String,
    pub(crate) source: PathBuf,
    pub(crate) loaded_at: DateTime<Utc>,
    pub(crate) _library: Option<Arc<Library>>,
}

impl RegistryEntry {
    pub(crate) fn new(
        unit: LoadedUnit,
        type_name: &str,
        source: &Path,
        library: Option<Arc<Library>>,
    ) -> Self {
        Self {
            unit,
            type_name: type_name.to_string(),
            source: source.to_path_buf(),
            loaded_at: Utc::now(),
            _library: library,
        }
    }

    pub(crate) fn descriptor(&self) -> UnitDescriptor {
        let (author, version) = match &self.unit {
            LoadedUnit::Plugin(p) => (Some(p.author().to_string()), Some(p.version().to_string())),
            LoadedUnit::Patch(_) => (None, None),
        };
        UnitDescriptor {
            capability: self.unit.capability(),
            name: self.unit.name().to_string(),
            author,
            version,
            type_name: self.type_name.clone(),
            source: self.source.clone(),
            loaded_at: self.loaded_at,
        }
    }
}

/// Ordered collections of loaded plugins and patches.
#[derive(Debug, Default)]
pub struct UnitRegistry {
    entries: Vec<Option<RegistryEntry>>,
}

impl UnitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an initialized unit. Only the extension manager inserts, after
    /// the unit's initialization hook succeeded.
    pub(crate) fn insert(&mut self, entry: RegistryEntry) -> UnitHandle {
        let handle = UnitHandle(self.entries.len());
        self.entries.push(Some(entry));
        handle
    }

    /// Remove and return an entry.
    pub(crate) fn take(&mut self, handle: UnitHandle) -> Option<RegistryEntry> {
        self.entries.get_mut(handle.0).and_then(Option::take)
    }

    fn live(&self) -> impl Iterator<Item = (UnitHandle, &RegistryEntry)> {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(i, e)| e.as_ref().map(|e| (UnitHandle(i), e)))
    }

    /// Loaded plugins in registration order.
    pub fn plugins(&self) -> impl Iterator<Item = (UnitHandle, &dyn Plugin)> {
        self.live().filter_map(|(h, e)| match &e.unit {
            LoadedUnit::Plugin(p) => Some((h, p.as_ref())),
            LoadedUnit::Patch(_) => None,
        })
    }

    /// Loaded patches in registration order.
    pub fn patches(&self) -> impl Iterator<Item = (UnitHandle, &dyn Patch)> {
        self.live().filter_map(|(h, e)| match &e.unit {
            LoadedUnit::Patch(p) => Some((h, p.as_ref())),
            LoadedUnit::Plugin(_) => None,
        })
    }

    pub fn get(&self, handle: UnitHandle) -> Option<&LoadedUnit> {
        self.entries
            .get(handle.0)
            .and_then(Option::as_ref)
            .map(|e| &e.unit)
    }

    pub fn get_mut(&mut self, handle: UnitHandle) -> Option<&mut LoadedUnit> {
        self.entries
            .get_mut(handle.0)
            .and_then(Option::as_mut)
            .map(|e| &mut e.unit)
    }

    pub fn descriptor(&self, handle: UnitHandle) -> Option<UnitDescriptor> {
        self.entries
            .get(handle.0)
            .and_then(Option::as_ref)
            .map(RegistryEntry::descriptor)
    }

    /// Descriptors of every loaded unit in registration order.
    pub fn descriptors(&self) -> Vec<UnitDescriptor> {
        self.live().map(|(_, e)| e.descriptor()).collect()
    }

    /// Handles of every loaded unit in registration order.
    pub fn handles(&self) -> Vec<UnitHandle> {
        self.live().map(|(h, _)| h).collect()
    }

    pub fn plugin_count(&self) -> usize {
        self.plugins().count()
    }

    pub fn patch_count(&self) -> usize {
        self.patches().count()
    }

    pub fn len(&self) -> usize {
        self.live().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modhost_sdk::{UnitResult, Version};

    struct Named {
        name: &'static str,
        version: Version,
    }

    impl Plugin for Named {
        fn name(&self) -> &str {
            self.name
        }
        fn author(&self) -> &str {
            "tests"
        }
        fn version(&self) -> &Version {
            &self.version
        }
        fn on_enabled(&mut self) -> UnitResult<()> {
            Ok(())
        }
    }

    struct Fix;

    impl Patch for Fix {
        fn name(&self) -> &str {
            "fix"
        }
        fn apply(&mut self) -> UnitResult<()> {
            Ok(())
        }
        fn unapply(&mut self) -> UnitResult<()> {
            Ok(())
        }
    }

    fn plugin(name: &'static str) -> RegistryEntry {
        let unit = LoadedUnit::Plugin(Box::new(Named {
            name,
            version: Version::new(2, 0, 1),
        }));
        RegistryEntry::new(unit, "tests::Named", Path::new("/x/a.so"), None)
    }

    fn patch() -> RegistryEntry {
        RegistryEntry::new(
            LoadedUnit::Patch(Box::new(Fix)),
            "tests::Fix",
            Path::new("/x/b.so"),
            None,
        )
    }

    #[test]
    fn test_insertion_order_per_kind() {
        let mut registry = UnitRegistry::new();
        registry.insert(plugin("one"));
        registry.insert(patch());
        registry.insert(plugin("two"));

        let plugins: Vec<_> = registry.plugins().map(|(_, p)| p.name().to_string()).collect();
        assert_eq!(plugins, vec!["one", "two"]);
        assert_eq!(registry.patch_count(), 1);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_handles_stay_stable_after_take() {
        let mut registry = UnitRegistry::new();
        let a = registry.insert(plugin("a"));
        let b = registry.insert(plugin("b"));

        assert!(registry.take(a).is_some());
        assert!(registry.take(a).is_none());
        assert!(registry.get(a).is_none());
        assert_eq!(registry.get(b).map(LoadedUnit::name), Some("b"));

        let c = registry.insert(plugin("c"));
        assert_ne!(a, c);
        assert_eq!(registry.handles(), vec![b, c]);
    }

    #[test]
    fn test_descriptor_fields() {
        let mut registry = UnitRegistry::new();
        let p = registry.insert(plugin("greeter"));
        let q = registry.insert(patch());

        let d = registry.descriptor(p).unwrap();
        assert_eq!(d.capability, Capability::Plugin);
        assert_eq!(d.version.as_deref(), Some("2.0.1"));
        assert_eq!(d.author.as_deref(), Some("tests"));

        let d = registry.descriptor(q).unwrap();
        assert_eq!(d.capability, Capability::Patch);
        assert!(d.author.is_none());
        assert!(d.version.is_none());

        let json = serde_json::to_value(registry.descriptors()).unwrap();
        assert_eq!(json[0]["capability"], "plugin");
        assert_eq!(json[1]["name"], "fix");
    }
}
