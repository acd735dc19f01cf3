//! Discovery engine: pick the exports of a binary that satisfy a capability.

use std::collections::HashSet;

use modhost_sdk::{Capability, UnitExport};

use crate::loader::LoadedBinary;

/// Exports of `binary` satisfying `capability`, in registration order.
///
/// A type registered twice for the same capability is returned once, so it
/// is instantiated at most once per query. A type is only returned for both
/// capabilities if it registered a factory for each.
pub fn discover(binary: &LoadedBinary, capability: Capability) -> Vec<&UnitExport> {
    let mut seen = HashSet::new();
    binary
        .exports()
        .iter()
        .filter(|export| export.satisfies(capability))
        .filter(|export| seen.insert(export.type_name))
        .collect()
}
