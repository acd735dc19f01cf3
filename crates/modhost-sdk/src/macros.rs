//! Declarative macros for unit binaries.

/// Export the unit types of a binary.
///
/// Generates the `modhost_abi_version` and `modhost_register_units` symbols.
/// Each entry is `plugin: Type` or `patch: Type`; the type must implement
/// `Default` and the named contract. A type that implements both contracts
/// is listed once per contract. Declaration order is the order the host
/// discovers and registers units in.
///
/// Registration and every exported unit are panic-guarded inside the
/// binary; see [`guard`](crate::guard).
///
/// # Example
///
/// ```rust,ignore
/// use modhost_sdk::prelude::*;
///
/// modhost_sdk::export_units!(
///     plugin: Greeter,
///     patch: FastDoors,
/// );
/// ```
#[macro_export]
macro_rules! export_units {
    (@one $registrar:ident, plugin, $ty:ty) => {
        $registrar.plugin::<$ty>();
    };
    (@one $registrar:ident, patch, $ty:ty) => {
        $registrar.patch::<$ty>();
    };
    ($($kind:ident : $ty:ty),* $(,)?) => {
        #[no_mangle]
        pub extern "C" fn modhost_abi_version() -> u32 {
            $crate::UNIT_ABI_VERSION
        }

        #[no_mangle]
        pub fn modhost_register_units(registrar: &mut $crate::UnitRegistrar) {
            registrar.run_guarded(|registrar| {
                $(
                    $crate::export_units!(@one registrar, $kind, $ty);
                )*
            });
        }
    };
}
