//! Panic guards that run inside the unit binary.
//!
//! A unit binary links its own copy of the standard library, so the host
//! cannot catch a panic raised in unit code: unwinding into the host aborts
//! the process. Every call the host makes into a unit registered through
//! [`UnitRegistrar::plugin`](crate::UnitRegistrar::plugin) or
//! [`UnitRegistrar::patch`](crate::UnitRegistrar::patch) goes through the
//! wrappers here. They are generic, so they are compiled into the unit binary
//! and catch the panic on the unit's side, turning it into
//! [`UnitError::Panicked`].

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

use semver::Version;

use crate::contract::{Patch, Plugin};
use crate::error::{UnitError, UnitResult};

/// Run `f`, converting a panic into [`UnitError::Panicked`].
pub fn catch<R>(f: impl FnOnce() -> UnitResult<R>) -> UnitResult<R> {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => Err(UnitError::Panicked(panic_message(payload.as_ref()))),
    }
}

/// Text of a caught panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Drop `value`, swallowing a panic from its destructor.
fn drop_quietly<T>(value: T) {
    let _ = catch_unwind(AssertUnwindSafe(move || drop(value)));
}

/// A plugin whose hooks cannot unwind into the host.
///
/// Name, author and version are read once at construction, so the accessors
/// never enter unit code.
pub struct GuardedPlugin<T: Plugin> {
    inner: Option<T>,
    name: String,
    author: String,
    version: Version,
}

impl<T: Plugin> GuardedPlugin<T> {
    pub fn new(inner: T) -> UnitResult<Self> {
        let metadata = catch(|| {
            Ok((
                inner.name().to_string(),
                inner.author().to_string(),
                inner.version().clone(),
            ))
        });
        match metadata {
            Ok((name, author, version)) => Ok(Self {
                inner: Some(inner),
                name,
                author,
                version,
            }),
            Err(err) => {
                drop_quietly(inner);
                Err(err)
            }
        }
    }

    fn call(&mut self, hook: impl FnOnce(&mut T) -> UnitResult<()>) -> UnitResult<()> {
        match self.inner.as_mut() {
            Some(inner) => catch(|| hook(inner)),
            None => Err(UnitError::Other(format!("{} was already dropped", self.name))),
        }
    }
}

impl<T: Plugin> Plugin for GuardedPlugin<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn author(&self) -> &str {
        &self.author
    }

    fn version(&self) -> &Version {
        &self.version
    }

    fn on_enabled(&mut self) -> UnitResult<()> {
        self.call(T::on_enabled)
    }

    fn on_disabled(&mut self) -> UnitResult<()> {
        self.call(T::on_disabled)
    }
}

impl<T: Plugin> Drop for GuardedPlugin<T> {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.take() {
            drop_quietly(inner);
        }
    }
}

/// A patch whose hooks cannot unwind into the host.
pub struct GuardedPatch<T: Patch> {
    inner: Option<T>,
    name: String,
}

impl<T: Patch> GuardedPatch<T> {
    pub fn new(inner: T) -> UnitResult<Self> {
        match catch(|| Ok(inner.name().to_string())) {
            Ok(name) => Ok(Self {
                inner: Some(inner),
                name,
            }),
            Err(err) => {
                drop_quietly(inner);
                Err(err)
            }
        }
    }

    fn call(&mut self, hook: impl FnOnce(&mut T) -> UnitResult<()>) -> UnitResult<()> {
        match self.inner.as_mut() {
            Some(inner) => catch(|| hook(inner)),
            None => Err(UnitError::Other(format!("{} was already dropped", self.name))),
        }
    }
}

impl<T: Patch> Patch for GuardedPatch<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&mut self) -> UnitResult<()> {
        self.call(T::apply)
    }

    fn unapply(&mut self) -> UnitResult<()> {
        self.call(T::unapply)
    }
}

impl<T: Patch> Drop for GuardedPatch<T> {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.take() {
            drop_quietly(inner);
        }
    }
}
