#![forbid(unsafe_code)]

//! Paired changing/changed property channels for model types.
//!
//! `PropertyEvents` is the idiomatic way for a struct-like model type to
//! implement the scalar capability accessors: embed one, return
//! [`changing`](PropertyEvents::changing)/[`changed`](PropertyEvents::changed)
//! from [`Observable::property_changing`](crate::Observable::property_changing)
//! and [`property_changed`](crate::Observable::property_changed), and call
//! [`set`](PropertyEvents::set) (or the raw `raise_*` methods) from setters.
//!
//! "About to change" for an attribute always precedes the corresponding
//! "changed" when both channels are used through [`set`].

use std::sync::Mutex;

use crate::observers::Observers;
use crate::sync::lock;

/// A changing/changed channel pair, keyed by attribute name.
#[derive(Debug, Default)]
pub struct PropertyEvents {
    changing: Observers<str>,
    changed: Observers<str>,
}

impl PropertyEvents {
    /// Create an idle channel pair.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The "about to change" channel.
    #[must_use]
    pub fn changing(&self) -> &Observers<str> {
        &self.changing
    }

    /// The "changed" channel.
    #[must_use]
    pub fn changed(&self) -> &Observers<str> {
        &self.changed
    }

    /// Announce that `name` is about to change. The old value is still
    /// authoritative when handlers run.
    pub fn raise_changing(&self, name: &str) {
        self.changing.emit(name);
    }

    /// Announce that `name` has changed.
    pub fn raise_changed(&self, name: &str) {
        self.changed.emit(name);
    }

    /// Compare-and-set helper: store `value` into `slot`, raising
    /// changing/changed around the write. Setting an equal value is a no-op
    /// (no events). Returns whether the value changed.
    ///
    /// Under concurrent writers the events of distinct `set` calls may
    /// interleave; each individual call still raises changing before its own
    /// changed.
    pub fn set<T: PartialEq>(&self, name: &str, slot: &Mutex<T>, value: T) -> bool {
        if *lock(slot) == value {
            return false;
        }
        self.raise_changing(name);
        *lock(slot) = value;
        self.raise_changed(name);
        true
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
