#![forbid(unsafe_code)]

//! Core capability surface for graphwatch.
//!
//! This crate defines what it means for a runtime object to be *observable*:
//! the [`Observable`] trait with its optional capability channels (scalar
//! property change, membership change, reflection, enumeration), plus the
//! building blocks model types use to implement those channels:
//!
//! - [`Observers`]: an ordered multicast observer list with deterministic
//!   add/remove and snapshot-based emission.
//! - [`PropertyEvents`]: a paired changing/changed channel for struct-like
//!   model types.
//! - [`TrackedList`]: a membership-notifying, enumerable container.
//! - [`catalog`]: the process-global, per-type cache of reflectable
//!   attributes.
//!
//! The engine itself (listener trees, path composition, the root watcher)
//! lives in the `graphwatch` crate.

pub mod catalog;
pub mod events;
pub mod list;
pub mod node;
pub mod observers;
pub mod reflect;

pub use catalog::{TypeCatalog, catalog_for};
pub use events::PropertyEvents;
pub use list::TrackedList;
pub use node::{Enumerate, MembersInFlux, MembershipChange, NodeHandle, NodeId, Observable};
pub use observers::{Handler, HandlerId, Observers};
pub use reflect::{Accessor, AttrSpec, Reflect};

pub(crate) mod sync {
    use std::sync::{Mutex, MutexGuard, PoisonError};

    /// Lock a mutex, recovering the data if a peer panicked while holding it.
    pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
        mutex.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
