#![forbid(unsafe_code)]

//! Recursive change-observation engine.
//!
//! Given the root of an arbitrary, possibly cyclic object graph whose nodes
//! can notify of mutation (scalar property changes, or collection
//! insert/remove/reset), [`GraphWatcher`] attaches listeners transitively to
//! every reachable node, re-attaches them as the graph mutates, and
//! republishes every leaf-level change as a single path-qualified
//! notification at the root: `Address.City`, `Orders[]`, `Orders[].Name`.
//!
//! # Architecture
//!
//! One listener per reachable node, in two variants: a *leaf* listener for
//! nodes with scalar channels (one child listener per observable attribute
//! value) and a *container* listener for nodes with a membership channel
//! (one child listener per live member, keyed by reference identity). Each
//! listener re-emits upward with its own path segment prefixed, so a change
//! deep in the graph surfaces at the root with the full composed path.
//!
//! # Invariants
//!
//! 1. No instance is observed twice along a single ancestor chain: the
//!    factory walks the parent chain by reference identity, which breaks
//!    cycles and bounds recursion by the number of distinct reachable
//!    objects along any path. (The same instance *may* be observed
//!    independently from unrelated sibling subtrees.)
//! 2. At most one active child listener per member-key; replacement
//!    disposes the stale child before the new one is live.
//! 3. After `subscribe` returns — and again after every processed mutation —
//!    every currently-reachable, non-cyclic, observable descendant has an
//!    active listener.
//! 4. Resubscription of a child completes before the parent-relative
//!    notification for that event is emitted: an observer reading the tree
//!    from the upward callback never sees a torn state.
//!
//! # Example
//!
//! ```
//! use std::any::Any;
//! use std::sync::{Arc, Mutex};
//!
//! use graphwatch::{
//!     AttrSpec, GraphWatcher, NodeHandle, Observable, Observers, PropertyEvents, Reflect,
//! };
//!
//! struct Address {
//!     city: Mutex<String>,
//!     events: PropertyEvents,
//! }
//!
//! impl Address {
//!     fn set_city(&self, value: &str) {
//!         self.events.set("City", &self.city, value.to_owned());
//!     }
//! }
//!
//! impl Observable for Address {
//!     fn as_any(&self) -> &dyn Any {
//!         self
//!     }
//!     fn property_changing(&self) -> Option<&Observers<str>> {
//!         Some(self.events.changing())
//!     }
//!     fn property_changed(&self) -> Option<&Observers<str>> {
//!         Some(self.events.changed())
//!     }
//! }
//!
//! struct Person {
//!     address: Mutex<Option<Arc<Address>>>,
//!     events: PropertyEvents,
//! }
//!
//! fn person_address(instance: &dyn Any) -> Option<NodeHandle> {
//!     let person = instance.downcast_ref::<Person>()?;
//!     let address = person.address.lock().unwrap().clone()?;
//!     Some(address)
//! }
//!
//! static PERSON_ATTRS: &[AttrSpec] = &[AttrSpec { name: "Address", get: person_address }];
//!
//! impl Observable for Person {
//!     fn as_any(&self) -> &dyn Any {
//!         self
//!     }
//!     fn property_changed(&self) -> Option<&Observers<str>> {
//!         Some(self.events.changed())
//!     }
//!     fn reflect(&self) -> Option<&dyn Reflect> {
//!         Some(self)
//!     }
//! }
//!
//! impl Reflect for Person {
//!     fn attributes(&self) -> &'static [AttrSpec] {
//!         PERSON_ATTRS
//!     }
//! }
//!
//! let address = Arc::new(Address {
//!     city: Mutex::new("Austin".into()),
//!     events: PropertyEvents::new(),
//! });
//! let person = Arc::new(Person {
//!     address: Mutex::new(Some(Arc::clone(&address))),
//!     events: PropertyEvents::new(),
//! });
//!
//! let watcher = GraphWatcher::new(person).unwrap();
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! {
//!     let seen = Arc::clone(&seen);
//!     watcher.on_changed(move |path| seen.lock().unwrap().push(path.to_owned()));
//! }
//! watcher.subscribe().unwrap();
//!
//! address.set_city("Boston");
//! assert_eq!(seen.lock().unwrap().as_slice(), ["Address.City"]);
//! ```

mod container;
mod error;
mod factory;
mod leaf;
mod link;
pub mod path;
mod watcher;

pub use error::WatchError;
pub use watcher::{GraphWatcher, WatchConfig};

// The capability surface observed objects implement.
pub use graphwatch_core::{
    Accessor, AttrSpec, Enumerate, Handler, HandlerId, MembersInFlux, MembershipChange,
    NodeHandle, NodeId, Observable, Observers, PropertyEvents, Reflect, TrackedList, TypeCatalog,
    catalog_for,
};

pub(crate) mod sync {
    use std::sync::{Mutex, MutexGuard, PoisonError};

    /// Lock a mutex, recovering the data if a peer panicked while holding it.
    pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
        mutex.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
