#![forbid(unsafe_code)]

//! Ordered multicast observer list.
//!
//! [`Observers<E>`] is the registration surface for every notification
//! channel in graphwatch: an ordered set of callback handles with
//! deterministic add/remove and teardown-clears-all semantics, in place of
//! any host-runtime multicast machinery.
//!
//! # Invariants
//!
//! 1. Handlers are invoked in registration order.
//! 2. [`HandlerId`]s are never reused within one list.
//! 3. Emission snapshots the handler set first and invokes outside the lock,
//!    so a handler may remove itself, register others, or tear down an
//!    entire listener tree without deadlocking.
//! 4. [`clear`](Observers::clear) prevents all *future* emissions from
//!    reaching the removed handlers; an emission already in flight completes
//!    with the snapshot it took.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::sync::lock;

/// A shared callback invoked with a borrowed event payload.
pub type Handler<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// Opaque handle identifying one registered handler.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct HandlerId(u64);

/// An ordered, thread-safe multicast list of handlers for events of type `E`.
///
/// `E` may be unsized (`Observers<str>` is the common case for property-name
/// and path notifications).
pub struct Observers<E: ?Sized> {
    entries: Mutex<Vec<(HandlerId, Handler<E>)>>,
    next_id: AtomicU64,
}

impl<E: ?Sized> Observers<E> {
    /// Create an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a handler, returning its removal handle.
    pub fn observe(&self, handler: impl Fn(&E) + Send + Sync + 'static) -> HandlerId {
        self.insert(Arc::new(handler))
    }

    /// Register a pre-built shared handler.
    pub fn insert(&self, handler: Handler<E>) -> HandlerId {
        let id = HandlerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        lock(&self.entries).push((id, handler));
        id
    }

    /// Remove a handler. Returns `false` if the id was already gone.
    pub fn remove(&self, id: HandlerId) -> bool {
        let mut entries = lock(&self.entries);
        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id);
        entries.len() != before
    }

    /// Drop every registered handler.
    pub fn clear(&self) {
        lock(&self.entries).clear();
    }

    /// Number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    /// Whether no handlers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Invoke every handler, in registration order, with `event`.
    ///
    /// The handler set is snapshotted under the lock and invoked outside it.
    pub fn emit(&self, event: &E) {
        let snapshot: Vec<Handler<E>> = lock(&self.entries)
            .iter()
            .map(|(_, handler)| Arc::clone(handler))
            .collect();
        for handler in snapshot {
            handler(event);
        }
    }
}

impl<E: ?Sized> Default for Observers<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: ?Sized> std::fmt::Debug for Observers<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers").field("len", &self.len()).finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
