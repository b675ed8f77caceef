#![forbid(unsafe_code)]

//! A membership-notifying, enumerable container.
//!
//! `TrackedList` is the reference container implementation of the
//! [`Observable`] membership and enumeration capabilities: a flat list of
//! node handles that raises an itemized [`MembershipChange::Splice`] for
//! single insert/remove and a [`MembershipChange::Reset`] for bulk
//! clear/replace.
//!
//! Members are compared by reference identity, never by value.

use std::any::Any;
use std::sync::{Arc, Mutex};

use crate::node::{Enumerate, MembersInFlux, MembershipChange, NodeHandle, NodeId, Observable};
use crate::observers::Observers;
use crate::sync::lock;

/// An observable list of graph nodes.
#[derive(Default)]
pub struct TrackedList {
    items: Mutex<Vec<NodeHandle>>,
    membership: Observers<MembershipChange>,
}

impl std::fmt::Debug for TrackedList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackedList").field("len", &self.len()).finish()
    }
}

impl TrackedList {
    /// Create an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a member and raise an itemized add.
    pub fn push(&self, item: NodeHandle) {
        lock(&self.items).push(Arc::clone(&item));
        // Emit outside the items lock so handlers may re-enumerate.
        self.membership.emit(&MembershipChange::Splice {
            removed: Vec::new(),
            added: vec![item],
        });
    }

    /// Remove a member by reference identity, raising an itemized remove.
    /// Returns `false` when the member was not present.
    pub fn remove(&self, item: &NodeHandle) -> bool {
        let target = NodeId::of(item);
        let removed = {
            let mut items = lock(&self.items);
            match items.iter().position(|member| NodeId::of(member) == target) {
                Some(slot) => Some(items.remove(slot)),
                None => None,
            }
        };
        match removed {
            Some(member) => {
                self.membership.emit(&MembershipChange::Splice {
                    removed: vec![member],
                    added: Vec::new(),
                });
                true
            }
            None => false,
        }
    }

    /// Drop every member and raise a reset.
    pub fn clear(&self) {
        lock(&self.items).clear();
        self.membership.emit(&MembershipChange::Reset);
    }

    /// Replace the whole membership and raise a single reset.
    pub fn replace_all(&self, items: Vec<NodeHandle>) {
        *lock(&self.items) = items;
        self.membership.emit(&MembershipChange::Reset);
    }

    /// Current member count.
    #[must_use]
    pub fn len(&self) -> usize {
        lock(&self.items).len()
    }

    /// Whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Handle to the member at `index`, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<NodeHandle> {
        lock(&self.items).get(index).cloned()
    }

    /// Snapshot the current membership.
    #[must_use]
    pub fn snapshot(&self) -> Vec<NodeHandle> {
        lock(&self.items).clone()
    }
}

impl Observable for TrackedList {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn membership_changed(&self) -> Option<&Observers<MembershipChange>> {
        Some(&self.membership)
    }

    fn enumerate(&self) -> Option<&dyn Enumerate> {
        Some(self)
    }
}

impl Enumerate for TrackedList {
    fn members(&self) -> Result<Vec<NodeHandle>, MembersInFlux> {
        Ok(self.snapshot())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    struct Stub;

    impl Observable for Stub {
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    fn stub() -> NodeHandle {
        Arc::new(Stub)
    }

    fn record(list: &TrackedList) -> Arc<Mutex<Vec<String>>> {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        list.membership.observe(move |change: &MembershipChange| {
            let entry = match change {
                MembershipChange::Splice { removed, added } => {
                    format!("splice -{} +{}", removed.len(), added.len())
                }
                MembershipChange::Reset => String::from("reset"),
            };
            sink.lock().unwrap().push(entry);
        });
        log
    }

    #[test]
    fn push_and_remove_are_itemized() {
        let list = TrackedList::new();
        let log = record(&list);
        let item = stub();

        list.push(Arc::clone(&item));
        assert_eq!(list.len(), 1);
        assert!(list.remove(&item));
        assert!(list.is_empty());
        assert!(!list.remove(&item));

        assert_eq!(
            log.lock().unwrap().as_slice(),
            ["splice -0 +1", "splice -1 +0"]
        );
    }

    #[test]
    fn removal_is_by_identity_not_value() {
        let list = TrackedList::new();
        let kept = stub();
        let lookalike = stub();
        list.push(Arc::clone(&kept));

        assert!(!list.remove(&lookalike));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn bulk_operations_raise_one_reset() {
        let list = TrackedList::new();
        list.push(stub());
        list.push(stub());
        let log = record(&list);

        list.replace_all(vec![stub(), stub(), stub()]);
        assert_eq!(list.len(), 3);
        list.clear();
        assert!(list.is_empty());

        assert_eq!(log.lock().unwrap().as_slice(), ["reset", "reset"]);
    }

    #[test]
    fn enumeration_snapshots_current_members() {
        let list = TrackedList::new();
        let a = stub();
        list.push(Arc::clone(&a));
        let members = list.members().unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(NodeId::of(&members[0]), NodeId::of(&a));
    }
}
