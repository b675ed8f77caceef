//! Property tests for the tracked list: a model-based check that arbitrary
//! operation sequences keep the membership, the event stream, and a plain
//! `Vec` model in lockstep.

use std::any::Any;
use std::sync::{Arc, Mutex};

use proptest::prelude::*;

use graphwatch_core::{Enumerate, MembershipChange, NodeHandle, NodeId, Observable, TrackedList};

struct Stub;

impl Observable for Stub {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn stub() -> NodeHandle {
    Arc::new(Stub)
}

#[derive(Clone, Debug)]
enum Op {
    Push,
    /// Remove the member at this slot of the *model* (modulo current len).
    RemoveAt(usize),
    /// Remove a handle that was never inserted.
    RemoveForeign,
    Clear,
    ReplaceAll(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => Just(Op::Push),
        2 => (0usize..16).prop_map(Op::RemoveAt),
        1 => Just(Op::RemoveForeign),
        1 => Just(Op::Clear),
        1 => (0usize..4).prop_map(Op::ReplaceAll),
    ]
}

proptest! {
    #[test]
    fn operation_sequences_match_a_vec_model(ops in prop::collection::vec(op(), 0..40)) {
        let list = TrackedList::new();
        let mut model: Vec<NodeHandle> = Vec::new();

        let events = Arc::new(Mutex::new(0usize));
        {
            let events = Arc::clone(&events);
            list.membership_changed()
                .unwrap()
                .observe(move |_: &MembershipChange| *events.lock().unwrap() += 1);
        }

        let mut expected_events = 0usize;
        for op in ops {
            match op {
                Op::Push => {
                    let item = stub();
                    model.push(Arc::clone(&item));
                    list.push(item);
                    expected_events += 1;
                }
                Op::RemoveAt(slot) => {
                    if model.is_empty() {
                        continue;
                    }
                    let item = Arc::clone(&model[slot % model.len()]);
                    model.retain(|m| NodeId::of(m) != NodeId::of(&item));
                    prop_assert!(list.remove(&item));
                    expected_events += 1;
                }
                Op::RemoveForeign => {
                    // Identity-based removal: an equal-but-distinct handle
                    // is a miss and raises nothing.
                    prop_assert!(!list.remove(&stub()));
                }
                Op::Clear => {
                    model.clear();
                    list.clear();
                    expected_events += 1;
                }
                Op::ReplaceAll(count) => {
                    model = (0..count).map(|_| stub()).collect();
                    list.replace_all(model.clone());
                    expected_events += 1;
                }
            }

            prop_assert_eq!(list.len(), model.len());
        }

        // Membership matches the model slot for slot, by identity.
        let members = list.snapshot();
        prop_assert_eq!(members.len(), model.len());
        for (member, expected) in members.iter().zip(&model) {
            prop_assert_eq!(NodeId::of(member), NodeId::of(expected));
        }

        // Exactly one event per mutating operation, misses excluded.
        prop_assert_eq!(*events.lock().unwrap(), expected_events);
    }

    #[test]
    fn enumeration_agrees_with_len(pushes in 0usize..24) {
        let list = TrackedList::new();
        for _ in 0..pushes {
            list.push(stub());
        }
        prop_assert_eq!(list.members().unwrap().len(), pushes);
        prop_assert_eq!(list.is_empty(), pushes == 0);
    }
}
