#![forbid(unsafe_code)]

//! The observable-object contract.
//!
//! A graph node is any `Arc<dyn Observable>`. Every capability is optional
//! and discovered through the accessor methods: an object may support scalar
//! property notification, membership notification, both, or neither. The
//! engine classifies nodes by which accessors return `Some` and never
//! requires more than an object actually offers.
//!
//! Identity is reference identity: [`NodeId`] is derived from the `Arc` data
//! pointer, so two structurally equal but distinct objects are distinct
//! graph nodes, and two handles to the same allocation are the same node.

use std::any::Any;
use std::sync::Arc;

use thiserror::Error;

use crate::observers::Observers;
use crate::reflect::Reflect;

/// Shared handle to an observable graph node.
pub type NodeHandle = Arc<dyn Observable>;

/// A runtime object the engine can observe.
///
/// Only [`as_any`](Observable::as_any) is mandatory; every capability
/// accessor defaults to `None`.
pub trait Observable: Send + Sync + 'static {
    /// The concrete instance, for reflective attribute access.
    fn as_any(&self) -> &dyn Any;

    /// "About to change" scalar channel, if supported. Events carry the
    /// attribute name.
    fn property_changing(&self) -> Option<&Observers<str>> {
        None
    }

    /// "Changed" scalar channel, if supported. Events carry the attribute
    /// name.
    fn property_changed(&self) -> Option<&Observers<str>> {
        None
    }

    /// Membership channel, if this object is a notifying container.
    fn membership_changed(&self) -> Option<&Observers<MembershipChange>> {
        None
    }

    /// Reflective attribute table, if this object exposes named attributes.
    fn reflect(&self) -> Option<&dyn Reflect> {
        None
    }

    /// Member enumeration, if this object is an enumerable container.
    fn enumerate(&self) -> Option<&dyn Enumerate> {
        None
    }
}

/// Capability: list the current members of a container.
pub trait Enumerate: Send + Sync {
    /// Snapshot the current members.
    ///
    /// Implementations that cannot produce a consistent snapshot while a
    /// mutation is in flight return [`MembersInFlux`]; callers treat that as
    /// "membership is in flux", not as a fault.
    fn members(&self) -> Result<Vec<NodeHandle>, MembersInFlux>;
}

/// Transient enumeration conflict: the container was mutated while it was
/// being enumerated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("container membership changed while it was being enumerated")]
pub struct MembersInFlux;

/// A membership-change notification.
///
/// `Splice` carries the itemized delta; `Reset` signifies an unknown,
/// possibly total, membership replacement with no itemized payload.
#[derive(Clone)]
pub enum MembershipChange {
    /// Itemized delta: these members left, these members arrived.
    Splice {
        removed: Vec<NodeHandle>,
        added: Vec<NodeHandle>,
    },
    /// Bulk replace or clear; current membership must be re-derived.
    Reset,
}

impl std::fmt::Debug for MembershipChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Splice { removed, added } => f
                .debug_struct("Splice")
                .field("removed", &removed.len())
                .field("added", &added.len())
                .finish(),
            Self::Reset => f.write_str("Reset"),
        }
    }
}

/// Reference identity of a graph node.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct NodeId(usize);

impl NodeId {
    /// Identity of the node behind `handle`.
    #[must_use]
    pub fn of(handle: &NodeHandle) -> Self {
        // The data pointer ignores the vtable half of the fat pointer, so
        // handles obtained through different trait-object coercions of the
        // same allocation still compare equal.
        Self(Arc::as_ptr(handle) as *const () as usize)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
