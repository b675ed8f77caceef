#![forbid(unsafe_code)]

//! Shared per-listener bookkeeping.
//!
//! Every listener variant owns one [`Link`]: the observed instance, the weak
//! back-reference to the enclosing listener, depth, path segment, lifecycle
//! state, and the upward notification sink. The link also hosts the two
//! pieces of logic both variants share: the ancestor-chain cycle walk and
//! the segment-prefixing re-emission of change paths.
//!
//! # Lifecycle
//!
//! idle → active → disposed, driven by compare-exchange so the transitions
//! are race-free: double dispose and dispose-from-inside-a-handler are
//! no-ops, and a disposed link silently drops any emission still in flight.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Weak};

use graphwatch_core::{NodeHandle, NodeId};

use crate::path;
use crate::watcher::WatchConfig;

/// Which root-level channel an emission targets.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum Phase {
    Changing,
    Changed,
}

/// Upward notification sink: receives (phase, composed path).
pub(crate) type Sink = Arc<dyn Fn(Phase, &str) + Send + Sync>;

const IDLE: u8 = 0;
const ACTIVE: u8 = 1;
const DISPOSED: u8 = 2;

pub(crate) struct Link {
    instance: NodeHandle,
    parent: Option<Weak<Link>>,
    depth: usize,
    segment: Option<Box<str>>,
    state: AtomicU8,
    sink: Sink,
    config: Arc<WatchConfig>,
}

impl Link {
    /// Link for the root listener: no parent, no segment, depth 0.
    pub(crate) fn root(instance: NodeHandle, sink: Sink, config: Arc<WatchConfig>) -> Arc<Self> {
        Arc::new(Self {
            instance,
            parent: None,
            depth: 0,
            segment: None,
            state: AtomicU8::new(IDLE),
            sink,
            config,
        })
    }

    /// Link for a child listener occupying `segment` within `parent`'s
    /// instance. The child's sink forwards into the parent, which prefixes
    /// its own segment; the back-reference is weak so ownership stays
    /// strictly parent-to-child.
    pub(crate) fn child(parent: &Arc<Link>, instance: NodeHandle, segment: &str) -> Arc<Self> {
        let upward = Arc::downgrade(parent);
        let sink: Sink = Arc::new(move |phase, path: &str| {
            if let Some(parent) = upward.upgrade() {
                parent.raise(phase, path);
            }
        });
        Arc::new(Self {
            instance,
            parent: Some(Arc::downgrade(parent)),
            depth: parent.depth + 1,
            segment: Some(segment.into()),
            state: AtomicU8::new(IDLE),
            sink,
            config: Arc::clone(&parent.config),
        })
    }

    pub(crate) fn instance(&self) -> &NodeHandle {
        &self.instance
    }

    pub(crate) fn id(&self) -> NodeId {
        NodeId::of(&self.instance)
    }

    pub(crate) fn depth(&self) -> usize {
        self.depth
    }

    pub(crate) fn segment(&self) -> Option<&str> {
        self.segment.as_deref()
    }

    pub(crate) fn config(&self) -> &WatchConfig {
        &self.config
    }

    /// Walk the ancestor chain, this link included, looking for `candidate`
    /// by reference identity. A hit means attaching a listener for
    /// `candidate` below this link would re-enter an ancestor.
    pub(crate) fn would_cycle(&self, candidate: NodeId) -> bool {
        if self.id() == candidate {
            return true;
        }
        let mut cursor = self.parent.clone();
        while let Some(parent) = cursor {
            let Some(parent) = parent.upgrade() else {
                break;
            };
            if parent.id() == candidate {
                return true;
            }
            cursor = parent.parent.clone();
        }
        false
    }

    /// idle → active. Returns whether this call performed the transition.
    pub(crate) fn activate(&self) -> bool {
        self.state
            .compare_exchange(IDLE, ACTIVE, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// any → disposed. Returns whether this call performed the transition
    /// (false means the link was already terminal).
    pub(crate) fn retire(&self) -> bool {
        self.state.swap(DISPOSED, Ordering::AcqRel) != DISPOSED
    }

    pub(crate) fn is_active(&self) -> bool {
        self.state.load(Ordering::Acquire) == ACTIVE
    }

    pub(crate) fn is_disposed(&self) -> bool {
        self.state.load(Ordering::Acquire) == DISPOSED
    }

    /// Re-emit a change upward, prefixing this link's own segment.
    ///
    /// `local` is either an attribute name from this link's own instance or
    /// an already-composed path arriving from a child listener; both get the
    /// same prefixing treatment. Disposed links drop the emission.
    pub(crate) fn raise(&self, phase: Phase, local: &str) {
        if self.is_disposed() {
            return;
        }
        let composed = path::compose(self.segment(), local);
        (self.sink)(phase, &composed);
    }
}

impl std::fmt::Debug for Link {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Link")
            .field("depth", &self.depth)
            .field("segment", &self.segment)
            .field("state", &self.state.load(Ordering::Acquire))
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
