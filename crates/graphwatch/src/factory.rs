#![forbid(unsafe_code)]

//! Listener classification and construction.
//!
//! Given a candidate value and the link requesting a child, decide whether a
//! listener should exist at all (cycle guard, inclusion predicate), which
//! variant fits the value's capabilities, and build it **unsubscribed** —
//! subscription is always the caller's job, performed after the new listener
//! is tracked in its parent's children map so no event can arrive for an
//! untracked listener.

use std::sync::Arc;

use graphwatch_core::{NodeHandle, NodeId, catalog_for};
use tracing::trace;

use crate::container::ContainerListener;
use crate::leaf::LeafListener;
use crate::link::Link;

/// One node's observation unit. Implemented by the leaf (scalar) and
/// container (membership) variants.
pub(crate) trait Listener: Send + Sync {
    fn link(&self) -> &Arc<Link>;

    /// Hook the instance's channels and build child listeners.
    /// No-op unless the listener is still idle.
    fn attach(&self);

    /// Terminal teardown: dispose children, then unhook own channels.
    /// Idempotent; safe to call from inside a notification handler.
    fn detach(&self);
}

/// Build the listener for `value` as a child of `parent`, or `None` when no
/// listener belongs there.
///
/// Returns `None` for: absent values, values that re-enter an ancestor
/// (compared by reference identity along the chain, `parent` included),
/// values rejected by the configured inclusion predicate, and values with no
/// observable capability.
pub(crate) fn spawn(
    value: Option<NodeHandle>,
    parent: &Arc<Link>,
    segment: &str,
) -> Option<Arc<dyn Listener>> {
    let value = value?;

    if parent.would_cycle(NodeId::of(&value)) {
        trace!(
            segment,
            depth = parent.depth() + 1,
            "value re-enters an ancestor; skipping listener"
        );
        return None;
    }

    if let Some(include) = parent.config().node_filter_fn() {
        if !include(&value) {
            return None;
        }
    }

    // Containers take precedence: a value offering both membership and
    // scalar channels is observed as a container (which also forwards the
    // scalar channels).
    let listener: Arc<dyn Listener> = if value.membership_changed().is_some() {
        ContainerListener::new(Link::child(parent, value, segment))
    } else if value.property_changed().is_some() {
        let catalog = catalog_for(value.as_ref());
        LeafListener::new(Link::child(parent, value, segment), catalog)
    } else {
        return None;
    };

    Some(listener)
}
