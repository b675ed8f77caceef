#![forbid(unsafe_code)]

//! Container listener: observes one node's membership changes.
//!
//! Keeps one child listener per live member, keyed by reference identity.
//! Itemized membership events replace exactly the affected members' child
//! listeners; reset events tear everything down and, when the container is
//! still enumerable, eagerly rebuild from its current membership. Either
//! way the container re-emits a single member-wildcard notification — member
//! changes are not individually path-addressable.
//!
//! Enumeration racing a concurrent mutation is retried once after clearing
//! partial state; a second conflict is a diagnostic, never a fault — later
//! itemized add events rebuild tracking incrementally.

use std::sync::{Arc, Mutex, Weak};

use ahash::AHashMap;
use graphwatch_core::{HandlerId, MembersInFlux, MembershipChange, NodeHandle, NodeId};
use tracing::{trace, warn};

use crate::factory::{self, Listener};
use crate::link::{Link, Phase};
use crate::path;
use crate::sync::lock;

/// One clear-and-retry after a detected enumeration conflict.
const ENUM_RETRIES: usize = 1;

#[derive(Default)]
struct Hooks {
    membership: Option<HandlerId>,
    changing: Option<HandlerId>,
    changed: Option<HandlerId>,
}

pub(crate) struct ContainerListener {
    link: Arc<Link>,
    me: Weak<ContainerListener>,
    children: Mutex<AHashMap<NodeId, Arc<dyn Listener>>>,
    hooks: Mutex<Hooks>,
}

impl ContainerListener {
    pub(crate) fn new(link: Arc<Link>) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            link,
            me: me.clone(),
            children: Mutex::new(AHashMap::new()),
            hooks: Mutex::new(Hooks::default()),
        })
    }

    /// (Re)install the child listener for `member`, replacing any stale
    /// entry for the same reference.
    fn reset_member(&self, member: &NodeHandle) {
        if !self.link.is_active() {
            return;
        }

        self.remove_member(member);

        let Some(child) = factory::spawn(Some(Arc::clone(member)), &self.link, path::MEMBER_WILDCARD)
        else {
            return;
        };

        let key = NodeId::of(member);
        let replaced = lock(&self.children).insert(key, Arc::clone(&child));
        if let Some(replaced) = replaced {
            replaced.detach();
        }
        child.attach();

        // A dispose racing the insert may have drained the map already.
        if !self.link.is_active() {
            if let Some(straggler) = lock(&self.children).remove(&key) {
                straggler.detach();
            }
        }
    }

    fn remove_member(&self, member: &NodeHandle) {
        let removed = lock(&self.children).remove(&NodeId::of(member));
        if let Some(removed) = removed {
            removed.detach();
        }
    }

    fn clear_members(&self) {
        let drained = std::mem::take(&mut *lock(&self.children));
        for (_, child) in drained {
            child.detach();
        }
    }

    /// Install a child listener for every current member, tolerating a
    /// concurrent mutation: on [`MembersInFlux`], clear partial state and
    /// retry once.
    fn seed_members(&self) {
        let Some(enumerable) = self.link.instance().enumerate() else {
            return;
        };
        let mut conflicts = 0;
        loop {
            match enumerable.members() {
                Ok(members) => {
                    for member in &members {
                        self.reset_member(member);
                    }
                    return;
                }
                Err(MembersInFlux) => {
                    self.clear_members();
                    conflicts += 1;
                    if conflicts > ENUM_RETRIES {
                        warn!(
                            depth = self.link.depth(),
                            segment = self.link.segment().unwrap_or("<root>"),
                            "membership stayed in flux during enumeration; \
                             members will be tracked from later add events"
                        );
                        return;
                    }
                }
            }
        }
    }

    fn on_membership(&self, change: &MembershipChange) {
        if !self.link.is_active() {
            return;
        }

        match change {
            MembershipChange::Splice { removed, added } => {
                for member in removed {
                    self.remove_member(member);
                }
                for member in added {
                    self.reset_member(member);
                }
            }
            MembershipChange::Reset => {
                // Full membership is unknown; correctness over diffing.
                self.clear_members();
                self.seed_members();
            }
        }

        // One wildcard notification regardless of how many members changed,
        // emitted only after the child tree is consistent again.
        self.link.raise(Phase::Changed, path::MEMBER_WILDCARD);
    }

    fn unhook(&self) {
        let hooks = std::mem::take(&mut *lock(&self.hooks));
        let instance = self.link.instance();
        if let (Some(id), Some(channel)) = (hooks.membership, instance.membership_changed()) {
            channel.remove(id);
        }
        if let (Some(id), Some(channel)) = (hooks.changing, instance.property_changing()) {
            channel.remove(id);
        }
        if let (Some(id), Some(channel)) = (hooks.changed, instance.property_changed()) {
            channel.remove(id);
        }
    }
}

impl Listener for ContainerListener {
    fn link(&self) -> &Arc<Link> {
        &self.link
    }

    fn attach(&self) {
        if !self.link.activate() {
            return;
        }

        let instance = self.link.instance();
        {
            let mut hooks = lock(&self.hooks);
            if let Some(channel) = instance.membership_changed() {
                let me = self.me.clone();
                hooks.membership = Some(channel.observe(move |change: &MembershipChange| {
                    if let Some(container) = me.upgrade() {
                        container.on_membership(change);
                    }
                }));
            }
            // The container's own scalar channels pass through untouched:
            // membership tracking is unaffected by e.g. a count property.
            if let Some(channel) = instance.property_changing() {
                let me = self.me.clone();
                hooks.changing = Some(channel.observe(move |name: &str| {
                    if let Some(container) = me.upgrade() {
                        container.link.raise(Phase::Changing, name);
                    }
                }));
            }
            if let Some(channel) = instance.property_changed() {
                let me = self.me.clone();
                hooks.changed = Some(channel.observe(move |name: &str| {
                    if let Some(container) = me.upgrade() {
                        container.link.raise(Phase::Changed, name);
                    }
                }));
            }
        }

        // A detach racing this attach may have drained the hooks map while
        // it was still empty; take the registrations back out of the
        // channels instead of stranding them.
        if !self.link.is_active() {
            self.unhook();
            return;
        }

        self.seed_members();
        trace!(
            depth = self.link.depth(),
            segment = self.link.segment().unwrap_or("<root>"),
            members = lock(&self.children).len(),
            "container listener attached"
        );
    }

    fn detach(&self) {
        if !self.link.retire() {
            return;
        }

        self.clear_members();

        self.unhook();
        trace!(
            depth = self.link.depth(),
            segment = self.link.segment().unwrap_or("<root>"),
            "container listener detached"
        );
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    use graphwatch_core::{Observable, TrackedList};

    use crate::link::Sink;
    use crate::watcher::WatchConfig;

    fn noop_sink() -> Sink {
        Arc::new(|_, _| {})
    }

    // Whatever way attach and detach interleave, a disposed listener must
    // leave the instance's channels exactly as it found them.
    #[test]
    fn detach_racing_attach_leaves_no_hooks_behind() {
        for _ in 0..64 {
            let list = Arc::new(TrackedList::new());
            let link = Link::root(list.clone(), noop_sink(), Arc::new(WatchConfig::default()));
            let listener = ContainerListener::new(link);

            let racer = {
                let listener = Arc::clone(&listener);
                thread::spawn(move || listener.detach())
            };
            listener.attach();
            racer.join().unwrap();
            listener.detach();

            assert!(listener.link().is_disposed());
            assert!(list.membership_changed().unwrap().is_empty());
        }
    }
}
