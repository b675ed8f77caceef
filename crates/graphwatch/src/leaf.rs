#![forbid(unsafe_code)]

//! Leaf listener: observes one node's attribute-level changes.
//!
//! Hooks the instance's changing/changed channels (each optional) and keeps
//! one child listener per attribute whose current value is itself
//! observable. On every "changed" event the child for that attribute is
//! replaced **before** the change is re-emitted upward, so an observer
//! reading the tree from the upward callback sees the post-mutation state.

use std::sync::{Arc, Mutex, Weak};

use ahash::AHashMap;
use graphwatch_core::{HandlerId, TypeCatalog};
use tracing::{debug, trace};

use crate::factory::{self, Listener};
use crate::link::{Link, Phase};
use crate::sync::lock;

#[derive(Default)]
struct Hooks {
    changing: Option<HandlerId>,
    changed: Option<HandlerId>,
}

pub(crate) struct LeafListener {
    link: Arc<Link>,
    me: Weak<LeafListener>,
    catalog: Arc<TypeCatalog>,
    children: Mutex<AHashMap<Box<str>, Arc<dyn Listener>>>,
    hooks: Mutex<Hooks>,
}

impl LeafListener {
    pub(crate) fn new(link: Arc<Link>, catalog: Arc<TypeCatalog>) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            link,
            me: me.clone(),
            catalog,
            children: Mutex::new(AHashMap::new()),
            hooks: Mutex::new(Hooks::default()),
        })
    }

    /// Dispose the child for `name` and re-attach one from the attribute's
    /// current value. A name with no catalog entry means "no such child",
    /// never an error.
    fn reset_child(&self, name: &str) {
        if !self.link.is_active() {
            return;
        }

        let stale = lock(&self.children).remove(name);
        if let Some(stale) = stale {
            stale.detach();
        }

        let Some(spec) = self.catalog.get(name) else {
            return;
        };
        let value = (spec.get)(self.link.instance().as_any());
        let Some(child) = factory::spawn(value, &self.link, name) else {
            return;
        };

        // Track first, subscribe second: an event arriving between the two
        // finds the listener in the map. A concurrent replacement losing
        // this race is detached instead of leaked.
        let replaced = lock(&self.children).insert(name.into(), Arc::clone(&child));
        if let Some(replaced) = replaced {
            replaced.detach();
        }
        child.attach();
        debug!(
            attribute = name,
            depth = self.link.depth(),
            "child listener replaced"
        );

        // A dispose racing the insert above may have drained the map before
        // the new child landed; tear the straggler down.
        if !self.link.is_active() {
            if let Some(straggler) = lock(&self.children).remove(name) {
                straggler.detach();
            }
        }
    }

    fn unhook(&self) {
        let hooks = std::mem::take(&mut *lock(&self.hooks));
        let instance = self.link.instance();
        if let (Some(id), Some(channel)) = (hooks.changing, instance.property_changing()) {
            channel.remove(id);
        }
        if let (Some(id), Some(channel)) = (hooks.changed, instance.property_changed()) {
            channel.remove(id);
        }
    }
}

impl Listener for LeafListener {
    fn link(&self) -> &Arc<Link> {
        &self.link
    }

    fn attach(&self) {
        if !self.link.activate() {
            return;
        }

        let instance = Arc::clone(self.link.instance());
        {
            let mut hooks = lock(&self.hooks);
            if let Some(channel) = instance.property_changing() {
                let me = self.me.clone();
                hooks.changing = Some(channel.observe(move |name: &str| {
                    // The old value is still authoritative; re-emit only.
                    if let Some(leaf) = me.upgrade() {
                        leaf.link.raise(Phase::Changing, name);
                    }
                }));
            }
            if let Some(channel) = instance.property_changed() {
                let me = self.me.clone();
                hooks.changed = Some(channel.observe(move |name: &str| {
                    if let Some(leaf) = me.upgrade() {
                        // Resubscribe before the upward notification.
                        leaf.reset_child(name);
                        leaf.link.raise(Phase::Changed, name);
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

        for spec in self.catalog.iter() {
            self.reset_child(spec.name);
        }
        trace!(
            depth = self.link.depth(),
            segment = self.link.segment().unwrap_or("<root>"),
            "leaf listener attached"
        );
    }

    fn detach(&self) {
        if !self.link.retire() {
            return;
        }

        let children = std::mem::take(&mut *lock(&self.children));
        for (_, child) in children {
            child.detach();
        }

        self.unhook();
        trace!(
            depth = self.link.depth(),
            segment = self.link.segment().unwrap_or("<root>"),
            "leaf listener detached"
        );
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
