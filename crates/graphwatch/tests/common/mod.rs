//! Shared graph fixtures for the integration suites.

#![allow(dead_code)]

use std::any::Any;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use graphwatch::{
    AttrSpec, Enumerate, GraphWatcher, MembersInFlux, MembershipChange, NodeHandle, Observable,
    Observers, PropertyEvents, Reflect, TrackedList,
};

// ── Widget: scalar node with Name + Child attributes ────────────────────

pub struct Widget {
    pub name: Mutex<String>,
    pub child: Mutex<Option<NodeHandle>>,
    pub events: PropertyEvents,
}

impl Widget {
    pub fn new(name: &str) -> Arc<Widget> {
        Arc::new(Widget {
            name: Mutex::new(name.to_owned()),
            child: Mutex::new(None),
            events: PropertyEvents::new(),
        })
    }

    pub fn set_name(&self, value: &str) {
        self.events.set("Name", &self.name, value.to_owned());
    }

    pub fn set_child(&self, child: Option<NodeHandle>) {
        self.events.raise_changing("Child");
        *self.child.lock().unwrap() = child;
        self.events.raise_changed("Child");
    }
}

// Plain string: nothing observable behind it.
fn widget_name(_: &dyn Any) -> Option<NodeHandle> {
    None
}

fn widget_child(instance: &dyn Any) -> Option<NodeHandle> {
    instance.downcast_ref::<Widget>()?.child.lock().unwrap().clone()
}

static WIDGET_ATTRS: &[AttrSpec] = &[
    AttrSpec { name: "Name", get: widget_name },
    AttrSpec { name: "Child", get: widget_child },
];

impl Observable for Widget {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn property_changing(&self) -> Option<&Observers<str>> {
        Some(self.events.changing())
    }
    fn property_changed(&self) -> Option<&Observers<str>> {
        Some(self.events.changed())
    }
    fn reflect(&self) -> Option<&dyn Reflect> {
        Some(self)
    }
}

impl Reflect for Widget {
    fn attributes(&self) -> &'static [AttrSpec] {
        WIDGET_ATTRS
    }
}

// ── Store: scalar node whose Items attribute is a container ─────────────

pub struct Store {
    pub items: Arc<TrackedList>,
    pub child: Mutex<Option<NodeHandle>>,
    pub events: PropertyEvents,
}

impl Store {
    pub fn new() -> Arc<Store> {
        Arc::new(Store {
            items: Arc::new(TrackedList::new()),
            child: Mutex::new(None),
            events: PropertyEvents::new(),
        })
    }

    pub fn set_child(&self, child: Option<NodeHandle>) {
        self.events.raise_changing("Child");
        *self.child.lock().unwrap() = child;
        self.events.raise_changed("Child");
    }
}

fn store_items(instance: &dyn Any) -> Option<NodeHandle> {
    let store = instance.downcast_ref::<Store>()?;
    Some(Arc::clone(&store.items) as NodeHandle)
}

fn store_child(instance: &dyn Any) -> Option<NodeHandle> {
    instance.downcast_ref::<Store>()?.child.lock().unwrap().clone()
}

static STORE_ATTRS: &[AttrSpec] = &[
    AttrSpec { name: "Items", get: store_items },
    AttrSpec { name: "Child", get: store_child },
];

impl Observable for Store {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn property_changing(&self) -> Option<&Observers<str>> {
        Some(self.events.changing())
    }
    fn property_changed(&self) -> Option<&Observers<str>> {
        Some(self.events.changed())
    }
    fn reflect(&self) -> Option<&dyn Reflect> {
        Some(self)
    }
}

impl Reflect for Store {
    fn attributes(&self) -> &'static [AttrSpec] {
        STORE_ATTRS
    }
}

// ── FlakyBag: container whose enumeration races a mutation N times ──────

pub struct FlakyBag {
    items: Mutex<Vec<NodeHandle>>,
    membership: Observers<MembershipChange>,
    conflicts_left: AtomicUsize,
}

impl FlakyBag {
    pub fn new(conflicts: usize, items: Vec<NodeHandle>) -> Arc<FlakyBag> {
        Arc::new(FlakyBag {
            items: Mutex::new(items),
            membership: Observers::new(),
            conflicts_left: AtomicUsize::new(conflicts),
        })
    }

    pub fn push(&self, item: NodeHandle) {
        self.items.lock().unwrap().push(Arc::clone(&item));
        self.membership.emit(&MembershipChange::Splice {
            removed: Vec::new(),
            added: vec![item],
        });
    }
}

impl Observable for FlakyBag {
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

impl Enumerate for FlakyBag {
    fn members(&self) -> Result<Vec<NodeHandle>, MembersInFlux> {
        let left = self.conflicts_left.load(Ordering::SeqCst);
        if left > 0 {
            self.conflicts_left.store(left - 1, Ordering::SeqCst);
            return Err(MembersInFlux);
        }
        Ok(self.items.lock().unwrap().clone())
    }
}

// ── NoisyList: container that also raises a Count scalar event ──────────

pub struct NoisyList {
    pub list: TrackedList,
    pub events: PropertyEvents,
}

impl NoisyList {
    pub fn new() -> Arc<NoisyList> {
        Arc::new(NoisyList {
            list: TrackedList::new(),
            events: PropertyEvents::new(),
        })
    }

    pub fn push(&self, item: NodeHandle) {
        self.list.push(item);
        self.events.raise_changed("Count");
    }
}

impl Observable for NoisyList {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn property_changing(&self) -> Option<&Observers<str>> {
        Some(self.events.changing())
    }
    fn property_changed(&self) -> Option<&Observers<str>> {
        Some(self.events.changed())
    }
    fn membership_changed(&self) -> Option<&Observers<MembershipChange>> {
        self.list.membership_changed()
    }
    fn enumerate(&self) -> Option<&dyn Enumerate> {
        self.list.enumerate()
    }
}

// ── Inert: a node with no observable capability ─────────────────────────

pub struct Inert;

impl Observable for Inert {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub fn inert() -> NodeHandle {
    Arc::new(Inert)
}

// ── Root notification recorders ─────────────────────────────────────────

pub fn record_changed(watcher: &GraphWatcher) -> Arc<Mutex<Vec<String>>> {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    watcher.on_changed(move |path| sink.lock().unwrap().push(path.to_owned()));
    log
}

pub fn record_changing(watcher: &GraphWatcher) -> Arc<Mutex<Vec<String>>> {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    watcher.on_changing(move |path| sink.lock().unwrap().push(path.to_owned()));
    log
}

pub fn paths(log: &Arc<Mutex<Vec<String>>>) -> Vec<String> {
    log.lock().unwrap().clone()
}
