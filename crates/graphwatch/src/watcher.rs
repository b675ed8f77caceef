#![forbid(unsafe_code)]

//! The root consumer surface.
//!
//! [`GraphWatcher`] owns the top-level listener of a subscription tree and
//! mirrors the scalar-change channels outward: "about to change(path)" and
//! "changed(path)", where `path` is the fully composed dotted/bracketed
//! path from the root.
//!
//! # Lifecycle
//!
//! A watcher is constructed unsubscribed; [`subscribe`](GraphWatcher::subscribe)
//! fans listeners out over every reachable observable node;
//! [`dispose`](GraphWatcher::dispose) (or [`unsubscribe`](GraphWatcher::unsubscribe),
//! or dropping the watcher) tears the whole tree down. Disposal is
//! idempotent and safe to call from inside one of the watcher's own
//! callbacks; a disposed watcher cannot be resubscribed.

use std::sync::Arc;

use graphwatch_core::{AttrSpec, HandlerId, NodeHandle, Observers, catalog_for};

use crate::container::ContainerListener;
use crate::error::WatchError;
use crate::factory::Listener;
use crate::leaf::LeafListener;
use crate::link::{Link, Phase, Sink};

type AttrFilter = Arc<dyn Fn(&AttrSpec) -> bool + Send + Sync>;
type NodeFilter = Arc<dyn Fn(&NodeHandle) -> bool + Send + Sync>;

/// Optional narrowing applied when building a subscription tree.
#[derive(Clone, Default)]
pub struct WatchConfig {
    attr_filter: Option<AttrFilter>,
    node_filter: Option<NodeFilter>,
}

impl WatchConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Observe only the root attributes `keep` accepts (e.g. "is this a
    /// model-mapped property"). Applies to the root catalog only; nested
    /// listeners observe their full catalogs.
    #[must_use]
    pub fn attribute_filter(mut self, keep: impl Fn(&AttrSpec) -> bool + Send + Sync + 'static) -> Self {
        self.attr_filter = Some(Arc::new(keep));
        self
    }

    /// Reject candidate nodes anywhere in the tree: a value `include`
    /// refuses gets no listener (its position still reports container/
    /// attribute changes; its own mutations go unobserved).
    #[must_use]
    pub fn node_filter(mut self, include: impl Fn(&NodeHandle) -> bool + Send + Sync + 'static) -> Self {
        self.node_filter = Some(Arc::new(include));
        self
    }

    pub(crate) fn node_filter_fn(&self) -> Option<&NodeFilter> {
        self.node_filter.as_ref()
    }
}

impl std::fmt::Debug for WatchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchConfig")
            .field("attr_filter", &self.attr_filter.is_some())
            .field("node_filter", &self.node_filter.is_some())
            .finish()
    }
}

/// Root handle for one subscription tree.
pub struct GraphWatcher {
    root: Arc<dyn Listener>,
    changing: Arc<Observers<str>>,
    changed: Arc<Observers<str>>,
}

impl GraphWatcher {
    /// Build an unsubscribed watcher for `root`.
    ///
    /// # Errors
    ///
    /// [`WatchError::Unobservable`] when `root` offers neither a scalar nor
    /// a membership channel.
    pub fn new(root: NodeHandle) -> Result<Self, WatchError> {
        Self::with_config(root, WatchConfig::default())
    }

    /// Build an unsubscribed watcher for `root` with narrowing predicates.
    ///
    /// # Errors
    ///
    /// [`WatchError::Unobservable`] when `root` offers neither a scalar nor
    /// a membership channel.
    pub fn with_config(root: NodeHandle, config: WatchConfig) -> Result<Self, WatchError> {
        let changing = Arc::new(Observers::new());
        let changed = Arc::new(Observers::new());
        let sink: Sink = {
            let changing = Arc::clone(&changing);
            let changed = Arc::clone(&changed);
            Arc::new(move |phase, path: &str| match phase {
                Phase::Changing => changing.emit(path),
                Phase::Changed => changed.emit(path),
            })
        };

        let attr_filter = config.attr_filter.clone();
        let config = Arc::new(config);
        let listener: Arc<dyn Listener> = if root.membership_changed().is_some() {
            ContainerListener::new(Link::root(root, sink, config))
        } else if root.property_changed().is_some() {
            let mut catalog = catalog_for(root.as_ref());
            if let Some(keep) = attr_filter {
                catalog = Arc::new(catalog.narrowed(|spec| keep(spec)));
            }
            LeafListener::new(Link::root(root, sink, config), catalog)
        } else {
            return Err(WatchError::Unobservable);
        };

        Ok(Self {
            root: listener,
            changing,
            changed,
        })
    }

    /// Attach the whole tree: after this returns, every currently-reachable,
    /// non-cyclic, observable descendant has an active listener.
    ///
    /// Subscribing an already-active watcher is a no-op.
    ///
    /// # Errors
    ///
    /// [`WatchError::Disposed`] — the lifecycle is single-use.
    pub fn subscribe(&self) -> Result<(), WatchError> {
        if self.root.link().is_disposed() {
            return Err(WatchError::Disposed);
        }
        self.root.attach();
        Ok(())
    }

    /// Register a root "about to change(path)" callback.
    pub fn on_changing(&self, handler: impl Fn(&str) + Send + Sync + 'static) -> HandlerId {
        self.changing.observe(handler)
    }

    /// Register a root "changed(path)" callback.
    pub fn on_changed(&self, handler: impl Fn(&str) + Send + Sync + 'static) -> HandlerId {
        self.changed.observe(handler)
    }

    /// Remove a callback registered with [`on_changing`](Self::on_changing).
    pub fn remove_changing(&self, id: HandlerId) -> bool {
        self.changing.remove(id)
    }

    /// Remove a callback registered with [`on_changed`](Self::on_changed).
    pub fn remove_changed(&self, id: HandlerId) -> bool {
        self.changed.remove(id)
    }

    /// Tear the tree down: children first, then own hooks, then the root
    /// callback lists. Idempotent; safe to call reentrantly from a callback.
    pub fn dispose(&self) {
        self.root.detach();
        self.changing.clear();
        self.changed.clear();
    }

    /// Alias for [`dispose`](Self::dispose): both names perform the same
    /// terminal transition.
    pub fn unsubscribe(&self) {
        self.dispose();
    }

    /// Whether the watcher has reached its terminal state.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.root.link().is_disposed()
    }
}

impl Drop for GraphWatcher {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for GraphWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphWatcher")
            .field("disposed", &self.is_disposed())
            .finish()
    }
}
