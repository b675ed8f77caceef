#![forbid(unsafe_code)]

//! Reflective attribute discovery.
//!
//! Rust has no runtime reflection, so "reflectable" types declare a static
//! descriptor table instead: one [`AttrSpec`] per readable attribute, with a
//! plain function pointer that resolves the current value on a given
//! instance. The table is declared once per concrete type and cached
//! process-wide by the [`catalog`](crate::catalog).
//!
//! Accessors return `Option<NodeHandle>`: `None` means the attribute holds
//! nothing observable right now (unset, or a plain scalar), which is never
//! an error.

use std::any::Any;

use crate::node::NodeHandle;

/// Resolves an attribute's current value on a concrete instance.
///
/// The argument is the instance's [`as_any`](crate::Observable::as_any)
/// view; the accessor downcasts to its concrete type.
pub type Accessor = fn(&dyn Any) -> Option<NodeHandle>;

/// One readable attribute: a name and its accessor.
#[derive(Clone, Copy)]
pub struct AttrSpec {
    /// Attribute name as it appears in composed change paths.
    pub name: &'static str,
    /// Value accessor.
    pub get: Accessor,
}

impl std::fmt::Debug for AttrSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttrSpec").field("name", &self.name).finish()
    }
}

/// Capability: expose named, readable attributes.
pub trait Reflect: Send + Sync {
    /// Attribute descriptors, ordered base-first.
    ///
    /// When a name appears more than once (a derived declaration shadowing a
    /// base one), the later entry wins: the catalog keeps a single entry per
    /// name, mapped to the most-derived accessor.
    fn attributes(&self) -> &'static [AttrSpec];
}
