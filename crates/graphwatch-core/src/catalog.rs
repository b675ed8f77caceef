#![forbid(unsafe_code)]

//! Process-global, per-type catalog of reflectable attributes.
//!
//! Building an attribute table is cheap but not free, and one listener is
//! created per reachable node, so the catalog amortizes the work: one
//! [`TypeCatalog`] per distinct concrete type, built on first use and shared
//! by every listener for the process lifetime.
//!
//! # Concurrency
//!
//! Lookups use a short-lock map of per-type once-cells: the map lock covers
//! only slot lookup/insertion, and the catalog itself is built inside the
//! slot's `OnceLock`, so concurrent first lookups for the same type never
//! compute the table twice and never block lookups for other types.
//!
//! There is no eviction. [`clear`] exists for test isolation only.

use std::any::TypeId;
use std::sync::{Arc, Mutex, OnceLock};

use ahash::AHashMap;
use tracing::trace;

use crate::node::Observable;
use crate::reflect::{AttrSpec, Reflect};
use crate::sync::lock;

/// Immutable attribute table for one concrete type.
///
/// Holds one entry per attribute name; when the declaring type shadows a
/// base declaration of the same name, the most-derived accessor is kept.
pub struct TypeCatalog {
    attrs: Vec<AttrSpec>,
    index: AHashMap<&'static str, usize>,
}

impl TypeCatalog {
    /// An empty catalog (used for types without a `Reflect` capability).
    #[must_use]
    pub fn empty() -> Self {
        Self {
            attrs: Vec::new(),
            index: AHashMap::new(),
        }
    }

    fn build(specs: &[AttrSpec]) -> Self {
        let mut catalog = Self::empty();
        for spec in specs {
            match catalog.index.get(spec.name) {
                // Derived declaration shadows the earlier one.
                Some(&slot) => catalog.attrs[slot] = *spec,
                None => {
                    catalog.index.insert(spec.name, catalog.attrs.len());
                    catalog.attrs.push(*spec);
                }
            }
        }
        catalog
    }

    /// Look up an attribute by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&AttrSpec> {
        self.index.get(name).map(|&slot| &self.attrs[slot])
    }

    /// Iterate attributes in declaration order (base first, shadowed
    /// entries already collapsed).
    pub fn iter(&self) -> impl Iterator<Item = &AttrSpec> {
        self.attrs.iter()
    }

    /// Number of distinct attribute names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    /// Whether the catalog has no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    /// A copy narrowed to the attributes `keep` accepts.
    #[must_use]
    pub fn narrowed(&self, keep: impl Fn(&AttrSpec) -> bool) -> Self {
        let kept: Vec<AttrSpec> = self.attrs.iter().filter(|spec| keep(spec)).copied().collect();
        Self::build(&kept)
    }
}

impl std::fmt::Debug for TypeCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeCatalog").field("attrs", &self.attrs).finish()
    }
}

type Slot = Arc<OnceLock<Arc<TypeCatalog>>>;

static CATALOGS: OnceLock<Mutex<AHashMap<TypeId, Slot>>> = OnceLock::new();

fn table() -> &'static Mutex<AHashMap<TypeId, Slot>> {
    CATALOGS.get_or_init(|| Mutex::new(AHashMap::new()))
}

/// The catalog for `instance`'s concrete type, built on first use.
///
/// A type without the [`Reflect`] capability gets a cached empty catalog.
#[must_use]
pub fn catalog_for(instance: &dyn Observable) -> Arc<TypeCatalog> {
    let key = instance.as_any().type_id();
    let slot = lock(table()).entry(key).or_default().clone();
    slot.get_or_init(|| {
        let specs = instance.reflect().map_or(&[][..], Reflect::attributes);
        trace!(attrs = specs.len(), ?key, "type catalog built");
        Arc::new(TypeCatalog::build(specs))
    })
    .clone()
}

/// Drop every cached catalog. Test isolation only; production code never
/// needs this.
pub fn clear() {
    lock(table()).clear();
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
