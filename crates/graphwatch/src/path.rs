#![forbid(unsafe_code)]

//! Property-path composition.
//!
//! Paths are dotted/bracketed strings built from the root down:
//! `Address.City`, `Orders[]`, `Orders[].Name`. Composition is a pure
//! function of two segments; no listener state is involved.

/// Synthetic segment for "some member of this container".
pub const MEMBER_WILDCARD: &str = "[]";

/// Compose a child path under a parent segment.
///
/// - No parent segment: the child path is returned unchanged.
/// - Child starts with the member-wildcard bracket: direct concatenation,
///   so container paths read `Orders[]`, not `Orders.[]`.
/// - Otherwise: dot-joined.
#[must_use]
pub fn compose(parent: Option<&str>, child: &str) -> String {
    match parent {
        None | Some("") => child.to_owned(),
        Some(parent) if child.starts_with('[') => format!("{parent}{child}"),
        Some(parent) => format!("{parent}.{child}"),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
