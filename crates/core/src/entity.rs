//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Stock moves, move lines and product templates are long-lived records owned
/// by the host; this crate only reads them and rewrites selected fields, so
/// identity is all the trait needs to expose.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
