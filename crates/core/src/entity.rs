//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Clients are entities (identified by their alias); service lines and journal
/// entries are values.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
