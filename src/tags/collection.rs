//! Tag Collection
//!
//! A set-based tagging abstraction used for rule matching by category rather than identity.

use std::{
    fmt,
    ops::{BitAnd, BitOr, BitOrAssign},
};

/// Trait for tag collections that support set comparisons.
pub trait TagCollection:
    Clone + fmt::Debug + PartialEq + BitAnd<Output = Self> + BitOr<Output = Self> + BitOrAssign
{
    /// Check if this collection shares at least one tag with another collection.
    fn intersects(&self, other: &Self) -> bool;

    /// Get the intersection of this collection with another.
    #[must_use]
    fn intersection(&self, other: &Self) -> Self;

    /// Check if every tag in `other` is also present in this collection.
    ///
    /// An empty `other` is vacuously contained.
    fn contains_all(&self, other: &Self) -> bool {
        other.is_empty() || self.intersection(other).len() == other.len()
    }

    /// Check if this collection contains a specific tag.
    fn contains(&self, tag: &str) -> bool;

    /// Check if this collection is empty.
    fn is_empty(&self) -> bool;

    /// Get the number of tags in this collection.
    fn len(&self) -> usize;

    /// Create an empty collection.
    fn empty() -> Self;

    /// Add a tag to this collection.
    fn add(&mut self, tag: &str);
}
