use std::fmt::{Debug, Formatter};

use crate::error::Result;
use crate::types::AttributeId;

/// A set of attribute ids drawn from a fixed universe `[0, universe)`.
///
/// Every representation must agree on membership: two sets built from the same sequence of
/// [`add`](AttributeSet::add) calls answer [`contains_all`](AttributeSet::contains_all)
/// identically, whatever their storage layout.
pub trait AttributeSet: Clone + Debug + Send + Sync {
    type Ids<'a>: Iterator<Item = AttributeId>
    where
        Self: 'a;

    /// Creates an empty set over `[0, universe)`.
    fn empty(universe: usize) -> Self;

    /// Size of the universe this set was created for.
    fn universe(&self) -> usize;

    /// Inserts `id`, returning whether it was newly added.
    ///
    /// Returns an error if `id` lies outside the universe.
    fn add(&mut self, id: AttributeId) -> Result<bool>;

    fn contains(&self, id: AttributeId) -> bool;

    /// Returns true iff every member of `other` is also a member of `self`.
    ///
    /// Neither operand is modified. This is the admission test run for every candidate the
    /// search engine visits.
    fn contains_all(&self, other: &Self) -> bool;

    /// Returns the members common to both sets.
    fn intersect(&self, other: &Self) -> Self;

    /// Returns the members of either set.
    fn union(&self, other: &Self) -> Self;

    /// Number of members.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Estimated in-memory footprint in bytes.
    fn size_in_bytes(&self) -> usize;

    /// Iterates over the members in ascending order.
    fn ids(&self) -> Self::Ids<'_>;

    /// Builds a set over `[0, universe)` holding `ids`.
    fn from_ids<I: IntoIterator<Item = AttributeId>>(universe: usize, ids: I) -> Result<Self> {
        let mut set = Self::empty(universe);
        for id in ids {
            set.add(id)?;
        }
        Ok(set)
    }
}

/// Returns true if both sets hold exactly the same attribute ids, regardless of representation.
pub fn same_members<A: AttributeSet, B: AttributeSet>(a: &A, b: &B) -> bool {
    a.len() == b.len() && a.ids().eq(b.ids())
}

/// Formats the members of `set` as `{a, b, c}`.
pub(crate) fn fmt_members<S: AttributeSet>(set: &S, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(
        f,
        "{{{}}}",
        set.ids()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    )
}
