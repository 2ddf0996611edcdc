//! Locations and supports in normalized design space.

use std::collections::BTreeMap;
use std::iter::FromIterator;

use crate::tag::Tag;

/// A single axis's tent: rises linearly from 0 at `lower` to 1 at `peak`,
/// then falls linearly back to 0 at `upper`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tent {
    pub lower: f64,
    pub peak: f64,
    pub upper: f64,
}

impl Tent {
    pub fn new(lower: f64, peak: f64, upper: f64) -> Self {
        Tent { lower, peak, upper }
    }
}

impl From<(f64, f64, f64)> for Tent {
    fn from((lower, peak, upper): (f64, f64, f64)) -> Self {
        Tent::new(lower, peak, upper)
    }
}

/// A box-shaped support region: one [`Tent`] per constrained axis. Axes
/// absent from the map are unconstrained (contribute a factor of 1).
pub type Support = BTreeMap<Tag, Tent>;

/// A mapping from axis tag to a normalized coordinate in `[-1, 1]`.
///
/// Axes absent from the map are treated as `0`. Two locations are equal iff,
/// after dropping entries whose value is exactly `0`, their key sets and
/// values match — this "sparse" equality is what canonical sorting and
/// master deduplication rely on. [`insert`](Self::insert) maintains this
/// invariant on construction, so any `NormalizedLocation` built through the
/// public API is already sparse and `PartialEq` is plain map equality.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedLocation(BTreeMap<Tag, f64>);

impl NormalizedLocation {
    /// An empty location: all axes at their default.
    pub fn new() -> Self {
        NormalizedLocation(BTreeMap::new())
    }

    /// Build a location from (tag, value) pairs.
    pub fn from_iter(iter: impl IntoIterator<Item = (Tag, f64)>) -> Self {
        let mut loc = NormalizedLocation::new();
        for (tag, value) in iter {
            loc.insert(tag, value);
        }
        loc
    }

    /// Set an axis's value. Storing `0.0` is equivalent to removing the key,
    /// since absent axes already read back as `0`.
    pub fn insert(&mut self, tag: Tag, value: f64) {
        if value == 0.0 {
            self.0.remove(&tag);
        } else {
            self.0.insert(tag, value);
        }
    }

    /// The value at `tag`, or `0` if the axis is absent.
    pub fn get(&self, tag: &Tag) -> f64 {
        self.0.get(tag).copied().unwrap_or(0.0)
    }

    /// The axes explicitly present in this (already-sparse) location.
    pub fn keys(&self) -> impl Iterator<Item = &Tag> {
        self.0.keys()
    }

    /// Iterate over `(tag, value)` pairs actually stored.
    pub fn iter(&self) -> impl Iterator<Item = (&Tag, f64)> {
        self.0.iter().map(|(t, v)| (t, *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// A copy of this location with every explicit-zero entry dropped.
    ///
    /// Since [`insert`](Self::insert) never stores zeros, a `NormalizedLocation`
    /// already built through the public API returns a copy of itself; this is
    /// kept as an explicit step for locations assembled by other means.
    pub fn sparsify(&self) -> Self {
        let mut out = NormalizedLocation::new();
        for (tag, value) in self.iter() {
            out.insert(*tag, value);
        }
        out
    }
}

impl FromIterator<(Tag, f64)> for NormalizedLocation {
    fn from_iter<I: IntoIterator<Item = (Tag, f64)>>(iter: I) -> Self {
        NormalizedLocation::from_iter(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag;

    #[test]
    fn sparse_equality() {
        let a = NormalizedLocation::from_iter([(tag!("wght"), 0.0), (tag!("wdth"), 0.5)]);
        let b = NormalizedLocation::from_iter([(tag!("wdth"), 0.5)]);
        assert_eq!(a, b);
        assert_eq!(a.len(), 1);
    }

    #[test]
    fn absent_reads_as_zero() {
        let loc = NormalizedLocation::new();
        assert_eq!(loc.get(&tag!("wght")), 0.0);
    }
}
