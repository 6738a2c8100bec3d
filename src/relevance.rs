//! Locations and the relevance-map algebra used to combine term lookups.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::hash_map::{self, HashMap};
use std::fmt;

/// Absolute address of a crawlable document.
///
/// Equality is exact-string: no normalization of scheme case, trailing slashes
/// or fragments is performed, so `https://a.test/x` and `https://a.test/x/` are
/// distinct locations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Location(String);

impl Location {
    /// Wraps a raw address.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the raw address.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the location, returning the raw address.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Location {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Location {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Location {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Location {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<url::Url> for Location {
    fn from(value: url::Url) -> Self {
        Self(value.into())
    }
}

/// Mapping from [`Location`] to a non-negative relevance score.
///
/// A missing key means relevance 0. Every combinator returns a fresh map and
/// leaves both operands untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelevanceMap {
    scores: HashMap<Location, f64>,
}

impl RelevanceMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the score of `location`, replacing any previous value.
    pub fn insert(&mut self, location: impl Into<Location>, score: f64) {
        self.scores.insert(location.into(), score);
    }

    /// Relevance of `location`, or 0 when it is absent.
    pub fn relevance(&self, location: &str) -> f64 {
        self.scores.get(location).copied().unwrap_or(0.0)
    }

    /// Whether `location` has an entry.
    pub fn contains(&self, location: &str) -> bool {
        self.scores.contains_key(location)
    }

    /// Number of locations in the map.
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// Whether the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Iterates over `(location, score)` pairs in unspecified order.
    pub fn iter(&self) -> hash_map::Iter<'_, Location, f64> {
        self.scores.iter()
    }

    /// Iterates over the locations in unspecified order.
    pub fn locations(&self) -> hash_map::Keys<'_, Location, f64> {
        self.scores.keys()
    }

    /// Union: every location of either side, scored `self + other`.
    pub fn or(&self, other: &RelevanceMap) -> RelevanceMap {
        let mut scores = other.scores.clone();
        for (location, score) in &self.scores {
            *scores.entry(location.clone()).or_insert(0.0) += score;
        }
        RelevanceMap { scores }
    }

    /// Intersection: locations present on both sides, scored `self + other`.
    ///
    /// The combined score is a sum, not a product: "both matched" is weighted
    /// by the total relevance of the two operands.
    pub fn and(&self, other: &RelevanceMap) -> RelevanceMap {
        self.scores
            .iter()
            .filter_map(|(location, score)| {
                other
                    .scores
                    .get(location)
                    .map(|theirs| (location.clone(), score + theirs))
            })
            .collect()
    }

    /// Difference: locations of `self` absent from `other`, scores unchanged.
    pub fn minus(&self, other: &RelevanceMap) -> RelevanceMap {
        self.scores
            .iter()
            .filter(|(location, _)| !other.scores.contains_key(*location))
            .map(|(location, score)| (location.clone(), *score))
            .collect()
    }

    /// Multiplies every score by `factor`.
    pub fn scaled(&self, factor: f64) -> RelevanceMap {
        self.scores
            .iter()
            .map(|(location, score)| (location.clone(), score * factor))
            .collect()
    }
}

impl<L: Into<Location>> FromIterator<(L, f64)> for RelevanceMap {
    fn from_iter<I: IntoIterator<Item = (L, f64)>>(iter: I) -> Self {
        Self {
            scores: iter
                .into_iter()
                .map(|(location, score)| (location.into(), score))
                .collect(),
        }
    }
}

impl IntoIterator for RelevanceMap {
    type Item = (Location, f64);
    type IntoIter = hash_map::IntoIter<Location, f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.scores.into_iter()
    }
}

impl<'a> IntoIterator for &'a RelevanceMap {
    type Item = (&'a Location, &'a f64);
    type IntoIter = hash_map::Iter<'a, Location, f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.scores.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn map(entries: &[(&str, f64)]) -> RelevanceMap {
        entries.iter().map(|(loc, score)| (*loc, *score)).collect()
    }

    fn keys(map: &RelevanceMap) -> BTreeSet<&str> {
        map.locations().map(Location::as_str).collect()
    }

    fn cat() -> RelevanceMap {
        map(&[("A", 2.0), ("B", 1.0)])
    }

    fn dog() -> RelevanceMap {
        map(&[("B", 3.0), ("C", 1.0)])
    }

    #[test]
    fn or_sums_over_union() {
        assert_eq!(cat().or(&dog()), map(&[("A", 2.0), ("B", 4.0), ("C", 1.0)]));
    }

    #[test]
    fn and_sums_over_intersection() {
        assert_eq!(cat().and(&dog()), map(&[("B", 4.0)]));
    }

    #[test]
    fn minus_keeps_left_scores() {
        assert_eq!(cat().minus(&dog()), map(&[("A", 2.0)]));
        assert_eq!(dog().minus(&cat()), map(&[("C", 1.0)]));
    }

    #[test]
    fn or_is_commutative_and_associative() {
        let third = map(&[("C", 0.5), ("D", 7.0)]);
        assert_eq!(cat().or(&dog()), dog().or(&cat()));
        assert_eq!(
            cat().or(&dog()).or(&third),
            cat().or(&dog().or(&third))
        );
    }

    #[test]
    fn and_keys_are_intersection() {
        let left = map(&[("A", 1.0), ("B", 1.0), ("C", 1.0)]);
        let right = map(&[("B", 2.0), ("C", 2.0), ("D", 2.0)]);
        let expected: BTreeSet<&str> = ["B", "C"].into_iter().collect();
        assert_eq!(keys(&left.and(&right)), expected);
        assert_eq!(left.and(&right), right.and(&left));
    }

    #[test]
    fn self_combination_doubles_scores() {
        let doubled = map(&[("A", 4.0), ("B", 2.0)]);
        assert_eq!(cat().or(&cat()), doubled);
        assert_eq!(cat().and(&cat()), doubled);
        assert!(cat().minus(&cat()).is_empty());
    }

    #[test]
    fn operands_are_not_mutated() {
        let left = cat();
        let right = dog();
        let _ = left.or(&right);
        let _ = left.and(&right);
        let _ = left.minus(&right);
        assert_eq!(left, cat());
        assert_eq!(right, dog());
    }

    #[test]
    fn absent_location_has_zero_relevance() {
        assert_eq!(cat().relevance("Z"), 0.0);
        assert_eq!(cat().relevance("A"), 2.0);
    }

    #[test]
    fn locations_compare_exactly() {
        let trailing = map(&[("https://a.test/x/", 1.0)]);
        assert!(!trailing.contains("https://a.test/x"));
        assert_ne!(Location::from("HTTPS://a.test"), Location::from("https://a.test"));
    }
}
