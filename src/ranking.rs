//! IDF re-weighting and deterministic ordering of query results.

use crate::relevance::{Location, RelevanceMap};
use serde::Serialize;
use std::cmp::Ordering;

/// Corpus size assumed when none is configured.
pub const DEFAULT_TOTAL_PAGES: u64 = 10_000;
/// Number of entries presented when the full result is not requested.
pub const DEFAULT_RESULT_LIMIT: usize = 20;

/// One scored location inside a [`RankedResult`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntry {
    /// Matching document.
    pub location: Location,
    /// IDF-adjusted score.
    pub score: f64,
}

/// Result list sorted by ascending score; the most relevant entry is last.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RankedResult {
    idf: f64,
    entries: Vec<RankedEntry>,
}

impl RankedResult {
    /// Factor every score was multiplied by (0 for an empty result).
    pub fn idf(&self) -> f64 {
        self.idf
    }

    /// Number of ranked entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing matched.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in ascending score order.
    pub fn entries(&self) -> &[RankedEntry] {
        &self.entries
    }

    /// Entries from most to least relevant.
    pub fn best_first(&self) -> impl Iterator<Item = &RankedEntry> + '_ {
        self.entries.iter().rev()
    }

    /// The presented slice of the result, best first: everything when `limit` is
    /// `None`, otherwise at most `limit` entries.
    pub fn top(&self, limit: Option<usize>) -> impl Iterator<Item = &RankedEntry> + '_ {
        self.best_first().take(limit.unwrap_or(usize::MAX))
    }

    /// Consumes the result, returning entries in ascending score order.
    pub fn into_entries(self) -> Vec<RankedEntry> {
        self.entries
    }
}

/// Inverse document frequency for a result set of `term_pages` documents.
///
/// Returns `None` when `term_pages` is zero.
pub fn idf(total_pages: u64, term_pages: usize) -> Option<f64> {
    if term_pages == 0 {
        return None;
    }
    let ratio = total_pages as f64 / term_pages as f64;
    Some((ratio.ln() + 1.0).abs())
}

/// Scales every score of `map` by one IDF factor and sorts ascending.
///
/// The factor is derived from the cardinality of the whole map, not per
/// posting. Ties are broken by location so the order is reproducible. An empty
/// map yields an empty result.
pub fn rank(map: RelevanceMap, total_pages: u64) -> RankedResult {
    let Some(idf) = idf(total_pages, map.len()) else {
        return RankedResult::default();
    };

    let mut entries: Vec<RankedEntry> = map
        .into_iter()
        .map(|(location, score)| RankedEntry {
            location,
            score: score * idf,
        })
        .collect();
    entries.sort_by(ascending);

    RankedResult { idf, entries }
}

fn ascending(a: &RankedEntry, b: &RankedEntry) -> Ordering {
    a.score
        .total_cmp(&b.score)
        .then_with(|| a.location.cmp(&b.location))
}
