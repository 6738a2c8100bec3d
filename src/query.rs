//! Query parsing and evaluation over term lookups.
//!
//! A query is either one binary operator over two literal operands, or a list of
//! words. Operator detection is a plain substring scan in the fixed order
//! `" or "`, `" and "`, `" minus "`; there is no precedence and no nesting, so
//! `"a and b or c"` splits on `" or "` into `"a and b"` and `"c"`.

use crate::relevance::RelevanceMap;
use tracing::debug;

/// Binary operators recognized in a query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// Union, scored by sum.
    Or,
    /// Intersection, scored by sum.
    And,
    /// Left operand without anything matched by the right operand.
    Minus,
}

impl Operator {
    /// Scan order for operator detection.
    pub const PRIORITY: [Operator; 3] = [Operator::Or, Operator::And, Operator::Minus];

    /// Literal separator, including its surrounding spaces.
    pub fn separator(self) -> &'static str {
        match self {
            Operator::Or => " or ",
            Operator::And => " and ",
            Operator::Minus => " minus ",
        }
    }

    /// Applies the operator to two evaluated operands.
    pub fn apply(self, left: &RelevanceMap, right: &RelevanceMap) -> RelevanceMap {
        match self {
            Operator::Or => left.or(right),
            Operator::And => left.and(right),
            Operator::Minus => left.minus(right),
        }
    }
}

/// Flat query structure produced by [`Query::parse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query<'a> {
    /// One operator over two literal operands, split at the first occurrence of the separator.
    Binary {
        /// The complete query string.
        full: &'a str,
        /// Detected operator.
        op: Operator,
        /// Text before the separator.
        left: &'a str,
        /// Text after the separator.
        right: &'a str,
    },
    /// Space-separated words combined by the all-words policy.
    Words {
        /// The complete query string.
        full: &'a str,
        /// Non-empty words, in query order. Empty pieces left by leading,
        /// trailing or repeated spaces are dropped.
        words: Vec<&'a str>,
    },
}

impl<'a> Query<'a> {
    /// Parses a raw query string.
    pub fn parse(input: &'a str) -> Self {
        for op in Operator::PRIORITY {
            if let Some((left, right)) = input.split_once(op.separator()) {
                return Query::Binary {
                    full: input,
                    op,
                    left,
                    right,
                };
            }
        }

        Query::Words {
            full: input,
            words: input.split(' ').filter(|word| !word.is_empty()).collect(),
        }
    }

    /// The complete query string.
    pub fn full(&self) -> &'a str {
        match self {
            Query::Binary { full, .. } | Query::Words { full, .. } => full,
        }
    }

    /// Whether the query carries nothing to look up.
    pub fn is_empty(&self) -> bool {
        matches!(self, Query::Words { words, .. } if words.is_empty())
    }
}

/// Evaluates `input` into a single relevance map.
///
/// The complete query string is always looked up once and unioned with the
/// split evaluation:
///
/// - binary: `lookup(full) OR (lookup(left) <op> lookup(right))`
/// - words: `lookup(full) OR AND(words) OR OR(words)`
///
/// A query without words returns an empty map and performs no lookups.
pub fn evaluate<F>(input: &str, mut lookup: F) -> RelevanceMap
where
    F: FnMut(&str) -> RelevanceMap,
{
    let query = Query::parse(input);
    if query.is_empty() {
        debug!(query = input, "query has no terms");
        return RelevanceMap::new();
    }

    let whole = lookup(query.full());
    match query {
        Query::Binary {
            op, left, right, ..
        } => {
            debug!(query = input, ?op, left, right, "evaluating binary query");
            let combined = op.apply(&lookup(left), &lookup(right));
            whole.or(&combined)
        }
        Query::Words { words, .. } => {
            debug!(query = input, words = words.len(), "evaluating word query");
            let mut maps = words.into_iter().map(|word| lookup(word));
            let Some(first) = maps.next() else {
                return whole;
            };
            let (intersection, union) = maps.fold(
                (first.clone(), first),
                |(intersection, union), next| (intersection.and(&next), union.or(&next)),
            );
            whole.or(&intersection).or(&union)
        }
    }
}
