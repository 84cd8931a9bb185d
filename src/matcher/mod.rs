//! Per-candidate matching
//!
//! A query is parsed into tokens ([`query::ParsedQuery`]); every token is
//! scored against the candidate text by either the fuzzy scorer or the
//! exact matcher, and a candidate is kept only if all tokens match.

pub mod exact;
pub mod fuzzy;
pub mod query;

pub use exact::ExactMatcher;
pub use fuzzy::{FuzzyScorer, FuzzyScratch};
pub use query::{ParsedQuery, QueryToken};

use crate::config::ScoreWeights;
use crate::types::{CaseMatching, Match, MatchMode};

/// Scores a single query token against a single candidate text.
///
/// Both slices are char sequences; returned positions index into
/// `haystack`.
pub trait Scorer {
    fn score(&self, needle: &[char], haystack: &[char], case_sensitive: bool) -> Option<Match>;

    /// Convenience wrapper over `&str` inputs.
    fn score_str(&self, query: &str, text: &str, case: CaseMatching) -> Option<Match> {
        let needle: Vec<char> = query.chars().collect();
        let haystack: Vec<char> = text.chars().collect();
        self.score(&needle, &haystack, case.is_sensitive_for(query))
    }
}

/// Fold a character for comparison under the given case policy.
///
/// Always maps one char to one char so positions stay aligned with the
/// original text.
#[inline]
pub(crate) fn fold(c: char, case_sensitive: bool) -> char {
    if case_sensitive {
        c
    } else if c.is_ascii() {
        c.to_ascii_lowercase()
    } else {
        c.to_lowercase().next().unwrap_or(c)
    }
}

#[inline]
pub(crate) fn chars_eq(a: char, b: char, case_sensitive: bool) -> bool {
    a == b || fold(a, case_sensitive) == fold(b, case_sensitive)
}

/// Outcome of matching a whole (possibly multi-token) query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryMatch {
    pub score: i64,
    pub positions: Vec<usize>,
    pub exact: bool,
}

/// Matches parsed queries using both token modes.
#[derive(Debug, Clone)]
pub struct QueryMatcher<'a> {
    weights: &'a ScoreWeights,
    fuzzy: FuzzyScorer<'a>,
    exact: ExactMatcher<'a>,
    scratch: FuzzyScratch,
}

impl<'a> QueryMatcher<'a> {
    pub fn new(weights: &'a ScoreWeights) -> Self {
        Self {
            weights,
            fuzzy: FuzzyScorer::new(weights),
            exact: ExactMatcher::new(weights),
            scratch: FuzzyScratch::new(),
        }
    }

    /// Match every token; scores are summed, positions merged.
    pub fn match_query(&mut self, query: &ParsedQuery, haystack: &[char]) -> Option<QueryMatch> {
        if query.is_empty() {
            return Some(QueryMatch {
                score: self.weights.neutral,
                positions: Vec::new(),
                exact: false,
            });
        }

        let mut score = 0i64;
        let mut positions = Vec::new();
        for token in query.tokens() {
            let matched = match token.mode {
                MatchMode::Fuzzy => self.fuzzy.score_with(
                    &mut self.scratch,
                    &token.chars,
                    haystack,
                    token.case_sensitive,
                ),
                MatchMode::Exact => self.exact.score(&token.chars, haystack, token.case_sensitive),
            }?;
            score = score.saturating_add(matched.score);
            positions.extend(matched.positions);
        }

        if query.len() > 1 {
            positions.sort_unstable();
            positions.dedup();
        }

        Some(QueryMatch {
            score,
            positions,
            exact: query.tokens().iter().all(|t| t.mode == MatchMode::Exact),
        })
    }
}
