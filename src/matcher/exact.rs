//! Literal substring matcher

use super::{chars_eq, Scorer};
use crate::config::ScoreWeights;
use crate::types::Match;

/// Matches a token as a contiguous substring, at its earliest occurrence.
///
/// Longer matches and matches closer to the start score higher.
#[derive(Debug, Clone, Copy)]
pub struct ExactMatcher<'a> {
    weights: &'a ScoreWeights,
}

impl<'a> ExactMatcher<'a> {
    pub fn new(weights: &'a ScoreWeights) -> Self {
        Self { weights }
    }
}

impl Scorer for ExactMatcher<'_> {
    fn score(&self, needle: &[char], haystack: &[char], case_sensitive: bool) -> Option<Match> {
        let n = needle.len();
        if n == 0 {
            return Some(Match {
                score: self.weights.neutral,
                positions: Vec::new(),
            });
        }
        if haystack.len() < n {
            return None;
        }

        let start = haystack.windows(n).position(|window| {
            window
                .iter()
                .zip(needle)
                .all(|(&h, &q)| chars_eq(q, h, case_sensitive))
        })?;

        let same_case = haystack[start..start + n]
            .iter()
            .zip(needle)
            .filter(|(h, q)| h == q)
            .count() as i64;

        let w = self.weights;
        let score = (n as i64)
            .saturating_mul(w.exact_length)
            .saturating_add((start as i64).saturating_mul(w.exact_offset))
            .saturating_add(same_case.saturating_mul(w.bonus_exact_case));

        Some(Match {
            score,
            positions: (start..start + n).collect(),
        })
    }
}
