//! Tunable search configuration
//!
//! All scoring constants live in [`ScoreWeights`]. Only the relative
//! ordering they produce matters to callers, so they are plain data and can
//! be loaded from JSON alongside the rest of [`SearchConfig`].

use crate::error::EngineResult;
use crate::types::{CaseMatching, MatchMode};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    /// Added for every matched character
    pub match_base: i64,
    /// Match right after `/` (or at the start of the text)
    pub bonus_slash: i64,
    /// Match right after space, `_` or `-`
    pub bonus_word: i64,
    /// Uppercase match right after a lowercase character
    pub bonus_camel: i64,
    /// Match right after `.`
    pub bonus_dot: i64,
    /// Match directly following the previous match; replaces the boundary bonus
    pub bonus_consecutive: i64,
    /// Matched character has the same case as the query character
    pub bonus_exact_case: i64,
    /// Per character skipped before the first match
    pub gap_leading: i64,
    /// Per character skipped between two matches
    pub gap_inner: i64,
    /// Per character after the last match
    pub gap_trailing: i64,
    /// Exact mode: per character of the matched substring
    pub exact_length: i64,
    /// Exact mode: per character before the substring starts
    pub exact_offset: i64,
    /// Score of every candidate against an empty query
    pub neutral: i64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            match_base: 16,
            bonus_slash: 180,
            bonus_word: 160,
            bonus_camel: 140,
            bonus_dot: 120,
            bonus_consecutive: 200,
            bonus_exact_case: 4,
            gap_leading: -1,
            gap_inner: -2,
            gap_trailing: -1,
            exact_length: 200,
            exact_offset: -1,
            neutral: 0,
        }
    }
}

/// Search session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub weights: ScoreWeights,
    pub case_matching: CaseMatching,
    /// Mode applied to tokens without the exact prefix
    pub match_mode: MatchMode,
    /// Token prefix requesting exact matching for that token only
    pub exact_prefix: Option<char>,
    pub multiselect: bool,
    /// Wrap the highlighted cursor around the list ends
    pub cycle: bool,
    /// Delay ranking on large candidate sets
    pub debounce: bool,
    pub default_query: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            case_matching: CaseMatching::Insensitive,
            match_mode: MatchMode::Fuzzy,
            exact_prefix: Some('\''),
            multiselect: false,
            cycle: true,
            debounce: false,
            default_query: String::new(),
        }
    }
}

impl SearchConfig {
    pub fn from_json_str(json: &str) -> EngineResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: &Path) -> EngineResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let config =
            SearchConfig::from_json_str(r#"{"match_mode":"exact","weights":{"gap_inner":-5}}"#)
                .unwrap();
        assert_eq!(config.match_mode, MatchMode::Exact);
        assert_eq!(config.weights.gap_inner, -5);
        assert_eq!(config.weights.bonus_consecutive, 200);
        assert!(config.cycle);
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let err = SearchConfig::from_json_str("{not json").unwrap_err();
        assert!(err.to_string().starts_with("Config error"));
    }
}
