//! Ranking over the whole candidate store
//!
//! Every candidate is matched against the parsed query; non-matches are
//! dropped and the rest sorted by score, ties kept in insertion order.
//! Candidates whose text cannot be used are skipped and logged.

use crate::config::SearchConfig;
use crate::error::EngineError;
use crate::matcher::{ParsedQuery, QueryMatcher};
use crate::store::CandidateStore;
use crate::types::{Candidate, MatchResult, RankedList};

#[derive(Debug, Clone, Copy)]
pub struct Ranker<'a> {
    config: &'a SearchConfig,
}

impl<'a> Ranker<'a> {
    pub fn new(config: &'a SearchConfig) -> Self {
        Self { config }
    }

    pub fn rank<T>(&self, store: &CandidateStore<T>, query: &str) -> RankedList {
        let parsed = ParsedQuery::parse(query, self.config);
        let mut matcher = QueryMatcher::new(&self.config.weights);
        let mut chars = Vec::new();

        let mut results = Vec::new();
        let mut skipped = 0usize;
        for (order, candidate) in store.iter().enumerate() {
            if let Err(err) = candidate_chars(candidate, &mut chars) {
                log::warn!("Skipping candidate: {}", err);
                skipped += 1;
                continue;
            }

            if let Some(matched) = matcher.match_query(&parsed, &chars) {
                results.push(MatchResult {
                    candidate_id: candidate.id.clone(),
                    order,
                    score: matched.score,
                    positions: matched.positions,
                    exact: matched.exact,
                });
            }
        }

        results.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.order.cmp(&b.order)));

        log::trace!(
            "Ranked {:?}: {}/{} matched, {} skipped",
            query,
            results.len(),
            store.len(),
            skipped
        );

        RankedList {
            query: query.to_string(),
            results,
        }
    }
}

/// Load the chars of a candidate's display text into `chars`, or report
/// why it cannot be ranked.
fn candidate_chars<T>(candidate: &Candidate<T>, chars: &mut Vec<char>) -> Result<(), EngineError> {
    let text = candidate
        .text()
        .ok_or_else(|| EngineError::MalformedCandidateText {
            id: candidate.id.clone(),
            reason: "display text is not valid UTF-8".to_string(),
        })?;

    if let Some(bad) = text.chars().find(|&c| c == '\0' || c == '\n' || c == '\r') {
        return Err(EngineError::MalformedCandidateText {
            id: candidate.id.clone(),
            reason: format!("display text contains {:?}", bad),
        });
    }

    chars.clear();
    chars.extend(text.chars());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CandidateId, ChoiceRecord, MatchMode};

    fn store(names: &[&str]) -> CandidateStore<String> {
        CandidateStore::from_records(names.iter().map(|&n| n.into()).collect()).unwrap()
    }

    fn names(store: &CandidateStore<String>, list: &RankedList) -> Vec<String> {
        list.ids()
            .map(|id| store.get(id).unwrap().value.clone())
            .collect()
    }

    #[test]
    fn test_fuzzy_ranking_order() {
        let config = SearchConfig::default();
        let store = store(&["hello", "weather", "what", "whoa", "hey", "yo"]);
        let ranked = Ranker::new(&config).rank(&store, "wh");
        assert_eq!(names(&store, &ranked), vec!["what", "whoa", "weather"]);
    }

    #[test]
    fn test_exact_ranking_order() {
        let config = SearchConfig {
            match_mode: MatchMode::Exact,
            ..SearchConfig::default()
        };
        let store = store(&["hello", "weather", "what", "whoa", "hey", "yo"]);
        let ranked = Ranker::new(&config).rank(&store, "wh");
        assert_eq!(names(&store, &ranked), vec!["what", "whoa"]);
        assert!(ranked.results.iter().all(|r| r.exact));
    }

    #[test]
    fn test_empty_query_keeps_store_order() {
        let config = SearchConfig::default();
        let store = store(&["c", "b", "a"]);
        let ranked = Ranker::new(&config).rank(&store, "");
        assert_eq!(names(&store, &ranked), vec!["c", "b", "a"]);
        assert!(ranked
            .results
            .iter()
            .all(|r| r.score == config.weights.neutral && r.positions.is_empty()));
    }

    #[test]
    fn test_ties_break_by_insertion_not_text() {
        let config = SearchConfig::default();
        let store = store(&["zeta", "alpha", "beta"]);
        let ranked = Ranker::new(&config).rank(&store, "a");
        let scores: Vec<i64> = ranked.results.iter().map(|r| r.score).collect();
        let mut sorted = scores.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(scores, sorted);

        // "zeta" and "beta" score alike and stay in store order
        let names = names(&store, &ranked);
        let zeta = names.iter().position(|n| n == "zeta").unwrap();
        let beta = names.iter().position(|n| n == "beta").unwrap();
        assert!(zeta < beta);
    }

    #[test]
    fn test_malformed_candidates_are_skipped() {
        let config = SearchConfig::default();
        let store = CandidateStore::from_records(vec![
            ChoiceRecord::from("alpha"),
            ChoiceRecord::Raw {
                bytes: vec![b'a', 0xff, b'a'],
                value: "broken".to_string(),
            },
            ChoiceRecord::from("line\nbreak a"),
            ChoiceRecord::from("gamma"),
        ])
        .unwrap();

        let ranked = Ranker::new(&config).rank(&store, "a");
        let ids: Vec<_> = ranked.ids().cloned().collect();
        assert_eq!(ids, vec![CandidateId::Index(0), CandidateId::Index(3)]);
    }

    #[test]
    fn test_ranking_is_deterministic() {
        let config = SearchConfig::default();
        let store = store(&["src/main.rs", "src/lib.rs", "README.md", "Cargo.toml"]);
        let ranker = Ranker::new(&config);
        assert_eq!(ranker.rank(&store, "sr"), ranker.rank(&store, "sr"));
    }
}
