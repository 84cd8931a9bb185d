//! Query tokenization
//!
//! Queries are split on whitespace. Each token is matched independently in
//! the configured mode; a token starting with the exact prefix (default `'`)
//! is always matched as a literal substring.

use crate::config::SearchConfig;
use crate::types::MatchMode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryToken {
    pub chars: Vec<char>,
    pub mode: MatchMode,
    pub case_sensitive: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedQuery {
    tokens: Vec<QueryToken>,
}

impl ParsedQuery {
    pub fn parse(query: &str, config: &SearchConfig) -> Self {
        let tokens = query
            .split_whitespace()
            .map(|raw| {
                let (text, mode) = match config.exact_prefix {
                    Some(prefix) if raw.len() > prefix.len_utf8() && raw.starts_with(prefix) => {
                        (&raw[prefix.len_utf8()..], MatchMode::Exact)
                    }
                    _ => (raw, config.match_mode),
                };
                QueryToken {
                    chars: text.chars().collect(),
                    mode,
                    case_sensitive: config.case_matching.is_sensitive_for(text),
                }
            })
            .collect();
        Self { tokens }
    }

    pub fn tokens(&self) -> &[QueryToken] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
