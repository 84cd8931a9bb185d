use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identity of a candidate, independent of any ranked view.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CandidateId {
    /// Monotonic insertion index assigned by the store
    Index(usize),
    /// Explicit key supplied by the record
    Key(String),
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CandidateId::Index(index) => write!(f, "#{}", index),
            CandidateId::Key(key) => write!(f, "{}", key),
        }
    }
}

/// How a query token is matched against candidate text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Ordered, possibly scattered subsequence
    #[default]
    Fuzzy,
    /// Contiguous substring
    Exact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseMatching {
    #[default]
    Insensitive,
    Sensitive,
    /// Insensitive unless the token contains an uppercase character
    Smart,
}

impl CaseMatching {
    /// Resolve the policy for one query token.
    pub fn is_sensitive_for(&self, token: &str) -> bool {
        match self {
            CaseMatching::Insensitive => false,
            CaseMatching::Sensitive => true,
            CaseMatching::Smart => token.chars().any(char::is_uppercase),
        }
    }
}

/// A selectable item as supplied by a candidate source.
#[derive(Debug, Clone, PartialEq)]
pub struct Choice<T> {
    pub name: String,
    pub value: T,
    /// Initial selected state for multiselect sessions
    pub enabled: bool,
    pub key: Option<String>,
}

impl<T> Choice<T> {
    pub fn new(name: impl Into<String>, value: T) -> Self {
        Self {
            name: name.into(),
            value,
            enabled: false,
            key: None,
        }
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }
}

impl From<&str> for Choice<String> {
    fn from(name: &str) -> Self {
        Choice::new(name, name.to_string())
    }
}

impl From<String> for Choice<String> {
    fn from(name: String) -> Self {
        let value = name.clone();
        Choice::new(name, value)
    }
}

/// One record produced by a candidate source.
#[derive(Debug, Clone, PartialEq)]
pub enum ChoiceRecord<T> {
    Choice(Choice<T>),
    /// Display text that has not been decoded yet
    Raw { bytes: Vec<u8>, value: T },
    /// Visual divider; not accepted by a searchable list
    Separator(String),
}

impl<T> From<Choice<T>> for ChoiceRecord<T> {
    fn from(choice: Choice<T>) -> Self {
        ChoiceRecord::Choice(choice)
    }
}

impl From<&str> for ChoiceRecord<String> {
    fn from(name: &str) -> Self {
        ChoiceRecord::Choice(Choice::from(name))
    }
}

impl From<String> for ChoiceRecord<String> {
    fn from(name: String) -> Self {
        ChoiceRecord::Choice(Choice::from(name))
    }
}

/// Display text of a stored candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayText {
    Text(String),
    Undecoded(Vec<u8>),
}

/// An immutable entry of the candidate store.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate<T> {
    pub id: CandidateId,
    pub display: DisplayText,
    pub value: T,
    pub enabled: bool,
}

impl<T> Candidate<T> {
    /// Decoded display text, `None` when the record could not be decoded.
    pub fn text(&self) -> Option<&str> {
        match &self.display {
            DisplayText::Text(text) => Some(text),
            DisplayText::Undecoded(_) => None,
        }
    }

    /// Lossy rendering of the display text for logs and presentation.
    pub fn display_lossy(&self) -> String {
        match &self.display {
            DisplayText::Text(text) => text.clone(),
            DisplayText::Undecoded(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        }
    }
}

/// Score and highlight positions of one query against one text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub score: i64,
    /// Ascending char offsets into the text
    pub positions: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub candidate_id: CandidateId,
    /// Position of the candidate in store insertion order
    pub order: usize,
    pub score: i64,
    pub positions: Vec<usize>,
    /// Every query token was matched as a literal substring
    pub exact: bool,
}

/// Ranked output of one ranking pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RankedList {
    pub query: String,
    pub results: Vec<MatchResult>,
}

impl RankedList {
    pub fn empty(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            results: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&MatchResult> {
        self.results.get(index)
    }

    pub fn ids(&self) -> impl Iterator<Item = &CandidateId> {
        self.results.iter().map(|result| &result.candidate_id)
    }

    pub fn contains(&self, id: &CandidateId) -> bool {
        self.results.iter().any(|result| &result.candidate_id == id)
    }
}
