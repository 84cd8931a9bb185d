use crate::types::CandidateId;

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Engine error types
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Invalid candidate source: {0}")]
    InvalidCandidateSource(String),

    #[error("Candidate load failed: {source}")]
    CandidateLoadFailure {
        #[source]
        source: anyhow::Error,
    },

    /// Only ever logged; the candidate is dropped from ranking.
    #[error("Malformed candidate text for {id}: {reason}")]
    MalformedCandidateText { id: CandidateId, reason: String },

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    pub fn load_failure(source: impl Into<anyhow::Error>) -> Self {
        EngineError::CandidateLoadFailure {
            source: source.into(),
        }
    }
}
