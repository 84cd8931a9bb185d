pub mod config;
pub mod controller;
pub mod debouncer;
pub mod error;
pub mod loader;
pub mod matcher;
pub mod ranker;
pub mod selection;
pub mod store;
pub mod types;

// 公開API
pub use config::{ScoreWeights, SearchConfig};
pub use controller::{Answer, SearchController, SearchEvent, SearchInfo, SearchState};
pub use error::{EngineError, EngineResult};
pub use loader::{CandidateLoader, CandidateSource, LoaderState, SessionAnswers};
pub use matcher::{ExactMatcher, FuzzyScorer, FuzzyScratch, Scorer};
pub use ranker::Ranker;
pub use selection::SelectionSet;
pub use store::CandidateStore;
pub use types::*;
