//! Incremental search controller
//!
//! Owns one search session: the query, the candidate store and its loader,
//! the latest ranked list, the selection and the highlighted cursor. Every
//! query edit re-ranks the whole store in the same call (or after the
//! debounce delay, when enabled) and pushes the fresh list to subscribers.
//! While the loader is not `Ready` the ranked list stays empty and edits
//! are only recorded.

use crate::config::SearchConfig;
use crate::debouncer::Debouncer;
use crate::loader::{CandidateLoader, CandidateSource, LoaderState, SessionAnswers};
use crate::ranker::Ranker;
use crate::selection::{Cursor, SelectionSet};
use crate::store::CandidateStore;
use crate::types::{Candidate, CandidateId, CaseMatching, MatchMode, RankedList};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    Idle,
    Searching,
}

/// Notifications for the presentation layer
#[derive(Debug, Clone)]
pub enum SearchEvent {
    Results(Arc<RankedList>),
    Loader(LoaderState),
}

/// Counts shown next to the query input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchInfo {
    pub matched: usize,
    pub total: usize,
    pub selected: usize,
}

/// Final result of a session
#[derive(Debug, Clone, PartialEq)]
pub enum Answer<T> {
    Single(Option<T>),
    Multiple(Vec<T>),
}

pub struct SearchController<T> {
    config: SearchConfig,
    answers: SessionAnswers,
    store: CandidateStore<T>,
    loader: Option<CandidateLoader<T>>,
    loader_state: LoaderState,
    query: String,
    state: SearchState,
    ranked: Arc<RankedList>,
    selection: SelectionSet,
    cursor: Cursor,
    debouncer: Option<Debouncer>,
    subscribers: Vec<mpsc::UnboundedSender<SearchEvent>>,
}

impl<T> std::fmt::Debug for SearchController<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchController")
            .field("query", &self.query)
            .field("state", &self.state)
            .field("loader_state", &self.loader_state)
            .field("candidates", &self.store.len())
            .field("matched", &self.ranked.len())
            .finish()
    }
}

impl<T: Clone + Send + 'static> SearchController<T> {
    pub fn new(config: SearchConfig) -> Self {
        let query = config.default_query.clone();
        Self {
            config,
            answers: SessionAnswers::new(),
            store: CandidateStore::new(),
            loader: None,
            loader_state: LoaderState::Unloaded,
            ranked: Arc::new(RankedList::empty(query.clone())),
            query,
            state: SearchState::Idle,
            selection: SelectionSet::new(),
            cursor: Cursor::default(),
            debouncer: None,
            subscribers: Vec::new(),
        }
    }

    /// Answers from earlier prompts, visible to deferred sources.
    pub fn with_answers(mut self, answers: SessionAnswers) -> Self {
        self.answers = answers;
        self
    }

    pub fn set_answers(&mut self, answers: SessionAnswers) {
        self.answers = answers;
    }

    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<SearchEvent> {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.subscribers.push(sender);
        receiver
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn store(&self) -> &CandidateStore<T> {
        &self.store
    }

    // ---- candidates ----

    /// Replace the candidate source and start loading it.
    ///
    /// Any load in flight is abandoned and the selection is reset.
    pub fn set_candidates(&mut self, source: CandidateSource<T>) -> LoaderState {
        if let Some(mut previous) = self.loader.take() {
            previous.cancel();
        }
        self.store.clear();
        self.selection.clear();
        self.cursor.reset();
        self.loader_state = LoaderState::Unloaded;

        let mut loader = CandidateLoader::new(source);
        let state = loader.start(&self.answers, &mut self.store);
        self.loader = Some(loader);
        self.observe(state)
    }

    /// Start a new load cycle of the current source, e.g. after an
    /// upstream answer changed.
    ///
    /// The new cycle hands out fresh identities, so the selection is reset
    /// and re-seeded from `enabled` once it is ready.
    pub fn reload(&mut self) -> LoaderState {
        let state = match self.loader.as_mut() {
            Some(loader) => loader.reload(&self.answers, &mut self.store),
            None => return self.loader_state.clone(),
        };
        self.selection.clear();
        self.cursor.reset();
        // A new cycle is reported even when it ends in the previous state
        self.loader_state = LoaderState::Unloaded;
        self.observe(state)
    }

    /// Pick up a finished load and fire a debounced ranking pass if due.
    pub fn poll(&mut self) -> LoaderState {
        if let Some(loader) = self.loader.as_mut() {
            let state = loader.poll(&mut self.store);
            self.observe(state);
        }

        let due = self
            .debouncer
            .as_mut()
            .and_then(|debouncer| debouncer.take_ready())
            .is_some();
        if due && self.loader_state.is_ready() {
            self.rerank();
        }
        self.loader_state.clone()
    }

    /// Wait for the in-flight load, if any.
    pub async fn wait_until_loaded(&mut self) -> LoaderState {
        if let Some(loader) = self.loader.as_mut() {
            let state = loader.wait(&mut self.store).await;
            self.observe(state);
        }
        self.loader_state.clone()
    }

    /// Tear down the session's load. Other sessions are unaffected.
    pub fn abort(&mut self) {
        if let Some(loader) = self.loader.as_mut() {
            loader.cancel();
            let state = loader.state().clone();
            self.observe(state);
        }
    }

    pub fn loader_state(&self) -> LoaderState {
        self.loader_state.clone()
    }

    fn observe(&mut self, state: LoaderState) -> LoaderState {
        if state == self.loader_state {
            return state;
        }
        log::debug!("Loader state: {:?} -> {:?}", self.loader_state, state);
        self.loader_state = state.clone();
        self.publish(SearchEvent::Loader(state.clone()));

        if state.is_ready() {
            self.selection.seed_enabled(&self.store);
            self.debouncer = self
                .config
                .debounce
                .then(|| Debouncer::for_candidates(self.store.len()));
            self.rerank();
        } else {
            self.ranked = Arc::new(RankedList::empty(self.query.clone()));
            self.cursor.reset();
            self.publish(SearchEvent::Results(self.ranked.clone()));
        }
        state
    }

    // ---- query ----

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn update_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.query_changed();
    }

    pub fn insert_char(&mut self, c: char) {
        self.query.push(c);
        self.query_changed();
    }

    /// Remove the last character; no-op on an empty query.
    pub fn delete_char(&mut self) {
        if self.query.pop().is_some() {
            self.query_changed();
        }
    }

    pub fn set_match_mode(&mut self, mode: MatchMode) {
        if self.config.match_mode != mode {
            self.config.match_mode = mode;
            self.query_changed();
        }
    }

    pub fn set_case_matching(&mut self, case_matching: CaseMatching) {
        if self.config.case_matching != case_matching {
            self.config.case_matching = case_matching;
            self.query_changed();
        }
    }

    fn query_changed(&mut self) {
        if !self.loader_state.is_ready() {
            log::trace!("Query {:?} recorded, ranking deferred until loaded", self.query);
            return;
        }
        match self.debouncer.as_mut() {
            Some(debouncer) if !debouncer.delay.is_zero() => {
                debouncer.set_pending(self.query.clone());
            }
            _ => self.rerank(),
        }
    }

    /// Time left until `poll` runs the pending debounced ranking pass.
    pub fn time_until_ready(&self) -> Option<Duration> {
        self.debouncer
            .as_ref()
            .filter(|debouncer| debouncer.has_pending())
            .and_then(Debouncer::time_until_ready)
    }

    fn rerank(&mut self) {
        self.state = SearchState::Searching;
        let ranked = Ranker::new(&self.config).rank(&self.store, &self.query);
        self.ranked = Arc::new(ranked);
        self.cursor.clamp(self.ranked.len());
        self.state = SearchState::Idle;
        self.publish(SearchEvent::Results(self.ranked.clone()));
    }

    pub fn search_state(&self) -> SearchState {
        self.state
    }

    pub fn current_ranked_list(&self) -> Arc<RankedList> {
        self.ranked.clone()
    }

    fn publish(&mut self, event: SearchEvent) {
        self.subscribers
            .retain(|subscriber| subscriber.send(event.clone()).is_ok());
    }

    // ---- selection ----

    /// Toggle a visible candidate. Candidates filtered out by the query are
    /// left alone; returns whether the toggle applied.
    pub fn toggle(&mut self, id: &CandidateId) -> bool {
        if !self.ranked.contains(id) {
            log::trace!("Ignoring toggle of hidden candidate {}", id);
            return false;
        }
        self.selection.toggle(id);
        true
    }

    pub fn toggle_highlighted(&mut self) -> bool {
        match self.ranked.get(self.cursor.index()) {
            Some(result) => {
                let id = result.candidate_id.clone();
                self.toggle(&id)
            }
            None => false,
        }
    }

    /// Select or deselect every candidate of the current ranked list.
    pub fn set_all(&mut self, selected: bool) {
        self.selection.set_all(&self.ranked, Some(selected));
    }

    /// Invert every candidate of the current ranked list.
    pub fn invert_all(&mut self) {
        self.selection.set_all(&self.ranked, None);
    }

    pub fn is_selected(&self, id: &CandidateId) -> bool {
        self.selection.is_selected(id)
    }

    pub fn selected_ids(&self) -> HashSet<CandidateId> {
        self.selection.selected()
    }

    /// Backing values of selected candidates, in store order.
    pub fn selected(&self) -> Vec<T> {
        self.store
            .iter()
            .filter(|candidate| self.selection.is_selected(&candidate.id))
            .map(|candidate| candidate.value.clone())
            .collect()
    }

    // ---- cursor ----

    pub fn move_cursor(&mut self, delta: isize) {
        self.cursor
            .move_by(delta, self.ranked.len(), self.config.cycle);
    }

    pub fn cursor(&self) -> usize {
        self.cursor.index()
    }

    pub fn highlighted(&self) -> Option<&Candidate<T>> {
        self.ranked
            .get(self.cursor.index())
            .and_then(|result| self.store.get(&result.candidate_id))
    }

    pub fn info(&self) -> SearchInfo {
        SearchInfo {
            matched: self.ranked.len(),
            total: self.store.len(),
            selected: self.selection.count(),
        }
    }

    /// Result of the session as submitted now.
    ///
    /// Multiselect sessions without any selection answer with the
    /// highlighted candidate alone.
    pub fn answer(&self) -> Answer<T> {
        let highlighted = self.highlighted().map(|candidate| candidate.value.clone());
        if !self.config.multiselect {
            return Answer::Single(highlighted);
        }
        let selected = self.selected();
        if selected.is_empty() {
            Answer::Multiple(highlighted.into_iter().collect())
        } else {
            Answer::Multiple(selected)
        }
    }
}
