//! Candidate source loading
//!
//! A [`CandidateLoader`] resolves a [`CandidateSource`] into the session's
//! [`CandidateStore`]. The lifecycle is
//! `Unloaded -> Loading -> Ready | Failed`; `Loading` is entered once per
//! cycle and only [`CandidateLoader::reload`] starts a new cycle. The store
//! is replaced in one step when the load completes, so consumers never see
//! a partial list.
//!
//! Asynchronous and deferred sources run as tokio tasks. The loader never
//! blocks: [`CandidateLoader::poll`] picks up a finished task, and
//! [`CandidateLoader::wait`] awaits it. Dropping the loader aborts the task.

use crate::error::EngineError;
use crate::store::CandidateStore;
use crate::types::ChoiceRecord;
use futures_util::future::{BoxFuture, FutureExt};
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Answers of the prompts that ran earlier in a multi-prompt session
pub type SessionAnswers = BTreeMap<String, serde_json::Value>;

pub type Records<T> = Vec<ChoiceRecord<T>>;

type SyncProducer<T> = Box<dyn Fn() -> anyhow::Result<Records<T>> + Send + Sync>;
type AsyncProducer<T> = Box<dyn Fn() -> BoxFuture<'static, anyhow::Result<Records<T>>> + Send + Sync>;
type DeferredProducer<T> =
    Box<dyn Fn(&SessionAnswers) -> BoxFuture<'static, anyhow::Result<Records<T>>> + Send + Sync>;

/// Where the candidates of a session come from
pub enum CandidateSource<T> {
    /// Pre-materialized list
    Static(Records<T>),
    /// Zero-argument producer, run in place
    Sync(SyncProducer<T>),
    /// Zero-argument asynchronous producer
    Async(AsyncProducer<T>),
    /// Asynchronous producer reading earlier answers
    Deferred(DeferredProducer<T>),
}

impl<T> CandidateSource<T> {
    pub fn from_static<I, R>(records: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<ChoiceRecord<T>>,
    {
        CandidateSource::Static(records.into_iter().map(Into::into).collect())
    }

    pub fn from_fn<F>(producer: F) -> Self
    where
        F: Fn() -> anyhow::Result<Records<T>> + Send + Sync + 'static,
    {
        CandidateSource::Sync(Box::new(producer))
    }

    pub fn from_async<F, Fut>(producer: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Records<T>>> + Send + 'static,
    {
        CandidateSource::Async(Box::new(move || producer().boxed()))
    }

    pub fn deferred<F, Fut>(producer: F) -> Self
    where
        F: Fn(&SessionAnswers) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Records<T>>> + Send + 'static,
    {
        CandidateSource::Deferred(Box::new(move |answers| producer(answers).boxed()))
    }

    fn kind(&self) -> &'static str {
        match self {
            CandidateSource::Static(_) => "static",
            CandidateSource::Sync(_) => "sync",
            CandidateSource::Async(_) => "async",
            CandidateSource::Deferred(_) => "deferred",
        }
    }
}

impl<T> fmt::Debug for CandidateSource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CandidateSource::Static(records) => f
                .debug_tuple("Static")
                .field(&format_args!("{} records", records.len()))
                .finish(),
            other => f.debug_tuple(other.kind()).field(&"<producer>").finish(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum LoaderState {
    Unloaded,
    Loading,
    Ready,
    Failed(Arc<EngineError>),
}

impl LoaderState {
    pub fn is_ready(&self) -> bool {
        matches!(self, LoaderState::Ready)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, LoaderState::Loading)
    }

    pub fn error(&self) -> Option<&Arc<EngineError>> {
        match self {
            LoaderState::Failed(err) => Some(err),
            _ => None,
        }
    }
}

impl PartialEq for LoaderState {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (LoaderState::Failed(a), LoaderState::Failed(b)) => Arc::ptr_eq(a, b),
            _ => std::mem::discriminant(self) == std::mem::discriminant(other),
        }
    }
}

pub struct CandidateLoader<T> {
    source: CandidateSource<T>,
    state: LoaderState,
    task: Option<JoinHandle<anyhow::Result<Records<T>>>>,
}

impl<T> fmt::Debug for CandidateLoader<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CandidateLoader")
            .field("source", &self.source)
            .field("state", &self.state)
            .field("in_flight", &self.task.is_some())
            .finish()
    }
}

impl<T: Clone + Send + 'static> CandidateLoader<T> {
    pub fn new(source: CandidateSource<T>) -> Self {
        Self {
            source,
            state: LoaderState::Unloaded,
            task: None,
        }
    }

    pub fn state(&self) -> &LoaderState {
        &self.state
    }

    /// Begin the load cycle. Does nothing unless the loader is `Unloaded`.
    ///
    /// Static and sync sources complete before this returns.
    pub fn start(&mut self, answers: &SessionAnswers, store: &mut CandidateStore<T>) -> LoaderState {
        if !matches!(self.state, LoaderState::Unloaded) {
            log::debug!("Load already started ({:?}), ignoring", self.state);
            return self.state.clone();
        }

        log::debug!("Loading candidates from {} source", self.source.kind());
        self.state = LoaderState::Loading;

        let future = match &self.source {
            CandidateSource::Static(records) => {
                let records = records.clone();
                return self.finish(Ok(records), store);
            }
            CandidateSource::Sync(producer) => {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| producer()));
                return match outcome {
                    Ok(result) => self.finish(result, store),
                    Err(payload) => {
                        store.clear();
                        self.fail(producer_panicked(payload.as_ref()))
                    }
                };
            }
            CandidateSource::Async(producer) => producer(),
            CandidateSource::Deferred(producer) => producer(answers),
        };

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                self.task = Some(handle.spawn(future));
                self.state.clone()
            }
            Err(_) => {
                store.clear();
                self.fail(EngineError::InvalidCandidateSource(
                    "asynchronous candidate source needs a tokio runtime".to_string(),
                ))
            }
        }
    }

    /// Pick up a finished load without blocking.
    pub fn poll(&mut self, store: &mut CandidateStore<T>) -> LoaderState {
        let Some(mut task) = self.task.take() else {
            return self.state.clone();
        };
        if !task.is_finished() {
            self.task = Some(task);
            return self.state.clone();
        }
        match (&mut task).now_or_never() {
            Some(joined) => self.complete(joined, store),
            None => {
                self.task = Some(task);
                self.state.clone()
            }
        }
    }

    /// Wait for the in-flight load, if any.
    pub async fn wait(&mut self, store: &mut CandidateStore<T>) -> LoaderState {
        match self.task.take() {
            Some(task) => {
                let joined = task.await;
                self.complete(joined, store)
            }
            None => self.state.clone(),
        }
    }

    /// Abandon the in-flight load. The loader returns to `Unloaded`.
    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            log::debug!("Cancelling in-flight candidate load");
            task.abort();
        }
        if self.state.is_loading() {
            self.state = LoaderState::Unloaded;
        }
    }

    /// Start a new load cycle, discarding the current candidates.
    pub fn reload(&mut self, answers: &SessionAnswers, store: &mut CandidateStore<T>) -> LoaderState {
        log::debug!("Reloading candidates");
        self.cancel();
        store.clear();
        self.state = LoaderState::Unloaded;
        self.start(answers, store)
    }

    fn complete(
        &mut self,
        joined: Result<anyhow::Result<Records<T>>, tokio::task::JoinError>,
        store: &mut CandidateStore<T>,
    ) -> LoaderState {
        match joined {
            Ok(result) => self.finish(result, store),
            Err(join_error) => {
                store.clear();
                match join_error.try_into_panic() {
                    Ok(payload) => self.fail(producer_panicked(payload.as_ref())),
                    Err(join_error) => self.fail(EngineError::load_failure(join_error)),
                }
            }
        }
    }

    fn finish(&mut self, result: anyhow::Result<Records<T>>, store: &mut CandidateStore<T>) -> LoaderState {
        store.clear();
        match result {
            Ok(records) => match store.append(records) {
                Ok(count) => {
                    log::debug!("Candidate load complete: {} candidates", count);
                    self.state = LoaderState::Ready;
                    self.state.clone()
                }
                Err(err) => self.fail(err),
            },
            Err(err) => self.fail(EngineError::load_failure(err)),
        }
    }

    fn fail(&mut self, error: EngineError) -> LoaderState {
        log::warn!("Candidate load failed: {}", error);
        self.state = LoaderState::Failed(Arc::new(error));
        self.state.clone()
    }
}

/// A producer that panics is treated like one that could not be invoked.
fn producer_panicked(payload: &(dyn Any + Send)) -> EngineError {
    let message = payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload");
    EngineError::InvalidCandidateSource(format!("candidate producer panicked: {}", message))
}

impl<T> Drop for CandidateLoader<T> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
