use crate::error::{Result, SearchError};
use crate::index::{SearchEntry, SearchIndex};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// What a debounced callback receives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fired {
    /// The query was blank; results should be cleared right away
    Cleared,
    /// The query survived the quiet period
    Query(String),
}

/// Collapses bursts of keystrokes into a single search.
///
/// Each `schedule` cancels the previous one. A callback only runs if no newer
/// `schedule` or `cancel` happened before it fired, and callbacks never run
/// concurrently with each other.
pub struct QueryDebouncer {
    runtime: Handle,
    pending: Option<JoinHandle<()>>,
    generation: Arc<AtomicU64>,
    gate: Arc<Mutex<()>>,
}

impl QueryDebouncer {
    /// Debouncer bound to the current tokio runtime.
    pub fn new() -> Result<Self> {
        let runtime = Handle::try_current().map_err(|_| SearchError::NoRuntime)?;
        Ok(Self::with_handle(runtime))
    }

    pub fn with_handle(runtime: Handle) -> Self {
        Self {
            runtime,
            pending: None,
            generation: Arc::new(AtomicU64::new(0)),
            gate: Arc::new(Mutex::new(())),
        }
    }

    /// Run `on_fire` once `delay` passes without another call.
    ///
    /// A blank query skips the wait and reports [`Fired::Cleared`] before
    /// returning.
    pub fn schedule<F>(&mut self, query: &str, delay: Duration, on_fire: F)
    where
        F: FnOnce(Fired) + Send + 'static,
    {
        self.cancel();

        let query = query.trim();
        if query.is_empty() {
            let _guard = self.gate.lock().unwrap_or_else(PoisonError::into_inner);
            on_fire(Fired::Cleared);
            return;
        }

        let ticket = self.generation.load(Ordering::SeqCst);
        let generation = Arc::clone(&self.generation);
        let gate = Arc::clone(&self.gate);
        let query = query.to_string();

        self.pending = Some(self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;

            let _guard = gate.lock().unwrap_or_else(PoisonError::into_inner);
            if generation.load(Ordering::SeqCst) != ticket {
                log::trace!("Dropping stale query {query:?}");
                return;
            }
            on_fire(Fired::Query(query));
        }));
    }

    /// Debounced search against `index`, waiting the index's configured delay.
    /// Blank queries deliver an empty result list immediately.
    pub fn schedule_search<F>(&mut self, index: &SearchIndex, query: &str, on_results: F)
    where
        F: FnOnce(Vec<SearchEntry>) + Send + 'static,
    {
        let index = index.clone();
        let delay = index.config().debounce();
        self.schedule(query, delay, move |fired| match fired {
            Fired::Cleared => on_results(Vec::new()),
            Fired::Query(query) => on_results(index.search(&query)),
        });
    }

    /// Drop whatever is waiting. A callback already running finishes.
    pub fn cancel(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(task) = self.pending.take() {
            task.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }
}

impl Drop for QueryDebouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
