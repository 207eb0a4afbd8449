//! UI-facing search coordinator: holds the current query outcome and
//! guards against out-of-order completion when searches overlap.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use tracing::debug;

use crate::models::{EventRecord, SearchQuery};
use crate::source::{EventProvider, SourceError};

/// Read model exposed to the presentation layer. An empty `Success` list
/// is a valid, displayable state distinct from `Error`.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchState {
    Idle,
    Loading,
    Success(Vec<EventRecord>),
    Error(String),
}

pub struct SearchSession<P> {
    provider: P,
    // Bumped on every search; a completion only lands if it still holds
    // the generation it started with, so a stale response never
    // overwrites a newer query's result.
    generation: AtomicU64,
    state: Mutex<SearchState>,
}

impl<P: EventProvider> SearchSession<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            generation: AtomicU64::new(0),
            state: Mutex::new(SearchState::Idle),
        }
    }

    pub fn state(&self) -> SearchState {
        self.state.lock().expect("search state poisoned").clone()
    }

    /// Current result list; empty outside of `Success`.
    pub fn events(&self) -> Vec<EventRecord> {
        match self.state() {
            SearchState::Success(events) => events,
            _ => Vec::new(),
        }
    }

    pub async fn search(&self, query: SearchQuery) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        *self.state.lock().expect("search state poisoned") = SearchState::Loading;

        let outcome = self.provider.search(&query).await;

        let mut state = self.state.lock().expect("search state poisoned");
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(generation, "search superseded, dropping stale result");
            return;
        }
        *state = match outcome {
            Ok(events) => SearchState::Success(events),
            Err(err) => SearchState::Error(err.to_string()),
        };
    }

    /// Detail lookup; does not disturb the search result state.
    pub async fn lookup(&self, id: &str) -> Result<Option<EventRecord>, SourceError> {
        self.provider.get_by_id(id).await
    }
}
