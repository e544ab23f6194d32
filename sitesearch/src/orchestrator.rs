//! Search Orchestrator
//!
//! Runs the in-page text match and the remote lookup for a query, merges the
//! two (page content first, remote second, each in its own order), records
//! history, and owns the session state.
//!
//! Supersession:
//! Every search start and every clear bumps a generation counter while holding
//! the state lock. A completed lookup commits only if its generation is still
//! current, checked under the same lock, so a late response for an older query
//! can never overwrite newer state. Starting a search also cancels the previous
//! lookup's token so that future stops waiting on the network.
//!
//! Input revisions:
//! `set_query` bumps an input revision under the state lock. A debounced
//! search started with `search_for_input` only begins if the revision it was
//! scheduled for is still current, so a timer that fired just as the input was
//! cleared can never resurrect results for the erased term.

use crate::highlight::contains_ignore_case;
use crate::history::HistoryStore;
use crate::interface::{
    HistoryEntry, PageFragment, SearchResult, SearchSessionState, SessionPhase, SourceKind,
};
use crate::lookup::{LookupError, RemoteLookup, RemoteMatch, DEFAULT_LOOKUP_TIMEOUT};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Chars of fragment text kept in a page-content description
const DESCRIPTION_CHARS: usize = 100;

/// Prefix namespacing remote ids inside one result set
const REMOTE_ID_PREFIX: &str = "api-";

/// RAII guard that cancels a token when dropped.
/// Dropping a search future mid-lookup cancels its lookup.
struct DropGuard {
    token: CancellationToken,
}

impl DropGuard {
    fn new(token: CancellationToken) -> Self {
        Self { token }
    }
}

impl Drop for DropGuard {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// What happened to a search request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Results (or the failure) were committed to the session
    Applied,
    /// A newer query or a clear arrived first; nothing was committed
    Superseded,
    /// The query was empty; the session was cleared
    Cleared,
}

impl SearchResult {
    /// Page-content result for a matched fragment
    pub fn from_fragment(fragment: &PageFragment) -> Self {
        let excerpt: String = fragment.text.chars().take(DESCRIPTION_CHARS).collect();
        Self {
            id: fragment.id.clone(),
            title: format!("Found in {}", fragment.kind),
            description: format!("{excerpt}..."),
            source_kind: SourceKind::PageContent,
        }
    }

    /// Remote result; always labeled `Remote` whatever the server reported
    pub fn from_remote(m: RemoteMatch) -> Self {
        Self {
            id: format!("{REMOTE_ID_PREFIX}{}", m.id),
            title: m.title,
            description: m.description,
            source_kind: SourceKind::Remote,
        }
    }
}

/// Filter the fragment snapshot by case-insensitive substring match
pub fn match_fragments(fragments: &[PageFragment], term: &str) -> Vec<SearchResult> {
    fragments
        .iter()
        .filter(|f| contains_ignore_case(&f.text, term))
        .map(SearchResult::from_fragment)
        .collect()
}

/// Owns one widget's search session
pub struct SearchOrchestrator {
    lookup: Arc<dyn RemoteLookup>,
    history: Mutex<HistoryStore>,
    fragments: RwLock<Arc<Vec<PageFragment>>>,
    state: RwLock<SearchSessionState>,
    /// Guarded by `state`'s write lock for both bump and compare
    generation: Mutex<u64>,
    /// Guarded by `state`'s write lock, like `generation`
    input_revision: Mutex<u64>,
    in_flight: Mutex<Option<CancellationToken>>,
    lookup_timeout: Duration,
}

impl SearchOrchestrator {
    pub fn new(lookup: Arc<dyn RemoteLookup>, history: HistoryStore) -> Self {
        Self::with_timeout(lookup, history, DEFAULT_LOOKUP_TIMEOUT)
    }

    pub fn with_timeout(
        lookup: Arc<dyn RemoteLookup>,
        history: HistoryStore,
        lookup_timeout: Duration,
    ) -> Self {
        Self {
            lookup,
            history: Mutex::new(history),
            fragments: RwLock::new(Arc::new(Vec::new())),
            state: RwLock::new(SearchSessionState::default()),
            generation: Mutex::new(0),
            input_revision: Mutex::new(0),
            in_flight: Mutex::new(None),
            lookup_timeout,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Read Operations
    // ─────────────────────────────────────────────────────────────────────────────

    /// Snapshot of the session
    pub fn state(&self) -> SearchSessionState {
        self.state.read().clone()
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.read().phase
    }

    pub fn history(&self) -> Vec<HistoryEntry> {
        self.history.lock().entries().to_vec()
    }

    pub fn fragments(&self) -> Arc<Vec<PageFragment>> {
        Arc::clone(&self.fragments.read())
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Session Operations
    // ─────────────────────────────────────────────────────────────────────────────

    /// Replace the page snapshot used by subsequent searches
    pub fn set_fragments(&self, fragments: Vec<PageFragment>) {
        *self.fragments.write() = Arc::new(fragments);
    }

    /// Read persisted history into the session
    pub fn load_history(&self) -> Vec<HistoryEntry> {
        self.history.lock().load()
    }

    pub fn clear_history(&self) {
        self.history.lock().clear();
    }

    /// Mirror the raw input value; does not search. Returns the new input revision.
    pub fn set_query(&self, query: &str) -> u64 {
        let mut state = self.state.write();
        let mut revision = self.input_revision.lock();
        *revision += 1;
        state.query = query.to_string();
        *revision
    }

    pub fn set_open(&self, open: bool) {
        self.state.write().is_open = open;
    }

    /// Return to `Idle`: drop results and error, invalidate any in-flight lookup.
    pub fn clear(&self) {
        let mut state = self.state.write();
        *self.generation.lock() += 1;
        self.cancel_in_flight();
        state.results.clear();
        state.results_term.clear();
        state.error = None;
        state.is_loading = false;
        state.phase = SessionPhase::Idle;
        debug!("search session cleared");
    }

    /// Search `query` across page content and the remote endpoint.
    ///
    /// Never fails: lookup errors become `Failed` session state.
    pub async fn search(&self, query: &str) -> SearchOutcome {
        self.run(query, None).await
    }

    /// Search for input made at `revision` (from [`set_query`](Self::set_query)).
    /// Superseded without touching the session if the input has changed since.
    pub async fn search_for_input(&self, query: &str, revision: u64) -> SearchOutcome {
        self.run(query, Some(revision)).await
    }

    async fn run(&self, query: &str, revision: Option<u64>) -> SearchOutcome {
        let term = query.trim();
        if term.is_empty() {
            self.clear();
            return SearchOutcome::Cleared;
        }

        let token = CancellationToken::new();
        let _guard = DropGuard::new(token.clone());

        let generation = {
            let mut state = self.state.write();
            if let Some(revision) = revision {
                if *self.input_revision.lock() != revision {
                    debug!(term, revision, "input changed before search started");
                    return SearchOutcome::Superseded;
                }
            }
            let mut generation = self.generation.lock();
            *generation += 1;
            if let Some(previous) = self.in_flight.lock().replace(token.clone()) {
                previous.cancel();
            }
            state.is_loading = true;
            state.error = None;
            state.phase = SessionPhase::Searching;
            *generation
        };
        debug!(term, generation, "search started");

        // Synchronous; runs against the snapshot current at search start
        let page_results = match_fragments(&self.fragments(), term);

        let remote = tokio::select! {
            _ = token.cancelled() => {
                debug!(term, generation, "lookup cancelled");
                return SearchOutcome::Superseded;
            }
            r = tokio::time::timeout(self.lookup_timeout, self.lookup.lookup(term)) => {
                r.unwrap_or(Err(LookupError::TimedOut(self.lookup_timeout)))
            }
        };

        self.commit(generation, term, page_results, remote)
    }

    fn commit(
        &self,
        generation: u64,
        term: &str,
        page_results: Vec<SearchResult>,
        remote: Result<Vec<RemoteMatch>, LookupError>,
    ) -> SearchOutcome {
        let mut state = self.state.write();
        if *self.generation.lock() != generation {
            debug!(term, generation, "discarding superseded lookup");
            return SearchOutcome::Superseded;
        }

        state.is_loading = false;
        match remote {
            Ok(matches) => {
                let mut results = page_results;
                results.extend(matches.into_iter().map(SearchResult::from_remote));
                info!(term, results = results.len(), "search completed");
                self.history.lock().record(term);
                state.results = results;
                state.results_term = term.to_string();
                state.error = None;
                state.phase = SessionPhase::Success;
            }
            Err(e) => {
                warn!(term, error = %e, "search failed");
                state.results.clear();
                state.results_term.clear();
                state.error = Some(e.user_message());
                state.phase = SessionPhase::Failed;
            }
        }
        SearchOutcome::Applied
    }

    fn cancel_in_flight(&self) {
        if let Some(token) = self.in_flight.lock().take() {
            token.cancel();
        }
    }
}
