//! Search widget shell
//!
//! Ties input events to the orchestrator through the debouncer and turns the
//! session snapshot into exactly one renderable view. Rendering itself belongs
//! to the host.

use crate::config::WidgetConfig;
use crate::debounce::{Debouncer, SEARCH_DEBOUNCE};
use crate::highlight::{highlight, HighlightSegment};
use crate::history::{FileStorage, HistoryStore, Storage};
use crate::indexer::{ContentSource, IdGenerator, PageIndexer, RandomIds};
use crate::interface::{HistoryEntry, SearchResult, SearchSessionState, SiteSearchError, SourceKind};
use crate::location::{location_with_query, query_from_location};
use crate::lookup::{HttpLookup, RemoteLookup};
use crate::orchestrator::SearchOrchestrator;
use std::sync::Arc;
use tracing::debug;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    Smooth,
    Instant,
}

/// Host capability to bring an anchored element into view
pub trait Viewport {
    fn scroll_into_view(&mut self, anchor: &str, behavior: ScrollBehavior);
}

/// A result row with highlight segments for its title and description
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRow {
    pub result: SearchResult,
    pub title: Vec<HighlightSegment>,
    pub description: Vec<HighlightSegment>,
}

/// What the popover shows; exactly one at a time
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetView {
    Closed,
    Error(String),
    Loading,
    /// Empty query and no history
    Prompt,
    /// Empty query with remembered terms
    History(Vec<HistoryEntry>),
    /// Searched, nothing matched
    NoResults,
    Results(Vec<ResultRow>),
}

/// One search widget instance
pub struct SearchWidget {
    orchestrator: Arc<SearchOrchestrator>,
    /// Scheduled input value with the input revision it was typed at
    debouncer: Debouncer<(String, u64)>,
    indexer: PageIndexer,
    placeholder: String,
}

impl SearchWidget {
    pub fn new(
        lookup: Arc<dyn RemoteLookup>,
        storage: Arc<dyn Storage>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        let orchestrator = Arc::new(SearchOrchestrator::new(lookup, HistoryStore::new(storage)));
        Self::with_orchestrator(orchestrator, PageIndexer::new(ids))
    }

    /// HTTP lookup and file-backed history as described by `config`
    pub fn from_config(config: &WidgetConfig) -> Result<Self, SiteSearchError> {
        let lookup = HttpLookup::new(config.endpoint()?, config.lookup_timeout())?;
        let storage = FileStorage::new(config.storage_dir());
        let orchestrator = Arc::new(SearchOrchestrator::with_timeout(
            Arc::new(lookup),
            HistoryStore::new(Arc::new(storage)),
            config.lookup_timeout(),
        ));
        let mut widget = Self::with_orchestrator(orchestrator, PageIndexer::new(Arc::new(RandomIds)));
        widget.placeholder = config.placeholder.clone();
        Ok(widget)
    }

    pub fn with_orchestrator(orchestrator: Arc<SearchOrchestrator>, indexer: PageIndexer) -> Self {
        let target = Arc::clone(&orchestrator);
        let debouncer = Debouncer::new(SEARCH_DEBOUNCE, move |(query, revision): (String, u64)| {
            let target = Arc::clone(&target);
            async move {
                target.search_for_input(&query, revision).await;
            }
        });
        Self {
            orchestrator,
            debouncer,
            indexer,
            placeholder: WidgetConfig::default().placeholder,
        }
    }

    pub fn orchestrator(&self) -> &Arc<SearchOrchestrator> {
        &self.orchestrator
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    pub fn state(&self) -> SearchSessionState {
        self.orchestrator.state()
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────────────

    /// Mount: snapshot the page text and load remembered terms.
    pub fn activate(&self, page: &mut dyn ContentSource) {
        let fragments = self.indexer.index_visible_text(page);
        self.orchestrator.set_fragments(fragments);
        let history = self.orchestrator.load_history();
        debug!(history = history.len(), "search widget activated");
    }

    /// Mount and restore the input from the location's `?query=`, scheduling a search.
    pub fn activate_at(&self, page: &mut dyn ContentSource, location: &Url) {
        self.activate(page);
        if let Some(term) = query_from_location(location) {
            self.on_input(&term);
        }
    }

    /// Re-scan the page; the previous snapshot is replaced
    pub fn reindex(&self, page: &mut dyn ContentSource) {
        self.orchestrator.set_fragments(self.indexer.index_visible_text(page));
    }

    pub fn open(&self) {
        self.orchestrator.set_open(true);
    }

    pub fn close(&self) {
        self.orchestrator.set_open(false);
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Input
    // ─────────────────────────────────────────────────────────────────────────────

    /// Input changed. Non-empty values search after the debounce delay; an
    /// empty value clears at once, skipping the delay.
    ///
    /// A timer that already fired for an older value cannot apply its results:
    /// the new value's revision invalidates it.
    pub fn on_input(&self, value: &str) {
        let revision = self.orchestrator.set_query(value);
        if value.trim().is_empty() {
            self.debouncer.cancel_pending();
            self.orchestrator.clear();
        } else {
            self.debouncer.trigger((value.to_string(), revision));
        }
    }

    /// Run a pending debounced search now
    pub async fn flush(&self) -> bool {
        self.debouncer.flush().await
    }

    /// Location reflecting the current input
    pub fn location_for(&self, current: &Url) -> Url {
        location_with_query(current, &self.orchestrator.state().query)
    }

    /// Pick a result: the input takes its title; page content is scrolled to and
    /// the popover closes.
    pub fn select(&self, result: &SearchResult, viewport: &mut dyn Viewport) {
        self.orchestrator.set_query(&result.title);
        if result.source_kind == SourceKind::PageContent {
            viewport.scroll_into_view(&result.id, ScrollBehavior::Smooth);
            self.close();
        }
    }

    /// Pick a remembered term; searches like typed input
    pub fn select_history(&self, term: &str) {
        self.on_input(term);
    }

    pub fn clear_history(&self) {
        self.orchestrator.clear_history();
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // View
    // ─────────────────────────────────────────────────────────────────────────────

    pub fn view(&self) -> WidgetView {
        let state = self.orchestrator.state();
        if !state.is_open {
            return WidgetView::Closed;
        }
        if let Some(error) = state.error {
            return WidgetView::Error(error);
        }
        if state.is_loading {
            return WidgetView::Loading;
        }

        if state.query.trim().is_empty() {
            let history = self.orchestrator.history();
            return if history.is_empty() {
                WidgetView::Prompt
            } else {
                WidgetView::History(history)
            };
        }
        if state.results.is_empty() {
            return WidgetView::NoResults;
        }

        // Rows are marked with the term that produced them, not the live input
        let term = state.results_term;
        let rows = state
            .results
            .into_iter()
            .map(|result| ResultRow {
                title: highlight(&result.title, &term),
                description: highlight(&result.description, &term),
                result,
            })
            .collect();
        WidgetView::Results(rows)
    }
}
