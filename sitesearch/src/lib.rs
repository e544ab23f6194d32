//! Site Search - core of the search widget on a personal site
//!
//! A visitor's keystrokes are debounced into searches that scan the rendered
//! page's text and query the site's `/api/search` endpoint concurrently. The
//! merged results are highlighted for display, and recent terms are remembered
//! across sessions.
//!
//! # Architecture
//! - `highlight`: case-insensitive literal match segmentation
//! - `indexer` / `html`: page text snapshots behind a content-source seam
//! - `history`: bounded recent-search list over a pluggable storage backend
//! - `debounce`: single-pending-timer delay gate
//! - `lookup`: remote endpoint client
//! - `orchestrator`: dual-source search with supersession and session state
//! - `widget`: input handling and the view state machine for the host UI

pub mod config;
pub mod debounce;
pub mod highlight;
pub mod history;
pub mod html;
pub mod indexer;
pub mod interface;
pub mod location;
pub mod lookup;
pub mod orchestrator;
pub mod widget;

pub use config::WidgetConfig;
pub use highlight::{highlight, HighlightSegment};
pub use interface::*;
pub use orchestrator::{SearchOrchestrator, SearchOutcome};
pub use widget::{ResultRow, ScrollBehavior, SearchWidget, Viewport, WidgetView};
