//! Site Search Interface Definition
//!
//! Shared types handed to the host UI: results, page fragments, history
//! entries, the session snapshot, and the crate error.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ═══════════════════════════════════════════════════════════════════════════════
// ENUMS
// ═══════════════════════════════════════════════════════════════════════════════

/// Where a result came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    PageContent,
    Remote,
}

/// Search session lifecycle
///
/// `Idle → Searching → {Success, Failed}`, back to `Idle` when the query is cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    #[default]
    Idle,
    Searching,
    Success,
    Failed,
}

// ═══════════════════════════════════════════════════════════════════════════════
// RECORDS (Structs)
// ═══════════════════════════════════════════════════════════════════════════════

/// A single row in the merged result list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// Unique within one result set. For page content this is the anchor to scroll to.
    pub id: String,
    pub title: String,
    pub description: String,
    pub source_kind: SourceKind,
}

/// A unit of on-page text eligible for local substring matching
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageFragment {
    /// Anchor of the originating element (existing or generated)
    pub id: String,
    pub text: String,
    /// Originating element tag (`h1`, `p`, ...)
    pub kind: String,
}

/// A remembered search term
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub term: String,
    /// Serialized as ISO-8601 / RFC 3339
    pub timestamp: DateTime<Utc>,
}

/// Snapshot of the widget's single search session
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchSessionState {
    pub query: String,
    /// Trimmed term the current `results` were produced for
    pub results_term: String,
    pub is_open: bool,
    pub is_loading: bool,
    pub error: Option<String>,
    pub results: Vec<SearchResult>,
    pub phase: SessionPhase,
}

// ═══════════════════════════════════════════════════════════════════════════════
// ERROR TYPE
// ═══════════════════════════════════════════════════════════════════════════════

/// Error type for site search operations that surface to the host
#[derive(Debug, Error)]
pub enum SiteSearchError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Lookup error: {0}")]
    Lookup(String),
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

impl From<crate::lookup::LookupError> for SiteSearchError {
    fn from(e: crate::lookup::LookupError) -> Self {
        SiteSearchError::Lookup(e.to_string())
    }
}

impl From<toml::de::Error> for SiteSearchError {
    fn from(e: toml::de::Error) -> Self {
        SiteSearchError::Config(e.to_string())
    }
}

impl From<url::ParseError> for SiteSearchError {
    fn from(e: url::ParseError) -> Self {
        SiteSearchError::InvalidEndpoint(e.to_string())
    }
}
