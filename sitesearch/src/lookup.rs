//! Remote lookup - queries the site's `/api/search` endpoint

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Default upper bound for one lookup
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

/// Query parameter carrying the search term
const QUERY_PARAM: &str = "q";

/// One match as reported by the endpoint.
///
/// `kind` is whatever the server claims (`page-content` / `api`); it is kept for
/// diagnostics only and never used to classify results.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteMatch {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

#[derive(Error, Debug)]
pub enum LookupError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Unexpected status: {0}")]
    Status(u16),
    #[error("Malformed response: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("Lookup timed out after {0:?}")]
    TimedOut(Duration),
}

impl LookupError {
    /// Message suitable for the inline alert
    pub fn user_message(&self) -> String {
        match self {
            LookupError::TimedOut(_) => "Search timed out. Please try again.".to_string(),
            _ => "Failed to fetch search results. Please try again.".to_string(),
        }
    }
}

pub type LookupResult<T> = Result<T, LookupError>;

/// An opaque service returning matches for a query string
#[async_trait]
pub trait RemoteLookup: Send + Sync {
    async fn lookup(&self, query: &str) -> LookupResult<Vec<RemoteMatch>>;
}

/// `GET <endpoint>?q=<query>` over HTTP
#[derive(Debug, Clone)]
pub struct HttpLookup {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpLookup {
    pub fn new(endpoint: Url, timeout: Duration) -> LookupResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn request_url(&self, query: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair(QUERY_PARAM, query);
        url
    }
}

#[async_trait]
impl RemoteLookup for HttpLookup {
    async fn lookup(&self, query: &str) -> LookupResult<Vec<RemoteMatch>> {
        let url = self.request_url(query);
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let matches: Vec<RemoteMatch> = serde_json::from_str(&body)?;
        debug!(query, matches = matches.len(), "remote lookup completed");
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_url_encodes_query() {
        let endpoint = Url::parse("http://localhost:3000/api/search").unwrap();
        let lookup = HttpLookup::new(endpoint, DEFAULT_LOOKUP_TIMEOUT).unwrap();
        let url = lookup.request_url("rust & wasm?");
        assert_eq!(url.as_str(), "http://localhost:3000/api/search?q=rust+%26+wasm%3F");
    }

    #[test]
    fn test_request_url_keeps_existing_params() {
        let endpoint = Url::parse("http://localhost:3000/api/search?lang=en").unwrap();
        let lookup = HttpLookup::new(endpoint, DEFAULT_LOOKUP_TIMEOUT).unwrap();
        let url = lookup.request_url("hi");
        assert_eq!(url.query(), Some("lang=en&q=hi"));
    }

    #[test]
    fn test_match_without_type_deserializes() {
        let m: RemoteMatch =
            serde_json::from_str(r#"{"id":"1","title":"t","description":"d"}"#).unwrap();
        assert_eq!(m.kind, None);
    }

    #[test]
    fn test_user_messages() {
        assert!(LookupError::Status(500).user_message().contains("Failed"));
        assert!(LookupError::TimedOut(DEFAULT_LOOKUP_TIMEOUT).user_message().contains("timed out"));
    }
}
