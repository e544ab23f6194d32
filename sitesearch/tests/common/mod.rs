//! Shared helpers for the sitesearch integration tests

use mockito::{Matcher, Mock, Server};
use sitesearch::lookup::HttpLookup;
use std::time::Duration;
use url::Url;

/// Page resembling the site's home page
#[allow(dead_code)]
pub const HOME_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head><title>Home</title></head>
<body>
    <h1>Welcome to my corner of the web</h1>
    <p id="f1">hello world</p>
    <h2 id="work">Work</h2>
    <p>Building tools in Rust and shipping them to the browser.</p>
</body>
</html>"#;

/// Lookup client pointed at the mock server's `/api/search`
#[allow(dead_code)]
pub fn lookup_for(server: &Server) -> HttpLookup {
    let endpoint = Url::parse(&server.url()).unwrap().join("/api/search").unwrap();
    HttpLookup::new(endpoint, Duration::from_secs(5)).unwrap()
}

/// `GET /api/search?q=<query>` answering with a JSON body
#[allow(dead_code)]
pub async fn mock_search(server: &mut Server, query: &str, status: usize, body: &str) -> Mock {
    server
        .mock("GET", "/api/search")
        .match_query(Matcher::UrlEncoded("q".into(), query.into()))
        .with_status(status)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create_async()
        .await
}
