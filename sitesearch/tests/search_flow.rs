//! End-to-end widget flows: HTML page, mock endpoint, file-backed history

mod common;

use common::{lookup_for, mock_search, HOME_PAGE};
use sitesearch::history::{FileStorage, MemoryStorage};
use sitesearch::html::HtmlPage;
use sitesearch::indexer::SequentialIds;
use sitesearch::{
    ScrollBehavior, SearchResult, SearchWidget, SessionPhase, SourceKind, Viewport, WidgetConfig,
    WidgetView,
};
use std::sync::Arc;

#[derive(Default)]
struct RecordingViewport(Vec<String>);

impl Viewport for RecordingViewport {
    fn scroll_into_view(&mut self, anchor: &str, behavior: ScrollBehavior) {
        assert_eq!(behavior, ScrollBehavior::Smooth);
        self.0.push(anchor.to_string());
    }
}

fn widget(server: &mockito::Server) -> SearchWidget {
    SearchWidget::new(
        Arc::new(lookup_for(server)),
        Arc::new(MemoryStorage::new()),
        Arc::new(SequentialIds::new("search-")),
    )
}

#[tokio::test]
async fn test_page_content_then_remote() {
    let mut server = mockito::Server::new_async().await;
    let _mock = mock_search(
        &mut server,
        "hello",
        200,
        r#"[{"id":"r1","title":"hello match","description":"...","type":"api"}]"#,
    )
    .await;

    let w = widget(&server);
    let mut page = HtmlPage::parse(HOME_PAGE);
    w.activate(&mut page);
    w.open();
    w.on_input("hello");
    assert!(w.flush().await);

    let state = w.state();
    assert_eq!(state.phase, SessionPhase::Success);
    assert_eq!(
        state.results,
        vec![
            SearchResult {
                id: "f1".into(),
                title: "Found in p".into(),
                description: "hello world...".into(),
                source_kind: SourceKind::PageContent,
            },
            SearchResult {
                id: "api-r1".into(),
                title: "hello match".into(),
                description: "...".into(),
                source_kind: SourceKind::Remote,
            },
        ]
    );
    assert_eq!(w.orchestrator().history()[0].term, "hello");
}

#[tokio::test]
async fn test_server_error_fails_without_history() {
    let mut server = mockito::Server::new_async().await;
    let _mock = mock_search(&mut server, "hello", 500, "Internal Server Error").await;

    let w = widget(&server);
    w.activate(&mut HtmlPage::parse(HOME_PAGE));
    w.open();
    w.on_input("hello");
    w.flush().await;

    let state = w.state();
    assert_eq!(state.phase, SessionPhase::Failed);
    assert!(state.results.is_empty());
    assert!(state.error.is_some());
    assert!(w.orchestrator().history().is_empty());
    assert!(matches!(w.view(), WidgetView::Error(_)));

    // Input stays usable; clearing returns to the prompt
    w.on_input("");
    assert_eq!(w.view(), WidgetView::Prompt);
}

#[tokio::test]
async fn test_generated_anchor_scrolls_into_view() {
    let mut server = mockito::Server::new_async().await;
    let _mock = mock_search(&mut server, "browser", 200, "[]").await;

    let w = widget(&server);
    let mut page = HtmlPage::parse(HOME_PAGE);
    w.activate(&mut page);
    w.open();
    w.on_input("browser");
    w.flush().await;

    let hit = w.state().results[0].clone();
    assert_eq!(hit.title, "Found in p");
    let mut viewport = RecordingViewport::default();
    w.select(&hit, &mut viewport);

    assert_eq!(viewport.0, vec![hit.id.clone()]);
    let element = page.find_anchor(&hit.id).expect("anchor assigned onto page");
    assert!(element.text.contains("browser"));
    assert!(!w.state().is_open);
}

#[tokio::test]
async fn test_history_persists_across_widgets() {
    let mut server = mockito::Server::new_async().await;
    let _mock = mock_search(&mut server, "rust", 200, "[]").await;
    let dir = tempfile::tempdir().unwrap();

    {
        let w = SearchWidget::new(
            Arc::new(lookup_for(&server)),
            Arc::new(FileStorage::new(dir.path())),
            Arc::new(SequentialIds::new("s-")),
        );
        w.activate(&mut HtmlPage::parse(HOME_PAGE));
        w.on_input("rust");
        w.flush().await;
    }

    let w = SearchWidget::new(
        Arc::new(lookup_for(&server)),
        Arc::new(FileStorage::new(dir.path())),
        Arc::new(SequentialIds::new("s-")),
    );
    w.activate(&mut HtmlPage::parse(HOME_PAGE));
    w.open();
    match w.view() {
        WidgetView::History(entries) => assert_eq!(entries[0].term, "rust"),
        other => panic!("expected history, got {other:?}"),
    }
}

#[tokio::test]
async fn test_debounced_burst_issues_one_request() {
    let mut server = mockito::Server::new_async().await;
    let last = mock_search(&mut server, "hello", 200, "[]").await;
    let earlier = server
        .mock("GET", "/api/search")
        .match_query(mockito::Matcher::Regex("q=h(e|el|ell)?$".into()))
        .expect(0)
        .create_async()
        .await;

    let w = widget(&server);
    w.activate(&mut HtmlPage::parse(HOME_PAGE));
    for value in ["h", "he", "hel", "hell", "hello"] {
        w.on_input(value);
    }
    assert!(w.flush().await);
    assert!(!w.flush().await);

    last.assert_async().await;
    earlier.assert_async().await;
}

#[tokio::test]
async fn test_widget_from_config_file() {
    let mut server = mockito::Server::new_async().await;
    let _mock = mock_search(
        &mut server,
        "hello",
        200,
        r#"[{"id":"7","title":"hello post","description":"..."}]"#,
    )
    .await;
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.toml");
    WidgetConfig {
        base_url: server.url(),
        storage_dir: Some(dir.path().join("data")),
        placeholder: "Search the site...".to_string(),
        ..WidgetConfig::default()
    }
    .save_to(&config_path)
    .unwrap();

    let config = WidgetConfig::load_from(&config_path).unwrap();
    {
        let w = SearchWidget::from_config(&config).unwrap();
        assert_eq!(w.placeholder(), "Search the site...");
        w.activate(&mut HtmlPage::parse(HOME_PAGE));
        w.on_input("hello");
        assert!(w.flush().await);

        let ids: Vec<_> = w.state().results.into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["f1", "api-7"]);
    }
    assert!(dir.path().join("data").join("recent-searches.json").exists());

    let w = SearchWidget::from_config(&config).unwrap();
    w.activate(&mut HtmlPage::parse(HOME_PAGE));
    w.open();
    match w.view() {
        WidgetView::History(entries) => assert_eq!(entries[0].term, "hello"),
        other => panic!("expected history, got {other:?}"),
    }
}
