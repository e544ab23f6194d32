//! HTML-backed content source
//!
//! Parses a rendered page once and keeps its headings and paragraphs as an
//! owned element list. Anchors assigned by the indexer live on that list, so
//! a result id can later be resolved back to its element.

use crate::indexer::{ContentSource, TextElement};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};

static TEXT_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("h1, h2, h3, h4, h5, h6, p")
        .expect("BUG: hardcoded text element selector is invalid")
});

/// A parsed page exposing its text-bearing elements
#[derive(Debug, Clone, Default)]
pub struct HtmlPage {
    elements: Vec<TextElement>,
}

impl HtmlPage {
    /// Parse a full document or a fragment of body markup.
    pub fn parse(html: &str) -> Self {
        let document = Html::parse_document(html);
        let elements = document
            .select(&TEXT_SELECTOR)
            .map(|el| TextElement {
                tag: el.value().name().to_ascii_lowercase(),
                anchor: el.value().id().map(str::to_string),
                text: normalize_whitespace(&el.text().collect::<String>()),
            })
            .collect();
        Self { elements }
    }

    pub fn elements(&self) -> &[TextElement] {
        &self.elements
    }

    /// Element carrying `anchor`, if any
    pub fn find_anchor(&self, anchor: &str) -> Option<&TextElement> {
        self.elements.iter().find(|el| el.anchor.as_deref() == Some(anchor))
    }
}

impl ContentSource for HtmlPage {
    fn text_elements(&self) -> Vec<TextElement> {
        self.elements.clone()
    }

    fn assign_anchor(&mut self, index: usize, anchor: &str) {
        if let Some(el) = self.elements.get_mut(index) {
            el.anchor = Some(anchor.to_string());
        }
    }
}

/// Collapse runs of whitespace to single spaces and trim the ends
fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indexer::{PageIndexer, SequentialIds};
    use std::sync::Arc;

    const ABOUT_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>About</title></head>
<body>
    <nav><a href="/">Home</a></nav>
    <h1 id="about">About me</h1>
    <p>I write <strong>Rust</strong> and
       TypeScript.</p>
    <ul><li>Not indexed</li></ul>
    <h2>Projects</h2>
    <p></p>
</body>
</html>"#;

    #[test]
    fn test_selects_headings_and_paragraphs_in_order() {
        let page = HtmlPage::parse(ABOUT_PAGE);
        let tags: Vec<_> = page.elements().iter().map(|e| e.tag.as_str()).collect();
        assert_eq!(tags, vec!["h1", "p", "h2", "p"]);
    }

    #[test]
    fn test_text_is_whitespace_normalized() {
        let page = HtmlPage::parse(ABOUT_PAGE);
        assert_eq!(page.elements()[1].text, "I write Rust and TypeScript.");
        assert_eq!(page.elements()[3].text, "");
    }

    #[test]
    fn test_existing_anchor_is_read() {
        let page = HtmlPage::parse(ABOUT_PAGE);
        assert_eq!(page.elements()[0].anchor.as_deref(), Some("about"));
        assert_eq!(page.elements()[2].anchor, None);
    }

    #[test]
    fn test_indexer_assigns_resolvable_anchors() {
        let mut page = HtmlPage::parse(ABOUT_PAGE);
        let indexer = PageIndexer::new(Arc::new(SequentialIds::new("s-")));
        let fragments = indexer.index_visible_text(&mut page);

        assert_eq!(fragments.len(), 4);
        assert_eq!(fragments[0].id, "about");
        assert_eq!(fragments[1].id, "s-1");
        let el = page.find_anchor("s-2").expect("assigned anchor resolves");
        assert_eq!(el.text, "Projects");
    }
}
