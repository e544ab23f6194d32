//! Page Text Indexer
//!
//! Snapshots the text-bearing elements of the rendered page into
//! [`PageFragment`]s. Elements without an anchor get a generated one written
//! back onto the element, so a selected result can be scrolled into view.

use crate::interface::PageFragment;
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Prefix for generated anchors
pub const GENERATED_ANCHOR_PREFIX: &str = "search-";

/// Length of the random part of a generated anchor
const GENERATED_ANCHOR_LEN: usize = 9;

/// A heading or paragraph element as seen by the indexer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextElement {
    /// Lowercase tag name (`h1`..`h6`, `p`)
    pub tag: String,
    /// Existing anchor identifier, if the element carries one
    pub anchor: Option<String>,
    pub text: String,
}

/// Anything that can expose the page's text-bearing elements.
///
/// Implementations return headings and paragraphs in document order. Indices
/// passed to [`ContentSource::assign_anchor`] refer to positions in the list
/// most recently returned by [`ContentSource::text_elements`].
pub trait ContentSource {
    fn text_elements(&self) -> Vec<TextElement>;

    fn assign_anchor(&mut self, index: usize, anchor: &str);
}

/// Source of fresh anchor identifiers
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

/// Random lowercase alphanumeric anchors, e.g. `search-k3f9a0x2q`
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn next_id(&self) -> String {
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(GENERATED_ANCHOR_LEN)
            .map(|b| char::from(b).to_ascii_lowercase())
            .collect();
        format!("{GENERATED_ANCHOR_PREFIX}{suffix}")
    }
}

/// Deterministic anchors (`<prefix>1`, `<prefix>2`, ...), for tests and snapshots
#[derive(Debug)]
pub struct SequentialIds {
    prefix: String,
    next: AtomicU64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into(), next: AtomicU64::new(1) }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}{}", self.prefix, n)
    }
}

/// Builds page fragment snapshots from a [`ContentSource`]
#[derive(Clone)]
pub struct PageIndexer {
    ids: Arc<dyn IdGenerator>,
}

impl PageIndexer {
    pub fn new(ids: Arc<dyn IdGenerator>) -> Self {
        Self { ids }
    }

    /// Index the currently displayed text, in document order.
    ///
    /// Empty elements are kept; they simply never match. Not re-run on content
    /// change: callers re-invoke when the page changes.
    pub fn index_visible_text(&self, source: &mut dyn ContentSource) -> Vec<PageFragment> {
        let elements = source.text_elements();
        let mut fragments = Vec::with_capacity(elements.len());
        let mut generated = 0usize;

        for (index, element) in elements.into_iter().enumerate() {
            let id = match element.anchor.filter(|a| !a.is_empty()) {
                Some(anchor) => anchor,
                None => {
                    let anchor = self.ids.next_id();
                    source.assign_anchor(index, &anchor);
                    generated += 1;
                    anchor
                }
            };
            fragments.push(PageFragment { id, text: element.text, kind: element.tag });
        }

        debug!(fragments = fragments.len(), generated, "indexed page text");
        fragments
    }
}

impl Default for PageIndexer {
    fn default() -> Self {
        Self::new(Arc::new(RandomIds))
    }
}
