//! Match highlighting for rendered result rows
//!
//! Splits text around case-insensitive occurrences of the literal query.
//! Segments borrow nothing from the caller and never alter the source text:
//! concatenating every segment's `text` reproduces the input exactly.

use serde::Serialize;

/// A run of text, either emphasized (a query match) or plain
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HighlightSegment {
    pub text: String,
    pub emphasized: bool,
}

impl HighlightSegment {
    fn plain(text: &str) -> Self {
        Self { text: text.to_string(), emphasized: false }
    }

    fn emphasized(text: &str) -> Self {
        Self { text: text.to_string(), emphasized: true }
    }
}

/// Byte range `[start, end)` into the original text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchRange {
    pub start: usize,
    pub end: usize,
}

/// Segment `text` around every case-insensitive occurrence of `query`.
///
/// An empty query yields the whole text as one plain segment.
pub fn highlight(text: &str, query: &str) -> Vec<HighlightSegment> {
    let ranges = match_ranges(text, query);
    if ranges.is_empty() {
        return vec![HighlightSegment::plain(text)];
    }

    let mut segments = Vec::with_capacity(ranges.len() * 2 + 1);
    let mut cursor = 0;
    for range in ranges {
        if range.start > cursor {
            segments.push(HighlightSegment::plain(&text[cursor..range.start]));
        }
        segments.push(HighlightSegment::emphasized(&text[range.start..range.end]));
        cursor = range.end;
    }
    if cursor < text.len() {
        segments.push(HighlightSegment::plain(&text[cursor..]));
    }
    segments
}

/// Case-insensitive substring test shared with page-content matching.
///
/// Agrees with [`highlight`]: a text passes exactly when highlighting it would
/// emphasize something.
pub fn contains_ignore_case(text: &str, query: &str) -> bool {
    !match_ranges(text, query).is_empty()
}

/// Char-by-char lowercasing. `str::to_lowercase` applies final-sigma context,
/// which would make query and text fold differently.
fn fold(s: &str) -> String {
    s.chars().flat_map(char::to_lowercase).collect()
}

/// Non-overlapping match ranges, left to right, on char boundaries of `text`.
///
/// Lowercasing can change byte lengths (and even char counts), so matching runs
/// on a lowered copy and every lowered byte is mapped back to the original char
/// it came from.
pub fn match_ranges(text: &str, query: &str) -> Vec<MatchRange> {
    if query.is_empty() || text.is_empty() {
        return Vec::new();
    }
    let query_lower = fold(query);

    // origin[i] = (start, end) of the original char that produced lowered byte i
    let mut lowered = String::with_capacity(text.len());
    let mut origin: Vec<(usize, usize)> = Vec::with_capacity(text.len());
    for (start, ch) in text.char_indices() {
        let end = start + ch.len_utf8();
        for lc in ch.to_lowercase() {
            lowered.push(lc);
            origin.extend(std::iter::repeat((start, end)).take(lc.len_utf8()));
        }
    }

    let mut ranges: Vec<MatchRange> = Vec::new();
    let mut from = 0;
    while let Some(pos) = lowered[from..].find(&query_lower) {
        let lo = from + pos;
        let hi = lo + query_lower.len();
        let start = origin[lo].0;
        let end = origin[hi - 1].1;
        match ranges.last_mut() {
            // Two matches landing inside one expanded char collapse into one range
            Some(last) if start < last.end => last.end = last.end.max(end),
            _ => ranges.push(MatchRange { start, end }),
        }
        from = hi;
    }
    ranges
}
