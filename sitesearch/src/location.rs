//! Mirrors the search term into the page location's `?query=` parameter

use url::Url;

/// Location parameter holding the current term
pub const QUERY_PARAM: &str = "query";

/// Term carried by `location`, if any
pub fn query_from_location(location: &Url) -> Option<String> {
    location
        .query_pairs()
        .find(|(k, _)| k == QUERY_PARAM)
        .map(|(_, v)| v.into_owned())
        .filter(|v| !v.trim().is_empty())
}

/// `location` with `query` set to `term`, or removed when `term` is blank.
/// Other parameters and their order are preserved.
pub fn location_with_query(location: &Url, term: &str) -> Url {
    let term = term.trim();
    let mut pairs: Vec<(String, String)> = location
        .query_pairs()
        .filter(|(k, _)| k != QUERY_PARAM)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    if !term.is_empty() {
        pairs.push((QUERY_PARAM.to_string(), term.to_string()));
    }

    let mut url = location.clone();
    if pairs.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(pairs);
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_sets_query() {
        let next = location_with_query(&url("https://example.dev/about"), "rust tips");
        assert_eq!(next.as_str(), "https://example.dev/about?query=rust+tips");
    }

    #[test]
    fn test_replaces_existing_query_and_keeps_others() {
        let next = location_with_query(&url("https://example.dev/?query=old&tab=2"), "new");
        assert_eq!(next.query(), Some("tab=2&query=new"));
    }

    #[test]
    fn test_blank_term_removes_param() {
        let next = location_with_query(&url("https://example.dev/contact?query=x"), "  ");
        assert_eq!(next.as_str(), "https://example.dev/contact");

        let next = location_with_query(&url("https://example.dev/?query=x&tab=2"), "");
        assert_eq!(next.query(), Some("tab=2"));
    }

    #[test]
    fn test_reads_query() {
        assert_eq!(
            query_from_location(&url("https://example.dev/?query=hello%20there")).as_deref(),
            Some("hello there")
        );
        assert_eq!(query_from_location(&url("https://example.dev/?query=")), None);
        assert_eq!(query_from_location(&url("https://example.dev/")), None);
    }
}
