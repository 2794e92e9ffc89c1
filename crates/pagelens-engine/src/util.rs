//! Small text and query helpers shared by the extractors.

use pagelens_protocols::{NodeId, PageError, PageInspector};

/// Truncation marker appended to shortened text.
pub const ELLIPSIS: &str = "...";

/// Cap `text` at `max` chars. Longer text keeps `max - 3` chars plus `...`.
/// Returns whether truncation happened.
pub fn truncate_chars(text: &str, max: usize) -> (String, bool) {
    if text.chars().count() <= max {
        return (text.to_string(), false);
    }
    if max < ELLIPSIS.len() {
        return (text.chars().take(max).collect(), true);
    }
    let mut out: String = text.chars().take(max - ELLIPSIS.len()).collect();
    out.push_str(ELLIPSIS);
    (out, true)
}

/// Like [`truncate_chars`] but without the flag.
pub fn cap(text: &str, max: usize) -> String {
    truncate_chars(text, max).0
}

/// Collapse runs of whitespace into single spaces and trim.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First `n` chars of `text`.
pub fn prefix_chars(text: &str, n: usize) -> String {
    text.chars().take(n).collect()
}

pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Chars `[start, end)` of `text`.
pub fn slice_chars(text: &str, start: usize, end: usize) -> String {
    text.chars().skip(start).take(end.saturating_sub(start)).collect()
}

/// Char offset of the first occurrence of `needle` in `haystack`.
pub fn find_chars(haystack: &str, needle: &str) -> Option<usize> {
    haystack.find(needle).map(|byte| char_len(&haystack[..byte]))
}

/// Elements matching `selector` that are currently rendered.
pub fn visible_matches<P: PageInspector + ?Sized>(
    page: &P,
    selector: &str,
) -> Result<Vec<NodeId>, PageError> {
    Ok(page
        .query_all(selector)?
        .into_iter()
        .filter(|id| page.is_visible(*id))
        .collect())
}

/// Rendered text of `node`, trimmed, or `None` when blank.
pub fn rendered_text<P: PageInspector + ?Sized>(page: &P, node: NodeId) -> Option<String> {
    let text = collapse_whitespace(&page.inner_text(node));
    (!text.is_empty()).then_some(text)
}

/// Element whose `id` attribute equals `id`. Ids are compared verbatim so
/// values that are not valid selector identifiers still resolve.
pub fn element_by_id<P: PageInspector + ?Sized>(
    page: &P,
    id: &str,
) -> Result<Option<NodeId>, PageError> {
    Ok(page
        .query_all("[id]")?
        .into_iter()
        .find(|node| page.attribute(*node, "id").as_deref() == Some(id)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_text_untouched() {
        assert_eq!(truncate_chars("hello", 5), ("hello".to_string(), false));
    }

    #[test]
    fn test_truncate_long_text() {
        let (out, truncated) = truncate_chars("hello world", 8);
        assert!(truncated);
        assert_eq!(out, "hello...");
        assert_eq!(out.chars().count(), 8);
    }

    #[test]
    fn test_truncate_counts_chars_not_bytes() {
        let (out, truncated) = truncate_chars("héllo wörld", 11);
        assert!(!truncated);
        assert_eq!(out, "héllo wörld");
        assert_eq!(cap("ééééé", 4), "é...");
    }

    #[test]
    fn test_truncate_tiny_cap() {
        assert_eq!(truncate_chars("hello", 2), ("he".to_string(), true));
    }

    #[test]
    fn test_slice_and_find_chars() {
        assert_eq!(slice_chars("héllo wörld", 6, 11), "wörld");
        assert_eq!(slice_chars("abc", 2, 1), "");
        assert_eq!(find_chars("héllo wörld", "wörld"), Some(6));
        assert_eq!(find_chars("abc", "z"), None);
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a \n\t b  "), "a b");
    }
}
