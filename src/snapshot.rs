//! Loading an HTML snapshot and preparing focus and selection on it.

use std::error::Error;

use pagelens_dom::PageDocument;
use pagelens_protocols::{NodeId, PageInspector, PageMutator};
use tracing::debug;

use crate::cli::PageArgs;

/// Read the snapshot named by `args`, then apply `--focus` and `--select`.
pub(crate) async fn load_page(args: &PageArgs) -> Result<PageDocument, Box<dyn Error>> {
    let html = tokio::fs::read_to_string(&args.html).await?;
    let mut doc = PageDocument::from_html(&html, &args.url);
    debug!(path = %args.html.display(), url = %args.url, "Snapshot loaded");

    let focused = match &args.focus {
        Some(selector) => {
            let node = doc
                .query_first(selector)?
                .ok_or_else(|| format!("no element matches {selector}"))?;
            doc.focus(node)?;
            Some(node)
        }
        None => None,
    };
    if let Some(wanted) = &args.select {
        select_first(&mut doc, focused, wanted)?;
    }
    Ok(doc)
}

/// Select the first occurrence of `wanted`: inside the focused control's
/// value when there is one, otherwise in a single text node under the
/// focused element or the body.
fn select_first(
    doc: &mut PageDocument,
    focused: Option<NodeId>,
    wanted: &str,
) -> Result<(), Box<dyn Error>> {
    let len = wanted.chars().count();
    if let Some(node) = focused {
        if let Some(value) = doc.value(node) {
            let start = char_offset(&value, wanted)
                .ok_or_else(|| format!("focused control does not contain {wanted:?}"))?;
            doc.set_selection_range(node, start, start + len)?;
            return Ok(());
        }
    }

    let root = focused
        .or_else(|| doc.body())
        .ok_or("document has no body")?;
    for text_node in doc.text_nodes_within(root) {
        let data = doc.text_data(text_node).unwrap_or_default();
        if let Some(start) = char_offset(&data, wanted) {
            doc.select_text(text_node, start, start + len)?;
            return Ok(());
        }
    }
    Err(format!("no text node contains {wanted:?}").into())
}

fn char_offset(haystack: &str, needle: &str) -> Option<usize> {
    haystack
        .find(needle)
        .map(|byte| haystack[..byte].chars().count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    fn snapshot(html: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(html.as_bytes()).unwrap();
        file
    }

    fn args(path: PathBuf, focus: Option<&str>, select: Option<&str>) -> PageArgs {
        PageArgs {
            html: path,
            url: "https://example.com/".to_string(),
            focus: focus.map(str::to_string),
            select: select.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_select_inside_focused_control() {
        let file = snapshot(r#"<body><textarea id="t">naïve draft text</textarea></body>"#);
        let doc = load_page(&args(file.path().to_path_buf(), Some("#t"), Some("draft")))
            .await
            .unwrap();
        let textarea = doc.query_first("#t").unwrap().unwrap();
        assert_eq!(doc.active_element(), Some(textarea));
        assert_eq!(doc.selection_range(textarea), Some((6, 11)));
    }

    #[tokio::test]
    async fn test_select_in_body_text() {
        let file = snapshot("<body><p>First</p><p>Second paragraph</p></body>");
        let doc = load_page(&args(file.path().to_path_buf(), None, Some("paragraph")))
            .await
            .unwrap();
        assert_eq!(doc.selection().unwrap().text, "paragraph");
    }

    #[tokio::test]
    async fn test_missing_text_is_an_error() {
        let file = snapshot("<body><p>Nothing here</p></body>");
        let result = load_page(&args(file.path().to_path_buf(), None, Some("absent"))).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        let result = load_page(&args(PathBuf::from("/nonexistent/page.html"), None, None)).await;
        assert!(result.is_err());
    }
}
