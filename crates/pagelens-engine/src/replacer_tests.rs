use super::*;
use pagelens_config::ReplacementConfig;
use pagelens_dom::{MemoryClipboard, PageDocument};
use pagelens_protocols::TargetId;

fn replacer() -> TextReplacer {
    TextReplacer::new(SelectionTracker::new(&ReplacementConfig::default()))
}

/// Page with a focused input holding `value`, `[start, end)` selected and
/// captured.
fn input_page(value: &str, start: usize, end: usize) -> (PageDocument, NodeId, SelectionContext) {
    let mut doc = PageDocument::new("https://example.com/form");
    let body = doc.body().unwrap();
    let input = doc.append_element(body, "input", &[("value", value)]).unwrap();
    doc.focus(input).unwrap();
    doc.set_selection_range(input, start, end).unwrap();
    let ctx = replacer().tracker().detect(&mut doc).unwrap().unwrap();
    (doc, input, ctx)
}

/// Page with a content-editable `div > p > "Draft reply here"`, "reply"
/// selected and captured.
fn editable_page() -> (PageDocument, NodeId, NodeId, SelectionContext) {
    let mut doc = PageDocument::new("https://mail.example.com/");
    let body = doc.body().unwrap();
    let editor = doc
        .append_element(body, "div", &[("contenteditable", "true")])
        .unwrap();
    let para = doc.append_element(editor, "p", &[]).unwrap();
    let text = doc.append_text(para, "Draft reply here").unwrap();
    doc.select_text(text, 6, 11).unwrap();
    let ctx = replacer().tracker().detect(&mut doc).unwrap().unwrap();
    (doc, editor, text, ctx)
}

#[test]
fn test_input_replacement_splices_and_moves_caret() {
    let (mut doc, input, ctx) = input_page("Hello World", 6, 11);
    let mut clipboard = MemoryClipboard::new();

    let result = replacer().replace(&mut doc, &mut clipboard, &ctx, "Universe");

    assert_eq!(result, TextReplacementResult::replaced());
    assert_eq!(doc.value(input).as_deref(), Some("Hello Universe"));
    assert_eq!(doc.selection_range(input), Some((14, 14)));
    let events: Vec<DomEvent> = doc
        .events()
        .iter()
        .filter(|e| e.target == input)
        .map(|e| e.event)
        .collect();
    assert_eq!(events, vec![DomEvent::Input, DomEvent::Change, DomEvent::KeyUp]);
    assert!(clipboard.writes().is_empty());
}

#[test]
fn test_input_falls_back_to_current_selection() {
    let (mut doc, input, ctx) = input_page("Hello World", 6, 11);
    doc.set_value(input, "Oh, Hello World").unwrap();
    doc.set_selection_range(input, 10, 15).unwrap();

    let result = replacer().replace(&mut doc, &mut MemoryClipboard::new(), &ctx, "there");

    assert!(result.success);
    assert_eq!(doc.value(input).as_deref(), Some("Oh, Hello there"));
}

#[test]
fn test_input_stale_text_copies_instead() {
    let (mut doc, input, ctx) = input_page("Hello World", 6, 11);
    doc.set_value(input, "Something else").unwrap();
    let mut clipboard = MemoryClipboard::new();

    let result = replacer().replace(&mut doc, &mut clipboard, &ctx, "Universe");

    assert!(!result.success);
    assert_eq!(result.copied_to_clipboard, Some(true));
    assert_eq!(clipboard.writes(), ["Universe"]);
    assert_eq!(doc.value(input).as_deref(), Some("Something else"));
}

#[test]
fn test_unknown_target_copies_exact_text() {
    let (mut doc, _, mut ctx) = input_page("Hello World", 6, 11);
    ctx.target_element_id = Some(TargetId::new("pl-target-does-not-exist"));
    let mut clipboard = MemoryClipboard::new();

    let result = replacer().replace(&mut doc, &mut clipboard, &ctx, "Universe");

    assert!(!result.success);
    assert_eq!(result.copied_to_clipboard, Some(true));
    assert!(result.error.unwrap().contains("pl-target-does-not-exist"));
    assert_eq!(clipboard.writes(), ["Universe"]);
}

#[test]
fn test_target_made_readonly_is_not_mutated() {
    let (mut doc, input, ctx) = input_page("Hello World", 6, 11);
    doc.set_attribute(input, "readonly", "").unwrap();

    let result = replacer().replace(&mut doc, &mut MemoryClipboard::new(), &ctx, "Universe");

    assert!(!result.success);
    assert_eq!(doc.value(input).as_deref(), Some("Hello World"));
    assert!(doc.events().is_empty());
}

#[test]
fn test_denied_clipboard_uses_copy_command() {
    let (mut doc, input, mut ctx) = input_page("Hello World", 6, 11);
    ctx.target_element_id = None;
    let mut clipboard = MemoryClipboard::denied();

    let result = replacer().replace(&mut doc, &mut clipboard, &ctx, "Universe");

    assert_eq!(result.copied_to_clipboard, Some(true));
    assert_eq!(doc.copies(), ["Universe"]);
    assert!(doc.query_all("textarea").unwrap().is_empty());
    assert_eq!(doc.active_element(), Some(input));
}

#[test]
fn test_no_clipboard_at_all_reports_not_copied() {
    let (mut doc, _, mut ctx) = input_page("Hello World", 6, 11);
    ctx.target_element_id = None;
    doc.set_copy_enabled(false);

    let result = replacer().replace(&mut doc, &mut MemoryClipboard::denied(), &ctx, "Universe");

    assert!(!result.success);
    assert_eq!(result.copied_to_clipboard, Some(false));
    assert!(result.error.is_some());
}

#[test]
fn test_plain_selection_is_unsupported() {
    let mut doc = PageDocument::new("https://example.com/");
    let ctx = SelectionContext::plain("read only");
    let mut clipboard = MemoryClipboard::new();

    let result = replacer().replace(&mut doc, &mut clipboard, &ctx, "new");

    assert!(!result.success);
    assert!(result.error.unwrap().contains("other"));
    assert_eq!(clipboard.last(), Some("new"));
}

#[test]
fn test_contenteditable_replaces_live_range() {
    let (mut doc, editor, text, ctx) = editable_page();

    let result = replacer().replace(&mut doc, &mut MemoryClipboard::new(), &ctx, "answer");

    assert!(result.success);
    assert_eq!(doc.text_content(editor), "Draft answer here");
    let para = doc.children(editor)[0];
    assert_eq!(doc.children(para), vec![text]);
    let caret = doc.selection().and_then(|s| s.range).unwrap();
    assert_eq!(caret, DomRange::collapsed(BoundaryPoint::new(text, 12)));
    assert!(doc.events().iter().any(|e| e.target == editor && e.event == DomEvent::Input));
}

#[test]
fn test_contenteditable_select_all_range_on_element() {
    let mut doc = PageDocument::new("https://mail.example.com/");
    let body = doc.body().unwrap();
    let editor = doc
        .append_element(body, "div", &[("contenteditable", "true")])
        .unwrap();
    doc.append_text(editor, "Hello World").unwrap();
    doc.select_range(DomRange::new(
        BoundaryPoint::new(editor, 0),
        BoundaryPoint::new(editor, 1),
    ))
    .unwrap();
    let ctx = replacer().tracker().detect(&mut doc).unwrap().unwrap();
    assert_eq!(ctx.selected_text, "Hello World");
    let mut clipboard = MemoryClipboard::new();

    let result = replacer().replace(&mut doc, &mut clipboard, &ctx, "Goodbye");

    assert_eq!(result, TextReplacementResult::replaced());
    assert_eq!(doc.text_content(editor), "Goodbye");
    assert!(clipboard.writes().is_empty());
}

#[test]
fn test_contenteditable_relocates_by_text() {
    let (mut doc, editor, _, ctx) = editable_page();
    doc.set_selection(None).unwrap();

    let result = replacer().replace(&mut doc, &mut MemoryClipboard::new(), &ctx, "note");

    assert!(result.success);
    assert_eq!(doc.text_content(editor), "Draft note here");
}

#[test]
fn test_contenteditable_relocates_trimmed_text() {
    let (mut doc, editor, _, mut ctx) = editable_page();
    doc.set_selection(None).unwrap();
    ctx.selected_text = "reply\n".to_string();
    ctx.selection_start = None;
    ctx.selection_end = None;

    let result = replacer().replace(&mut doc, &mut MemoryClipboard::new(), &ctx, "note");

    assert!(result.success);
    assert_eq!(doc.text_content(editor), "Draft note here");
}

#[test]
fn test_contenteditable_relocates_across_nodes() {
    let mut doc = PageDocument::new("https://example.com/");
    let body = doc.body().unwrap();
    let editor = doc.append_element(body, "div", &[("contenteditable", "")]).unwrap();
    let first = doc.append_text(editor, "Hello ").unwrap();
    let bold = doc.append_element(editor, "b", &[]).unwrap();
    doc.append_text(bold, "brave").unwrap();
    let last = doc.append_text(editor, " world").unwrap();
    doc.select_range(DomRange::new(
        BoundaryPoint::new(first, 0),
        BoundaryPoint::new(last, 6),
    ))
    .unwrap();
    let ctx = replacer().tracker().detect(&mut doc).unwrap().unwrap();
    assert_eq!(ctx.selected_text, "Hello brave world");
    doc.set_selection(None).unwrap();

    let tweaked = SelectionContext {
        selected_text: "brave world".to_string(),
        selection_start: None,
        selection_end: None,
        ..ctx
    };
    let result = replacer().replace(&mut doc, &mut MemoryClipboard::new(), &tweaked, "there");

    assert!(result.success);
    assert_eq!(doc.text_content(editor), "Hello there");
}

#[test]
fn test_contenteditable_missing_text_is_stale() {
    let (mut doc, editor, text, ctx) = editable_page();
    doc.set_selection(None).unwrap();
    doc.remove_node(text).unwrap();
    let mut clipboard = MemoryClipboard::new();

    let result = replacer().replace(&mut doc, &mut clipboard, &ctx, "note");

    assert!(!result.success);
    assert_eq!(doc.text_content(editor), "");
    assert_eq!(clipboard.writes(), ["note"]);
}
