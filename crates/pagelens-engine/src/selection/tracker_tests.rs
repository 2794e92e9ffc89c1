use super::*;
use pagelens_dom::PageDocument;
use pagelens_protocols::{BoundaryPoint, DomRange};

const ATTR: &str = "data-pagelens-target";

fn tracker() -> SelectionTracker {
    SelectionTracker::new(&ReplacementConfig::default())
}

fn page() -> (PageDocument, NodeId) {
    let doc = PageDocument::new("https://example.com/compose");
    let body = doc.body().unwrap();
    (doc, body)
}

#[test]
fn test_no_selection_is_none() {
    let (mut doc, body) = page();
    doc.append_text(body, "nothing selected").unwrap();
    assert_eq!(tracker().detect(&mut doc).unwrap(), None);
}

#[test]
fn test_focused_input_selection() {
    let (mut doc, body) = page();
    let input = doc
        .append_element(body, "input", &[("value", "Hello World")])
        .unwrap();
    doc.focus(input).unwrap();
    doc.set_selection_range(input, 6, 11).unwrap();

    let ctx = tracker().detect(&mut doc).unwrap().unwrap();
    assert_eq!(ctx.selected_text, "World");
    assert_eq!(ctx.element_type, ElementKind::Input);
    assert!(ctx.is_editable);
    assert!(ctx.is_replaceable);
    assert_eq!(ctx.captured_range(), Some((6, 11)));

    let value = doc.value(input).unwrap();
    let (start, end) = ctx.captured_range().unwrap();
    assert_eq!(slice_chars(&value, start, end), ctx.selected_text);

    let stamp = doc.attribute(input, ATTR).unwrap();
    assert_eq!(ctx.target_element_id.as_ref().unwrap().as_str(), stamp);
    assert!(stamp.starts_with("pl-target-"));
}

#[test]
fn test_collapsed_input_selection_is_none() {
    let (mut doc, body) = page();
    let input = doc.append_element(body, "input", &[("value", "abc")]).unwrap();
    doc.focus(input).unwrap();
    doc.set_selection_range(input, 2, 2).unwrap();
    assert_eq!(tracker().detect(&mut doc).unwrap(), None);
}

#[test]
fn test_textarea_and_stamp_reuse() {
    let (mut doc, body) = page();
    let area = doc.append_element(body, "textarea", &[]).unwrap();
    doc.append_text(area, "line one\nline two").unwrap();
    doc.focus(area).unwrap();
    doc.set_selection_range(area, 0, 4).unwrap();

    let tracker = tracker();
    let first = tracker.detect(&mut doc).unwrap().unwrap();
    assert_eq!(first.element_type, ElementKind::Textarea);
    assert_eq!(first.selected_text, "line");

    doc.set_selection_range(area, 5, 8).unwrap();
    let second = tracker.detect(&mut doc).unwrap().unwrap();
    assert_eq!(second.selected_text, "one");
    assert_eq!(first.target_element_id, second.target_element_id);
}

#[test]
fn test_readonly_input_not_editable_or_stamped() {
    let (mut doc, body) = page();
    let input = doc
        .append_element(body, "input", &[("value", "fixed text"), ("readonly", "")])
        .unwrap();
    doc.focus(input).unwrap();
    doc.set_selection_range(input, 0, 5).unwrap();

    let ctx = tracker().detect(&mut doc).unwrap().unwrap();
    assert!(!ctx.is_editable);
    assert!(!ctx.is_replaceable);
    assert_eq!(ctx.target_element_id, None);
    assert_eq!(doc.attribute(input, ATTR), None);
}

#[test]
fn test_password_input_never_read() {
    let (mut doc, body) = page();
    let input = doc
        .append_element(body, "input", &[("type", "password"), ("value", "hunter2")])
        .unwrap();
    doc.focus(input).unwrap();
    doc.set_selection_range(input, 0, 7).unwrap();
    assert_eq!(tracker().detect(&mut doc).unwrap(), None);
}

#[test]
fn test_password_focus_falls_through_to_page_selection() {
    let (mut doc, body) = page();
    let para = doc.append_element(body, "p", &[]).unwrap();
    let text = doc.append_text(para, "Hello World").unwrap();
    let input = doc
        .append_element(body, "input", &[("type", "password"), ("value", "hunter2")])
        .unwrap();
    doc.focus(input).unwrap();
    doc.set_selection_range(input, 0, 7).unwrap();
    doc.select_text(text, 6, 11).unwrap();

    let ctx = tracker().detect(&mut doc).unwrap().unwrap();
    assert_eq!(ctx.selected_text, "World");
    assert_eq!(ctx.element_type, ElementKind::Other);
    assert!(doc.attribute(input, ATTR).is_none());
    assert_eq!(tracker().selected_text(&doc).as_deref(), Some("World"));
}

#[test]
fn test_contenteditable_selection() {
    let (mut doc, body) = page();
    let editor = doc
        .append_element(body, "div", &[("contenteditable", "true")])
        .unwrap();
    let para = doc.append_element(editor, "p", &[]).unwrap();
    let text = doc.append_text(para, "Draft reply here").unwrap();
    doc.select_text(text, 6, 11).unwrap();

    let ctx = tracker().detect(&mut doc).unwrap().unwrap();
    assert_eq!(ctx.element_type, ElementKind::ContentEditable);
    assert_eq!(ctx.selected_text, "reply");
    assert!(ctx.is_replaceable);
    assert_eq!(ctx.captured_range(), Some((6, 11)));
    assert!(doc.attribute(editor, ATTR).is_some());
}

#[test]
fn test_contenteditable_false_is_not_editable() {
    let (mut doc, body) = page();
    let editor = doc
        .append_element(body, "div", &[("contenteditable", "false")])
        .unwrap();
    let text = doc.append_text(editor, "read only").unwrap();
    doc.select_text(text, 0, 4).unwrap();

    let ctx = tracker().detect(&mut doc).unwrap().unwrap();
    assert_eq!(ctx.element_type, ElementKind::ContentEditable);
    assert!(!ctx.is_editable);
    assert_eq!(ctx.target_element_id, None);
}

#[test]
fn test_plain_page_selection() {
    let (mut doc, body) = page();
    let text = doc.append_text(body, "Some article text").unwrap();
    doc.select_text(text, 5, 12).unwrap();

    let ctx = tracker().detect(&mut doc).unwrap().unwrap();
    assert_eq!(ctx, SelectionContext::plain("article"));
    assert!(!ctx.is_replaceable);
}

#[test]
fn test_blank_plain_selection_is_none() {
    let (mut doc, body) = page();
    let text = doc.append_text(body, "a   b").unwrap();
    doc.select_text(text, 1, 4).unwrap();
    assert_eq!(tracker().detect(&mut doc).unwrap(), None);
}

#[test]
fn test_target_ids_are_unique_per_element() {
    let (mut doc, body) = page();
    let a = doc.append_element(body, "input", &[]).unwrap();
    let b = doc.append_element(body, "input", &[]).unwrap();
    let tracker = tracker();
    let id_a = tracker.stamp(&mut doc, a).unwrap();
    let id_b = tracker.stamp(&mut doc, b).unwrap();
    assert_ne!(id_a, id_b);
    assert_eq!(tracker.stamp(&mut doc, a).unwrap(), id_a);
    assert_eq!(tracker.find_target(&doc, &id_b), Some(b));
}

#[test]
fn test_cleanup_removes_every_stamp() {
    let (mut doc, body) = page();
    let tracker = tracker();
    for _ in 0..3 {
        let input = doc.append_element(body, "input", &[]).unwrap();
        tracker.stamp(&mut doc, input).unwrap();
    }
    assert_eq!(tracker.cleanup(&mut doc).unwrap(), 3);
    assert!(doc.query_all(&format!("[{ATTR}]")).unwrap().is_empty());
}

#[test]
fn test_validate_reports_staleness() {
    let (mut doc, body) = page();
    let input = doc.append_element(body, "input", &[("value", "Hello World")]).unwrap();
    doc.focus(input).unwrap();
    doc.set_selection_range(input, 0, 5).unwrap();
    let tracker = tracker();
    let ctx = tracker.detect(&mut doc).unwrap().unwrap();
    assert_eq!(tracker.validate(&doc, &ctx), Ok(input));

    doc.set_selection_range(input, 3, 3).unwrap();
    assert_eq!(
        tracker.validate(&doc, &ctx),
        Err(StaleSelection::SelectionCollapsed)
    );

    doc.set_attribute(input, "disabled", "").unwrap();
    assert_eq!(tracker.validate(&doc, &ctx), Err(StaleSelection::NotEditable));

    doc.remove_node(input).unwrap();
    assert!(matches!(
        tracker.validate(&doc, &ctx),
        Err(StaleSelection::TargetGone(_))
    ));

    let plain = SelectionContext::plain("x");
    assert_eq!(
        tracker.validate(&doc, &plain),
        Err(StaleSelection::MissingTargetId)
    );
}

#[test]
fn test_validate_kind_mismatch() {
    let (mut doc, body) = page();
    let div = doc.append_element(body, "div", &[]).unwrap();
    let tracker = tracker();
    let id = tracker.stamp(&mut doc, div).unwrap();
    let ctx = SelectionContext::new("x", ElementKind::Textarea, true, Some((0, 1)), Some(id));
    assert_eq!(
        tracker.validate(&doc, &ctx),
        Err(StaleSelection::KindMismatch {
            expected: "textarea".to_string(),
            found: "div".to_string(),
        })
    );
}

#[test]
fn test_validate_contenteditable_selection_moved() {
    let (mut doc, body) = page();
    let editor = doc
        .append_element(body, "div", &[("contenteditable", "")])
        .unwrap();
    let inside = doc.append_text(editor, "inside text").unwrap();
    let outside = doc.append_text(body, "outside text").unwrap();
    doc.select_text(inside, 0, 6).unwrap();

    let tracker = tracker();
    let ctx = tracker.detect(&mut doc).unwrap().unwrap();
    assert_eq!(tracker.validate(&doc, &ctx), Ok(editor));

    doc.select_range(DomRange::new(
        BoundaryPoint::new(outside, 0),
        BoundaryPoint::new(outside, 7),
    ))
    .unwrap();
    assert_eq!(
        tracker.validate(&doc, &ctx),
        Err(StaleSelection::SelectionMoved)
    );

    doc.set_selection(None).unwrap();
    assert_eq!(
        tracker.validate(&doc, &ctx),
        Err(StaleSelection::SelectionCollapsed)
    );
}

#[test]
fn test_selected_text_reads_without_stamping() {
    let (mut doc, body) = page();
    let input = doc.append_element(body, "input", &[("value", "Hello World")]).unwrap();
    doc.focus(input).unwrap();
    doc.set_selection_range(input, 0, 5).unwrap();

    assert_eq!(tracker().selected_text(&doc).as_deref(), Some("Hello"));
    assert_eq!(doc.attribute(input, ATTR), None);

    doc.set_selection_range(input, 2, 2).unwrap();
    let text = doc.append_text(body, "page words").unwrap();
    doc.select_text(text, 5, 10).unwrap();
    assert_eq!(tracker().selected_text(&doc).as_deref(), Some("words"));
}
