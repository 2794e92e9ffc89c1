//! Element kind and editability rules.

use pagelens_protocols::{ElementKind, NodeId, PageInspector};

/// Single-line input types whose value is plain text with a selection.
const TEXT_INPUT_TYPES: &[&str] = &["", "text", "search", "url", "tel", "email"];

/// `contenteditable` values that make an element editable.
const EDITABLE_VALUES: &[&str] = &["", "true", "plaintext-only"];

fn input_type<P: PageInspector + ?Sized>(page: &P, node: NodeId) -> String {
    page.attribute(node, "type")
        .map(|t| t.trim().to_ascii_lowercase())
        .unwrap_or_default()
}

pub fn is_password<P: PageInspector + ?Sized>(page: &P, node: NodeId) -> bool {
    page.tag_name(node).as_deref() == Some("input") && input_type(page, node) == "password"
}

/// `Input` for text-like and password inputs, `Textarea` for textareas.
pub fn control_kind<P: PageInspector + ?Sized>(page: &P, node: NodeId) -> Option<ElementKind> {
    match page.tag_name(node)?.as_str() {
        "textarea" => Some(ElementKind::Textarea),
        "input" => {
            let ty = input_type(page, node);
            (TEXT_INPUT_TYPES.contains(&ty.as_str()) || ty == "password")
                .then_some(ElementKind::Input)
        }
        _ => None,
    }
}

/// Not disabled (directly or through a disabled fieldset) and not read-only.
pub fn control_is_editable<P: PageInspector + ?Sized>(page: &P, node: NodeId) -> bool {
    if page.attribute(node, "disabled").is_some() || page.attribute(node, "readonly").is_some() {
        return false;
    }
    !page.ancestors(node).into_iter().any(|a| {
        page.tag_name(a).as_deref() == Some("fieldset") && page.attribute(a, "disabled").is_some()
    })
}

/// Nearest element at or above `node` carrying `contenteditable`, with
/// whether that attribute's value makes it editable.
pub fn contenteditable_host<P: PageInspector + ?Sized>(
    page: &P,
    node: NodeId,
) -> Option<(NodeId, bool)> {
    let host = page.closest(node, &|id| page.attribute(id, "contenteditable").is_some())?;
    let value = page
        .attribute(host, "contenteditable")
        .map(|v| v.trim().to_ascii_lowercase())
        .unwrap_or_default();
    Some((host, EDITABLE_VALUES.contains(&value.as_str())))
}

/// Kind of `node` as a selection surface.
pub fn element_kind<P: PageInspector + ?Sized>(page: &P, node: NodeId) -> ElementKind {
    if let Some(kind) = control_kind(page, node) {
        return kind;
    }
    if page.attribute(node, "contenteditable").is_some() {
        ElementKind::ContentEditable
    } else {
        ElementKind::Other
    }
}

/// Whether `node` currently accepts text edits as a surface of `kind`.
pub fn is_editable<P: PageInspector + ?Sized>(page: &P, node: NodeId, kind: ElementKind) -> bool {
    match kind {
        ElementKind::Input | ElementKind::Textarea => control_is_editable(page, node),
        ElementKind::ContentEditable => {
            contenteditable_host(page, node).is_some_and(|(_, editable)| editable)
        }
        ElementKind::Other => false,
    }
}

/// Editability of an arbitrary element, for reporting the focused element.
pub fn element_is_editable<P: PageInspector + ?Sized>(page: &P, node: NodeId) -> bool {
    match control_kind(page, node) {
        Some(kind) => is_editable(page, node, kind),
        None => contenteditable_host(page, node).is_some_and(|(_, editable)| editable),
    }
}
