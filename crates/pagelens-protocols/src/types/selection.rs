//! Selection context and replacement outcome types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The closed set of surfaces a selection can live in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Input,
    Textarea,
    #[serde(rename = "contenteditable")]
    ContentEditable,
    Other,
}

impl ElementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ElementKind::Input => "input",
            ElementKind::Textarea => "textarea",
            ElementKind::ContentEditable => "contenteditable",
            ElementKind::Other => "other",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque marker stamped onto an element. Compared by identity only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetId(String);

impl TargetId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What the user had selected and where.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionContext {
    pub selected_text: String,
    pub element_type: ElementKind,
    pub is_editable: bool,
    pub is_replaceable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection_start: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection_end: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_element_id: Option<TargetId>,
}

impl SelectionContext {
    /// Build a context; replaceability is derived so the
    /// `replaceable => editable && non-empty` invariant always holds.
    pub fn new(
        selected_text: impl Into<String>,
        element_type: ElementKind,
        is_editable: bool,
        range: Option<(usize, usize)>,
        target_element_id: Option<TargetId>,
    ) -> Self {
        let selected_text = selected_text.into();
        let is_replaceable = is_editable && !selected_text.is_empty();
        Self {
            selected_text,
            element_type,
            is_editable,
            is_replaceable,
            selection_start: range.map(|(start, _)| start),
            selection_end: range.map(|(_, end)| end),
            target_element_id,
        }
    }

    /// Read-only selection outside any editable surface.
    pub fn plain(selected_text: impl Into<String>) -> Self {
        Self::new(selected_text, ElementKind::Other, false, None, None)
    }

    pub fn captured_range(&self) -> Option<(usize, usize)> {
        Some((self.selection_start?, self.selection_end?))
    }
}

/// Exactly one terminal outcome per replacement attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextReplacementResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copied_to_clipboard: Option<bool>,
}

impl TextReplacementResult {
    pub fn replaced() -> Self {
        Self {
            success: true,
            error: None,
            copied_to_clipboard: None,
        }
    }

    pub fn fallback(error: impl Into<String>, copied_to_clipboard: bool) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            copied_to_clipboard: Some(copied_to_clipboard),
        }
    }
}

/// What caused a selection check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SelectionTrigger {
    PointerUp,
    KeyUp { shift: bool },
    Explicit,
}

impl SelectionTrigger {
    /// Key-up only counts when shift was held (keyboard range extension).
    pub fn should_capture(self) -> bool {
        match self {
            SelectionTrigger::PointerUp | SelectionTrigger::Explicit => true,
            SelectionTrigger::KeyUp { shift } => shift,
        }
    }
}
