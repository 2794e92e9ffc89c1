//! BoundingBox geometry and node payload helpers.

use pagelens_protocols::NodeId;

use super::{BoundingBox, DomNode, ElementData, NodeData};

/// Elements that never render a box.
pub(crate) const NON_RENDERED_TAGS: &[&str] = &[
    "head", "script", "style", "template", "noscript", "title", "meta", "link",
];

/// Elements serialized without a closing tag.
pub(crate) const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Input types that carry an editable text value with a selection.
const TEXT_INPUT_TYPES: &[&str] = &["text", "search", "url", "tel", "email", "password"];

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    /// Whether the box has no rendered area.
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Check if a point is inside this bounding box.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }
}

impl ElementData {
    pub fn new(tag: &str) -> Self {
        let tag = tag.to_ascii_lowercase();
        let bounding_box = if NON_RENDERED_TAGS.contains(&tag.as_str()) {
            BoundingBox::zero()
        } else {
            BoundingBox::default()
        };
        Self {
            tag,
            attributes: Vec::new(),
            value: None,
            selection: None,
            bounding_box,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.attributes
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    pub fn set_attribute(&mut self, name: &str, value: &str) {
        let name = name.to_ascii_lowercase();
        match self.attributes.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value.to_string(),
            None => self.attributes.push((name, value.to_string())),
        }
    }

    pub fn remove_attribute(&mut self, name: &str) {
        let name = name.to_ascii_lowercase();
        self.attributes.retain(|(k, _)| *k != name);
    }

    /// `input` of a textual type, or `textarea`.
    pub fn is_text_control(&self) -> bool {
        match self.tag.as_str() {
            "textarea" => true,
            "input" => {
                let ty = self
                    .attribute("type")
                    .map(str::to_ascii_lowercase)
                    .unwrap_or_default();
                ty.is_empty() || TEXT_INPUT_TYPES.contains(&ty.as_str())
            }
            _ => false,
        }
    }

    /// Whether the element itself is hidden, ignoring ancestors.
    pub fn hides_itself(&self) -> bool {
        if self.has_attribute("hidden") || NON_RENDERED_TAGS.contains(&self.tag.as_str()) {
            return true;
        }
        if self.tag == "input"
            && self
                .attribute("type")
                .is_some_and(|t| t.eq_ignore_ascii_case("hidden"))
        {
            return true;
        }
        if self.bounding_box.is_empty() {
            return true;
        }
        self.attribute("style").is_some_and(style_hides)
    }
}

/// Inline `display:none` or `visibility:hidden`.
fn style_hides(style: &str) -> bool {
    style.split(';').any(|decl| {
        let Some((prop, value)) = decl.split_once(':') else {
            return false;
        };
        let prop = prop.trim().to_ascii_lowercase();
        let value = value.trim().to_ascii_lowercase();
        let value = value.trim_end_matches("!important").trim();
        (prop == "display" && value == "none") || (prop == "visibility" && value == "hidden")
    })
}

impl DomNode {
    pub(crate) fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(el) => Some(el),
            _ => None,
        }
    }

    pub(crate) fn element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.data {
            NodeData::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match &self.data {
            NodeData::Text(t) => Some(t),
            _ => None,
        }
    }

    pub(crate) fn can_hold_children(&self) -> bool {
        !matches!(self.data, NodeData::Text(_))
    }

    pub(crate) fn child_position(&self, child: NodeId) -> Option<usize> {
        self.children.iter().position(|c| *c == child)
    }
}

/// Length in chars.
pub(crate) fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Split at a char offset; offsets past the end split at the end.
pub(crate) fn split_chars(s: &str, offset: usize) -> (&str, &str) {
    let idx = s
        .char_indices()
        .nth(offset)
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    s.split_at(idx)
}

/// Chars `[start, end)` of `s`.
pub(crate) fn slice_chars(s: &str, start: usize, end: usize) -> String {
    s.chars().skip(start).take(end.saturating_sub(start)).collect()
}
