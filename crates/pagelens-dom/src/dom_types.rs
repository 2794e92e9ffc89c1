//! DOM type definitions: BoundingBox, ElementData, NodeData, DomNode.

use pagelens_protocols::{DomEvent, NodeId};
use serde::{Deserialize, Serialize};

/// Rendered box of an element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for BoundingBox {
    /// Every element renders at a nominal size until told otherwise.
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: 20.0,
        }
    }
}

/// Element payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementData {
    /// Tag name (lowercase).
    pub tag: String,
    /// Attributes in source order, names lowercase.
    pub attributes: Vec<(String, String)>,
    /// Live value of a form control, independent of the `value` attribute.
    pub value: Option<String>,
    /// Selection of a text control.
    pub selection: Option<(usize, usize)>,
    pub bounding_box: BoundingBox,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeData {
    Document,
    Element(ElementData),
    Text(String),
}

/// Arena slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomNode {
    pub data: NodeData,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

/// An event recorded by `dispatch_event`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchedEvent {
    pub target: NodeId,
    pub event: DomEvent,
}
