//! Page abstraction: the capability every engine component reads and mutates
//! the document through.
//!
//! A browser host backs these traits with the live DOM; tests and the CLI back
//! them with an in-memory document. Node handles are opaque and only valid for
//! the page that issued them.

use serde::{Deserialize, Serialize};

use crate::error::PageError;

/// Opaque handle to a node of one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(usize);

impl NodeId {
    pub fn new(raw: usize) -> Self {
        Self(raw)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

/// Where the page is and what it calls itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLocation {
    pub href: String,
    pub title: String,
}

/// Document loading state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadyState {
    Loading,
    Interactive,
    Complete,
}

/// A position inside a node: a char offset for text nodes, a child index for
/// elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundaryPoint {
    pub node: NodeId,
    pub offset: usize,
}

impl BoundaryPoint {
    pub fn new(node: NodeId, offset: usize) -> Self {
        Self { node, offset }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomRange {
    pub start: BoundaryPoint,
    pub end: BoundaryPoint,
}

impl DomRange {
    pub fn new(start: BoundaryPoint, end: BoundaryPoint) -> Self {
        Self { start, end }
    }

    pub fn collapsed(at: BoundaryPoint) -> Self {
        Self { start: at, end: at }
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }
}

/// The browser's current document selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveSelection {
    /// First range of the selection, if any.
    pub range: Option<DomRange>,
    /// Text the selection covers.
    pub text: String,
}

impl LiveSelection {
    pub fn is_collapsed(&self) -> bool {
        self.range.is_none_or(|r| r.is_collapsed())
    }
}

/// One resource-timing entry as exposed by the page's performance timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceTiming {
    pub name: String,
    pub initiator_type: String,
    pub start_time_ms: f64,
    pub duration_ms: f64,
    pub transfer_size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_status: Option<u16>,
}

/// Synthetic events dispatched after a mutation so host frameworks notice it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomEvent {
    Input,
    Change,
    KeyUp,
}

impl DomEvent {
    pub fn name(self) -> &'static str {
        match self {
            DomEvent::Input => "input",
            DomEvent::Change => "change",
            DomEvent::KeyUp => "keyup",
        }
    }
}

/// Read-only view of a document.
pub trait PageInspector {
    fn location(&self) -> PageLocation;

    fn ready_state(&self) -> ReadyState;

    /// The document node; parent of the root element.
    fn document(&self) -> NodeId;

    fn body(&self) -> Option<NodeId>;

    /// Descendants of `root` (excluding `root`) matching `selector`, in
    /// document order, without duplicates.
    fn query_within(&self, root: NodeId, selector: &str) -> Result<Vec<NodeId>, PageError>;

    fn matches(&self, node: NodeId, selector: &str) -> Result<bool, PageError>;

    fn is_connected(&self, node: NodeId) -> bool;

    /// Lowercase tag name; `None` for non-element nodes.
    fn tag_name(&self, node: NodeId) -> Option<String>;

    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;

    fn attribute_names(&self, node: NodeId) -> Vec<String>;

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    fn children(&self, node: NodeId) -> Vec<NodeId>;

    /// Character data of a text node; `None` for other nodes.
    fn text_data(&self, node: NodeId) -> Option<String>;

    /// Concatenated data of all descendant text nodes.
    fn text_content(&self, node: NodeId) -> String;

    /// Rendered text: visible descendants only, whitespace collapsed.
    fn inner_text(&self, node: NodeId) -> String;

    fn outer_html(&self, node: NodeId) -> String;

    /// Non-zero rendered size and not hidden by CSS (own or inherited).
    fn is_visible(&self, node: NodeId) -> bool;

    fn active_element(&self) -> Option<NodeId>;

    fn selection(&self) -> Option<LiveSelection>;

    /// Current value of a form control.
    fn value(&self, node: NodeId) -> Option<String>;

    /// `[selectionStart, selectionEnd)` of a form control.
    fn selection_range(&self, node: NodeId) -> Option<(usize, usize)>;

    fn resource_timings(&self) -> Vec<ResourceTiming>;

    /// Milliseconds since navigation start.
    fn performance_now(&self) -> f64;

    fn query_all(&self, selector: &str) -> Result<Vec<NodeId>, PageError> {
        self.query_within(self.document(), selector)
    }

    fn query_first(&self, selector: &str) -> Result<Option<NodeId>, PageError> {
        Ok(self.query_all(selector)?.into_iter().next())
    }

    /// Element ancestors of `node`, nearest first, excluding the document.
    fn ancestors(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = self.parent(node);
        while let Some(id) = current {
            if self.tag_name(id).is_none() {
                break;
            }
            out.push(id);
            current = self.parent(id);
        }
        out
    }

    /// Whether `node` is `ancestor` or one of its descendants.
    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        if ancestor == node {
            return true;
        }
        let mut current = self.parent(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Nearest element, starting at `node` itself, satisfying `predicate`.
    fn closest(&self, node: NodeId, predicate: &dyn Fn(NodeId) -> bool) -> Option<NodeId> {
        if self.tag_name(node).is_some() && predicate(node) {
            return Some(node);
        }
        self.ancestors(node).into_iter().find(|id| predicate(*id))
    }

    fn class_list(&self, node: NodeId) -> Vec<String> {
        self.attribute(node, "class")
            .map(|c| c.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Text nodes under `root` in document order.
    fn text_nodes_within(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if self.text_data(id).is_some() {
                out.push(id);
                continue;
            }
            let children = self.children(id);
            stack.extend(children.into_iter().rev());
        }
        out
    }
}

/// The mutations the engine is allowed to perform on a page.
pub trait PageMutator: PageInspector {
    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), PageError>;

    fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<(), PageError>;

    fn set_value(&mut self, node: NodeId, value: &str) -> Result<(), PageError>;

    fn set_selection_range(&mut self, node: NodeId, start: usize, end: usize)
    -> Result<(), PageError>;

    /// Replace the document selection; `None` clears it.
    fn set_selection(&mut self, range: Option<DomRange>) -> Result<(), PageError>;

    /// Delete the contents of `range` and insert `text` at its start.
    /// Returns the inserted text node.
    fn replace_range(&mut self, range: &DomRange, text: &str) -> Result<NodeId, PageError>;

    /// Merge adjacent text nodes and drop empty ones under `node`.
    fn normalize(&mut self, node: NodeId) -> Result<(), PageError>;

    fn dispatch_event(&mut self, node: NodeId, event: DomEvent) -> Result<(), PageError>;

    fn create_element(&mut self, tag: &str) -> NodeId;

    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), PageError>;

    fn remove_node(&mut self, node: NodeId) -> Result<(), PageError>;

    fn focus(&mut self, node: NodeId) -> Result<(), PageError>;

    /// Run the document copy command on the current selection.
    /// Returns whether the command reported success.
    fn exec_copy(&mut self) -> Result<bool, PageError>;
}

/// Modern clipboard access.
pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> Result<(), PageError>;
}
