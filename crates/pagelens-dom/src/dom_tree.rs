//! PageDocument: arena storage, builders, traversal.

use pagelens_protocols::{
    BoundaryPoint, DomRange, GlobalScope, NodeId, PageLocation, ReadyState, ResourceTiming,
};

use crate::dom_node::{char_len, slice_chars};
use crate::error::DomError;
use crate::selector::SelectorList;
use crate::{BoundingBox, DispatchedEvent, DomNode, ElementData, NodeData};

/// Arena-backed document.
///
/// Node ids index the arena and stay valid after removal; removed subtrees
/// are simply disconnected.
#[derive(Debug)]
pub struct PageDocument {
    pub(crate) nodes: Vec<DomNode>,
    pub(crate) location: PageLocation,
    pub(crate) ready_state: ReadyState,
    pub(crate) active: Option<NodeId>,
    pub(crate) selection: Option<DomRange>,
    pub(crate) resource_timings: Vec<ResourceTiming>,
    pub(crate) now_ms: f64,
    pub(crate) events: Vec<DispatchedEvent>,
    pub(crate) copies: Vec<String>,
    pub(crate) copy_enabled: bool,
    /// Hookable globals of this page.
    pub globals: GlobalScope,
}

impl PageDocument {
    /// Empty document with `html`, `head` and `body`.
    pub fn new(href: &str) -> Self {
        let mut doc = Self::bare(href);
        let document = doc.document_id();
        let html = doc.push_node(DomNode::new(NodeData::Element(ElementData::new("html"))));
        doc.attach(document, html);
        let head = doc.push_node(DomNode::new(NodeData::Element(ElementData::new("head"))));
        doc.attach(html, head);
        let body = doc.push_node(DomNode::new(NodeData::Element(ElementData::new("body"))));
        doc.attach(html, body);
        doc
    }

    /// Document node only.
    pub(crate) fn bare(href: &str) -> Self {
        Self {
            nodes: vec![DomNode::new(NodeData::Document)],
            location: PageLocation {
                href: href.to_string(),
                title: String::new(),
            },
            ready_state: ReadyState::Complete,
            active: None,
            selection: None,
            resource_timings: Vec::new(),
            now_ms: 0.0,
            events: Vec::new(),
            copies: Vec::new(),
            copy_enabled: true,
            globals: GlobalScope::default(),
        }
    }

    pub(crate) fn document_id(&self) -> NodeId {
        NodeId::new(0)
    }

    pub fn node(&self, id: NodeId) -> Option<&DomNode> {
        self.nodes.get(id.index())
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut DomNode> {
        self.nodes.get_mut(id.index())
    }

    pub(crate) fn try_node(&self, id: NodeId) -> Result<&DomNode, DomError> {
        self.node(id).ok_or(DomError::UnknownNode(id))
    }

    pub fn element_data(&self, id: NodeId) -> Option<&ElementData> {
        self.node(id).and_then(DomNode::element)
    }

    pub(crate) fn element_data_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.node_mut(id).and_then(DomNode::element_mut)
    }

    pub(crate) fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.node(id)?.parent?;
        self.element_data(parent).map(|_| parent)
    }

    pub(crate) fn push_node(&mut self, node: DomNode) -> NodeId {
        self.nodes.push(node);
        NodeId::new(self.nodes.len() - 1)
    }

    /// Append `child` to `parent` without validation.
    pub(crate) fn attach(&mut self, parent: NodeId, child: NodeId) {
        if let Some(node) = self.node_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.node_mut(parent) {
            node.children.push(child);
        }
    }

    /// Insert `child` into `parent` at `index` without validation.
    pub(crate) fn attach_at(&mut self, parent: NodeId, index: usize, child: NodeId) {
        if let Some(node) = self.node_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.node_mut(parent) {
            let index = index.min(node.children.len());
            node.children.insert(index, child);
        }
    }

    pub(crate) fn detach(&mut self, child: NodeId) {
        let Some(parent) = self.node(child).and_then(|n| n.parent) else {
            return;
        };
        if let Some(node) = self.node_mut(parent) {
            node.children.retain(|c| *c != child);
        }
        if let Some(node) = self.node_mut(child) {
            node.parent = None;
        }
    }

    pub(crate) fn connected(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == self.document_id() {
                return true;
            }
            current = self.node(node).and_then(|n| n.parent);
        }
        false
    }

    /// Preorder traversal of `root`, including `root`.
    pub(crate) fn preorder(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.node(id) else {
                continue;
            };
            out.push(id);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    pub(crate) fn compile(&self, selector: &str) -> Result<SelectorList, DomError> {
        Ok(SelectorList::parse(selector)?)
    }

    // --- builders ---

    /// Append a new element under `parent`.
    pub fn append_element(
        &mut self,
        parent: NodeId,
        tag: &str,
        attributes: &[(&str, &str)],
    ) -> Result<NodeId, DomError> {
        if !self.try_node(parent)?.can_hold_children() {
            return Err(DomError::NotAContainer(parent));
        }
        let mut data = ElementData::new(tag);
        for (name, value) in attributes {
            data.set_attribute(name, value);
        }
        if data.tag == "input" || data.tag == "textarea" {
            data.value = Some(data.attribute("value").unwrap_or_default().to_string());
        }
        let id = self.push_node(DomNode::new(NodeData::Element(data)));
        self.attach(parent, id);
        Ok(id)
    }

    /// Append a text node under `parent`.
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> Result<NodeId, DomError> {
        if !self.try_node(parent)?.can_hold_children() {
            return Err(DomError::NotAContainer(parent));
        }
        let id = self.push_node(DomNode::new(NodeData::Text(text.to_string())));
        self.attach(parent, id);
        if let Some(el) = self.element_data_mut(parent) {
            if el.tag == "textarea" {
                el.value.get_or_insert_with(String::new).push_str(text);
            }
        }
        Ok(id)
    }

    /// First element matching `selector`.
    pub fn find(&self, selector: &str) -> Result<NodeId, DomError> {
        let compiled = self.compile(selector)?;
        self.preorder(self.document_id())
            .into_iter()
            .find(|id| compiled.matches(self, *id))
            .ok_or_else(|| DomError::NoMatch(selector.to_string()))
    }

    pub fn set_title(&mut self, title: &str) {
        self.location.title = title.to_string();
    }

    pub fn set_ready_state(&mut self, state: ReadyState) {
        self.ready_state = state;
    }

    pub fn set_bounding_box(&mut self, node: NodeId, bbox: BoundingBox) -> Result<(), DomError> {
        let el = self
            .element_data_mut(node)
            .ok_or(DomError::UnknownNode(node))?;
        el.bounding_box = bbox;
        Ok(())
    }

    pub fn push_resource_timing(&mut self, entry: ResourceTiming) {
        self.resource_timings.push(entry);
    }

    pub fn set_performance_now(&mut self, now_ms: f64) {
        self.now_ms = now_ms;
    }

    /// Select chars `[start, end)` of a single text node.
    pub fn select_text(&mut self, node: NodeId, start: usize, end: usize) -> Result<(), DomError> {
        let text = self.try_node(node)?.text().ok_or(DomError::NotAText(node))?;
        let len = char_len(text);
        for offset in [start, end] {
            if offset > len {
                return Err(DomError::OffsetOutOfBounds { node, offset, len });
            }
        }
        self.selection = Some(DomRange::new(
            BoundaryPoint::new(node, start.min(end)),
            BoundaryPoint::new(node, start.max(end)),
        ));
        Ok(())
    }

    /// Select an arbitrary range.
    pub fn select_range(&mut self, range: DomRange) -> Result<(), DomError> {
        self.check_boundary(range.start)?;
        self.check_boundary(range.end)?;
        self.selection = Some(range);
        Ok(())
    }

    /// Set the selection of a text control without focusing it.
    pub fn set_input_selection(
        &mut self,
        node: NodeId,
        start: usize,
        end: usize,
    ) -> Result<(), DomError> {
        let el = self
            .element_data_mut(node)
            .ok_or(DomError::UnknownNode(node))?;
        let len = el.value.as_deref().map(char_len).unwrap_or(0);
        for offset in [start, end] {
            if offset > len {
                return Err(DomError::OffsetOutOfBounds { node, offset, len });
            }
        }
        el.selection = Some((start.min(end), start.max(end)));
        Ok(())
    }

    /// Disable the copy command, as a page without clipboard access would.
    pub fn set_copy_enabled(&mut self, enabled: bool) {
        self.copy_enabled = enabled;
    }

    /// Events dispatched so far, oldest first.
    pub fn events(&self) -> &[DispatchedEvent] {
        &self.events
    }

    /// Texts copied through the copy command.
    pub fn copies(&self) -> &[String] {
        &self.copies
    }

    pub(crate) fn check_boundary(&self, point: BoundaryPoint) -> Result<(), DomError> {
        let node = self.try_node(point.node)?;
        let len = match node.text() {
            Some(text) => char_len(text),
            None => node.children.len(),
        };
        if point.offset > len {
            return Err(DomError::OffsetOutOfBounds {
                node: point.node,
                offset: point.offset,
                len,
            });
        }
        Ok(())
    }

    // --- flat text positions ---

    /// Connected text nodes in document order with their starting flat offset.
    pub(crate) fn text_layout(&self) -> Vec<(NodeId, usize, usize)> {
        let mut out = Vec::new();
        let mut offset = 0;
        for id in self.preorder(self.document_id()) {
            if let Some(text) = self.node(id).and_then(DomNode::text) {
                let len = char_len(text);
                out.push((id, offset, len));
                offset += len;
            }
        }
        out
    }

    /// Flat char offset of a boundary point over the whole document's text.
    pub(crate) fn flat_offset(&self, point: BoundaryPoint) -> Option<usize> {
        let layout = self.text_layout();
        let total = layout.last().map(|(_, start, len)| start + len).unwrap_or(0);

        let node = self.node(point.node)?;
        if node.text().is_some() {
            return layout
                .iter()
                .find(|(id, _, _)| *id == point.node)
                .map(|(_, start, len)| start + point.offset.min(*len));
        }

        // Element boundary: before child `offset`, or after the last child.
        let order = self.preorder(self.document_id());
        let position_of = |id: NodeId| order.iter().position(|n| *n == id);
        let threshold = match node.children.get(point.offset) {
            Some(child) => position_of(*child)?,
            None => {
                let last = self.preorder(point.node).last().copied()?;
                position_of(last)? + 1
            }
        };
        Some(
            layout
                .iter()
                .find(|(id, _, _)| position_of(*id).is_some_and(|p| p >= threshold))
                .map(|(_, start, _)| *start)
                .unwrap_or(total),
        )
    }

    /// Text covered by `range`.
    pub(crate) fn range_text(&self, range: &DomRange) -> String {
        let (Some(start), Some(end)) = (self.flat_offset(range.start), self.flat_offset(range.end))
        else {
            return String::new();
        };
        let (start, end) = (start.min(end), start.max(end));
        let mut out = String::new();
        for (id, node_start, len) in self.text_layout() {
            let node_end = node_start + len;
            if node_end <= start || node_start >= end {
                continue;
            }
            if let Some(text) = self.node(id).and_then(DomNode::text) {
                let from = start.saturating_sub(node_start);
                let to = (end - node_start).min(len);
                out.push_str(&slice_chars(text, from, to));
            }
        }
        out
    }
}
