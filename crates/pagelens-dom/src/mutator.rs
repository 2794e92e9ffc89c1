//! PageMutator implementation.

use pagelens_protocols::{
    BoundaryPoint, DomEvent, DomRange, NodeId, PageError, PageInspector, PageMutator,
};
use tracing::{debug, trace};

use crate::dom_node::{char_len, slice_chars, split_chars};
use crate::dom_tree::PageDocument;
use crate::{DispatchedEvent, DomNode, ElementData, NodeData};

impl PageDocument {
    fn require_element(&mut self, node: NodeId) -> Result<&mut ElementData, PageError> {
        let slot = self
            .node_mut(node)
            .ok_or(PageError::NodeNotFound(node))?;
        slot.element_mut().ok_or(PageError::NotAnElement(node))
    }

    fn text_of(&self, node: NodeId) -> Result<String, PageError> {
        self.node(node)
            .ok_or(PageError::NodeNotFound(node))?
            .text()
            .map(str::to_string)
            .ok_or_else(|| {
                PageError::UnsupportedRange(format!("{node:?} is not a text node"))
            })
    }

    fn set_text(&mut self, node: NodeId, text: String) {
        if let Some(slot) = self.node_mut(node) {
            slot.data = NodeData::Text(text);
        }
    }

    fn insert_text_after(&mut self, anchor: NodeId, text: &str) -> Result<NodeId, PageError> {
        let parent = self
            .node(anchor)
            .and_then(|n| n.parent)
            .ok_or(PageError::Detached(anchor))?;
        let index = self
            .node(parent)
            .and_then(|p| p.child_position(anchor))
            .ok_or(PageError::Detached(anchor))?;
        let id = self.push_node(DomNode::new(NodeData::Text(text.to_string())));
        self.attach_at(parent, index + 1, id);
        Ok(id)
    }

    /// Move selection endpoints that reference `from`.
    fn remap_selection(&mut self, from: NodeId, to: impl Fn(usize) -> BoundaryPoint) {
        if let Some(range) = self.selection.as_mut() {
            for point in [&mut range.start, &mut range.end] {
                if point.node == from {
                    *point = to(point.offset);
                }
            }
        }
    }

    fn normalize_children(&mut self, parent: NodeId) {
        let Some(children) = self.node(parent).map(|n| n.children.clone()) else {
            return;
        };
        let mut kept = Vec::with_capacity(children.len());
        let mut removed = Vec::new();
        let mut last_text: Option<NodeId> = None;

        for child in children {
            let Some(text) = self.node(child).and_then(DomNode::text).map(str::to_string) else {
                kept.push(child);
                last_text = None;
                continue;
            };
            match last_text {
                _ if text.is_empty() => {
                    let target = match last_text {
                        Some(prev) => {
                            let len = self.node(prev).and_then(DomNode::text).map(char_len);
                            BoundaryPoint::new(prev, len.unwrap_or(0))
                        }
                        None => BoundaryPoint::new(parent, kept.len()),
                    };
                    self.remap_selection(child, |_| target);
                    removed.push(child);
                }
                Some(prev) => {
                    let mut merged = self
                        .node(prev)
                        .and_then(DomNode::text)
                        .unwrap_or_default()
                        .to_string();
                    let shift = char_len(&merged);
                    merged.push_str(&text);
                    self.set_text(prev, merged);
                    self.remap_selection(child, |offset| BoundaryPoint::new(prev, shift + offset));
                    removed.push(child);
                }
                None => {
                    kept.push(child);
                    last_text = Some(child);
                }
            }
        }

        for id in removed {
            if let Some(node) = self.node_mut(id) {
                node.parent = None;
            }
        }
        if let Some(node) = self.node_mut(parent) {
            node.children = kept;
        }
    }

    fn text_control_selection(&self, node: NodeId) -> Option<String> {
        let el = self.element_data(node)?;
        if !el.is_text_control() {
            return None;
        }
        let (start, end) = el.selection?;
        let value = el.value.as_deref()?;
        Some(slice_chars(value, start, end))
    }
}

impl PageMutator for PageDocument {
    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), PageError> {
        self.require_element(node)?.set_attribute(name, value);
        Ok(())
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<(), PageError> {
        self.require_element(node)?.remove_attribute(name);
        Ok(())
    }

    fn set_value(&mut self, node: NodeId, value: &str) -> Result<(), PageError> {
        let el = self.require_element(node)?;
        if el.value.is_none() {
            return Err(PageError::OperationFailed(format!(
                "<{}> has no value",
                el.tag
            )));
        }
        let len = char_len(value);
        el.value = Some(value.to_string());
        el.selection = Some((len, len));
        Ok(())
    }

    fn set_selection_range(
        &mut self,
        node: NodeId,
        start: usize,
        end: usize,
    ) -> Result<(), PageError> {
        let el = self.require_element(node)?;
        if !el.is_text_control() {
            return Err(PageError::OperationFailed(format!(
                "<{}> does not support selection",
                el.tag
            )));
        }
        let len = el.value.as_deref().map(char_len).unwrap_or(0);
        let end = end.min(len);
        el.selection = Some((start.min(end), end));
        Ok(())
    }

    fn set_selection(&mut self, range: Option<DomRange>) -> Result<(), PageError> {
        match range {
            None => self.selection = None,
            Some(range) => {
                for point in [range.start, range.end] {
                    self.check_boundary(point)
                        .map_err(|e| PageError::InvalidRange(e.to_string()))?;
                }
                self.selection = Some(range);
            }
        }
        Ok(())
    }

    fn replace_range(&mut self, range: &DomRange, text: &str) -> Result<NodeId, PageError> {
        let (start, end) = (range.start, range.end);
        let start_text = self.text_of(start.node)?;
        let end_text = self.text_of(end.node)?;
        for node in [start.node, end.node] {
            if !self.connected(node) {
                return Err(PageError::Detached(node));
            }
        }
        if start.offset > char_len(&start_text) || end.offset > char_len(&end_text) {
            return Err(PageError::InvalidRange("offset past end of text".to_string()));
        }

        let inserted = if start.node == end.node {
            if start.offset > end.offset {
                return Err(PageError::InvalidRange("end precedes start".to_string()));
            }
            let (before, _) = split_chars(&start_text, start.offset);
            let (_, after) = split_chars(&start_text, end.offset);
            let after = after.to_string();
            self.set_text(start.node, before.to_string());
            let inserted = self.insert_text_after(start.node, text)?;
            if !after.is_empty() {
                self.insert_text_after(inserted, &after)?;
            }
            inserted
        } else {
            let order = self.preorder(self.document());
            let position = |id: NodeId| order.iter().position(|n| *n == id);
            let (Some(start_pos), Some(end_pos)) = (position(start.node), position(end.node))
            else {
                return Err(PageError::InvalidRange("endpoint not in document".to_string()));
            };
            if start_pos > end_pos {
                return Err(PageError::InvalidRange("end precedes start".to_string()));
            }
            // Ancestors of the end point are only partly covered and stay.
            let mut contained: Vec<NodeId> = Vec::new();
            for &id in &order[start_pos + 1..end_pos] {
                if self.contains(id, end.node) || contained.iter().any(|c| self.contains(*c, id)) {
                    continue;
                }
                contained.push(id);
            }
            for id in contained {
                self.remove_node(id)?;
            }
            let (before, _) = split_chars(&start_text, start.offset);
            let (_, after) = split_chars(&end_text, end.offset);
            self.set_text(start.node, before.to_string());
            self.set_text(end.node, after.to_string());
            self.insert_text_after(start.node, text)?
        };

        self.selection = Some(DomRange::collapsed(BoundaryPoint::new(
            inserted,
            char_len(text),
        )));
        debug!(?inserted, chars = char_len(text), "Replaced range");
        Ok(inserted)
    }

    fn normalize(&mut self, node: NodeId) -> Result<(), PageError> {
        if self.node(node).is_none() {
            return Err(PageError::NodeNotFound(node));
        }
        let containers: Vec<NodeId> = self
            .preorder(node)
            .into_iter()
            .filter(|id| self.node(*id).is_some_and(DomNode::can_hold_children))
            .collect();
        for parent in containers {
            self.normalize_children(parent);
        }
        Ok(())
    }

    fn dispatch_event(&mut self, node: NodeId, event: DomEvent) -> Result<(), PageError> {
        if self.node(node).is_none() {
            return Err(PageError::NodeNotFound(node));
        }
        trace!(?node, event = event.name(), "Dispatched event");
        self.events.push(DispatchedEvent {
            target: node,
            event,
        });
        Ok(())
    }

    fn create_element(&mut self, tag: &str) -> NodeId {
        let mut data = ElementData::new(tag);
        if data.tag == "input" || data.tag == "textarea" {
            data.value = Some(String::new());
        }
        self.push_node(DomNode::new(NodeData::Element(data)))
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), PageError> {
        let parent_node = self.node(parent).ok_or(PageError::NodeNotFound(parent))?;
        if !parent_node.can_hold_children() {
            return Err(PageError::OperationFailed(format!(
                "{parent:?} cannot hold children"
            )));
        }
        let child_node = self.node(child).ok_or(PageError::NodeNotFound(child))?;
        if matches!(child_node.data, NodeData::Document) || self.contains(child, parent) {
            return Err(PageError::OperationFailed(
                "append would create a cycle".to_string(),
            ));
        }
        self.detach(child);
        self.attach(parent, child);
        Ok(())
    }

    fn remove_node(&mut self, node: NodeId) -> Result<(), PageError> {
        if self.node(node).is_none() {
            return Err(PageError::NodeNotFound(node));
        }
        if node == self.document() {
            return Err(PageError::OperationFailed(
                "cannot remove the document".to_string(),
            ));
        }
        self.detach(node);
        if self.active.is_some_and(|a| !self.connected(a)) {
            self.active = None;
        }
        let selection_detached = self
            .selection
            .is_some_and(|r| !self.connected(r.start.node) || !self.connected(r.end.node));
        if selection_detached {
            self.selection = None;
        }
        Ok(())
    }

    fn focus(&mut self, node: NodeId) -> Result<(), PageError> {
        self.require_element(node)?;
        if !self.connected(node) {
            return Err(PageError::Detached(node));
        }
        self.active = Some(node);
        Ok(())
    }

    fn exec_copy(&mut self) -> Result<bool, PageError> {
        if !self.copy_enabled {
            return Ok(false);
        }
        let text = self
            .active
            .filter(|id| self.connected(*id))
            .and_then(|id| self.text_control_selection(id))
            .or_else(|| self.selection().map(|s| s.text))
            .unwrap_or_default();
        if text.is_empty() {
            return Ok(false);
        }
        self.copies.push(text);
        Ok(true)
    }
}
