//! PageInspector implementation.

use pagelens_protocols::{
    LiveSelection, NodeId, PageError, PageInspector, PageLocation, ReadyState, ResourceTiming,
};

use crate::dom_node::char_len;
use crate::dom_tree::PageDocument;
use crate::selector::SelectorList;
use crate::NodeData;

/// Elements that break inline text runs.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "dialog", "div", "dl", "dt",
    "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6",
    "header", "hr", "li", "main", "nav", "ol", "option", "p", "pre", "section", "table", "td",
    "th", "tr", "ul",
];

impl PageDocument {
    fn self_hidden(&self, id: NodeId) -> bool {
        self.element_data(id).is_some_and(|el| el.hides_itself())
    }

    fn render_text(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.node(id) else {
            return;
        };
        match &node.data {
            NodeData::Text(text) => out.push_str(text),
            NodeData::Document => {
                for child in &node.children {
                    self.render_text(*child, out);
                }
            }
            NodeData::Element(el) => {
                if el.hides_itself() {
                    return;
                }
                let block = BLOCK_TAGS.contains(&el.tag.as_str());
                if block {
                    out.push(' ');
                }
                for child in &node.children {
                    self.render_text(*child, out);
                }
                if block {
                    out.push(' ');
                }
            }
        }
    }
}

impl PageInspector for PageDocument {
    fn location(&self) -> PageLocation {
        self.location.clone()
    }

    fn ready_state(&self) -> ReadyState {
        self.ready_state
    }

    fn document(&self) -> NodeId {
        self.document_id()
    }

    fn body(&self) -> Option<NodeId> {
        self.preorder(self.document_id())
            .into_iter()
            .find(|id| self.element_data(*id).is_some_and(|el| el.tag == "body"))
    }

    fn query_within(&self, root: NodeId, selector: &str) -> Result<Vec<NodeId>, PageError> {
        if self.node(root).is_none() {
            return Err(PageError::NodeNotFound(root));
        }
        let compiled = SelectorList::parse(selector)?;
        Ok(self
            .preorder(root)
            .into_iter()
            .skip(1)
            .filter(|id| compiled.matches(self, *id))
            .collect())
    }

    fn matches(&self, node: NodeId, selector: &str) -> Result<bool, PageError> {
        if self.node(node).is_none() {
            return Err(PageError::NodeNotFound(node));
        }
        Ok(SelectorList::parse(selector)?.matches(self, node))
    }

    fn is_connected(&self, node: NodeId) -> bool {
        self.connected(node)
    }

    fn tag_name(&self, node: NodeId) -> Option<String> {
        self.element_data(node).map(|el| el.tag.clone())
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.element_data(node)
            .and_then(|el| el.attribute(name))
            .map(str::to_string)
    }

    fn attribute_names(&self, node: NodeId) -> Vec<String> {
        self.element_data(node)
            .map(|el| el.attributes.iter().map(|(k, _)| k.clone()).collect())
            .unwrap_or_default()
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node)?.parent
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.node(node)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    fn text_data(&self, node: NodeId) -> Option<String> {
        self.node(node)?.text().map(str::to_string)
    }

    fn text_content(&self, node: NodeId) -> String {
        self.collect_text(node)
    }

    fn inner_text(&self, node: NodeId) -> String {
        if !self.is_visible(node) {
            return String::new();
        }
        let mut raw = String::new();
        self.render_text(node, &mut raw);
        raw.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    fn outer_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.serialize(node, &mut out);
        out
    }

    fn is_visible(&self, node: NodeId) -> bool {
        if !self.connected(node) {
            return false;
        }
        let mut current = Some(node);
        while let Some(id) = current {
            if self.self_hidden(id) {
                return false;
            }
            current = self.node(id).and_then(|n| n.parent);
        }
        true
    }

    fn active_element(&self) -> Option<NodeId> {
        self.active
            .filter(|id| self.connected(*id))
            .or_else(|| self.body())
    }

    fn selection(&self) -> Option<LiveSelection> {
        let range = self.selection?;
        if !self.connected(range.start.node) || !self.connected(range.end.node) {
            return None;
        }
        Some(LiveSelection {
            range: Some(range),
            text: self.range_text(&range),
        })
    }

    fn value(&self, node: NodeId) -> Option<String> {
        self.element_data(node)?.value.clone()
    }

    fn selection_range(&self, node: NodeId) -> Option<(usize, usize)> {
        let el = self.element_data(node)?;
        if !el.is_text_control() {
            return None;
        }
        let len = el.value.as_deref().map(char_len).unwrap_or(0);
        Some(el.selection.unwrap_or((len, len)))
    }

    fn resource_timings(&self) -> Vec<ResourceTiming> {
        self.resource_timings.clone()
    }

    fn performance_now(&self) -> f64 {
        self.now_ms
    }
}
