//! HTML loading (via `scraper`) and serialization.

use pagelens_protocols::NodeId;
use scraper::{ElementRef, Html, Node};
use tracing::debug;

use crate::dom_node::VOID_TAGS;
use crate::dom_tree::PageDocument;
use crate::{DomNode, ElementData, NodeData};

/// Elements whose text children are serialized verbatim.
const RAW_TEXT_TAGS: &[&str] = &["script", "style"];

impl PageDocument {
    /// Parse a full HTML document.
    pub fn from_html(html: &str, href: &str) -> Self {
        let parsed = Html::parse_document(html);
        let mut doc = Self::bare(href);
        let document = doc.document_id();
        doc.load_element(document, parsed.root_element());

        let title = doc
            .preorder(document)
            .into_iter()
            .find(|id| doc.element_data(*id).is_some_and(|el| el.tag == "title"))
            .map(|id| doc.collect_text(id))
            .unwrap_or_default();
        doc.location.title = title.split_whitespace().collect::<Vec<_>>().join(" ");

        debug!(nodes = doc.nodes.len(), href, "Loaded HTML document");
        doc
    }

    fn load_element(&mut self, parent: NodeId, element: ElementRef<'_>) {
        let source = element.value();
        let mut data = ElementData::new(source.name());
        for (name, value) in source.attrs() {
            data.set_attribute(name, value);
        }
        if data.tag == "input" {
            data.value = Some(data.attribute("value").unwrap_or_default().to_string());
        }
        let id = self.push_node(DomNode::new(NodeData::Element(data)));
        self.attach(parent, id);

        for child in element.children() {
            match child.value() {
                Node::Element(_) => {
                    if let Some(child_el) = ElementRef::wrap(child) {
                        self.load_element(id, child_el);
                    }
                }
                Node::Text(text) => {
                    let data = NodeData::Text(String::from(&**text));
                    let text_id = self.push_node(DomNode::new(data));
                    self.attach(id, text_id);
                }
                _ => {}
            }
        }

        let is_textarea = self.element_data(id).is_some_and(|el| el.tag == "textarea");
        if is_textarea {
            let value = self.collect_text(id);
            if let Some(el) = self.element_data_mut(id) {
                el.value = Some(value);
            }
        }
    }

    /// Concatenated text of every descendant text node.
    pub(crate) fn collect_text(&self, root: NodeId) -> String {
        self.preorder(root)
            .into_iter()
            .filter_map(|id| self.node(id).and_then(DomNode::text))
            .collect()
    }

    pub(crate) fn serialize(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.node(id) else {
            return;
        };
        match &node.data {
            NodeData::Document => {
                for child in &node.children {
                    self.serialize(*child, out);
                }
            }
            NodeData::Text(text) => {
                let raw = node
                    .parent
                    .and_then(|p| self.element_data(p))
                    .is_some_and(|el| RAW_TEXT_TAGS.contains(&el.tag.as_str()));
                if raw {
                    out.push_str(text);
                } else {
                    escape_text(text, out);
                }
            }
            NodeData::Element(el) => {
                out.push('<');
                out.push_str(&el.tag);
                for (name, value) in &el.attributes {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    escape_attribute(value, out);
                    out.push('"');
                }
                out.push('>');
                if VOID_TAGS.contains(&el.tag.as_str()) {
                    return;
                }
                for child in &node.children {
                    self.serialize(*child, out);
                }
                out.push_str("</");
                out.push_str(&el.tag);
                out.push('>');
            }
        }
    }
}

fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
}

fn escape_attribute(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
}
