//! In-memory document host.
//!
//! `PageDocument` is an arena-backed DOM implementing the page abstraction.
//! It loads HTML snapshots through `scraper`, answers a CSS selector subset,
//! derives visibility from `hidden`, inline styles and bounding boxes, and
//! records dispatched events and copy commands for inspection.

mod clipboard;
mod dom_node;
mod dom_tree;
mod dom_types;
mod error;
mod html;
mod inspector;
mod mutator;
mod selector;

pub use clipboard::MemoryClipboard;
pub use dom_tree::PageDocument;
pub use dom_types::{BoundingBox, DispatchedEvent, DomNode, ElementData, NodeData};
pub use error::DomError;
pub use selector::SelectorList;

#[cfg(test)]
#[path = "dom_tests.rs"]
mod tests;
