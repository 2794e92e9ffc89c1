//! Selection detection and the editability rules shared with replacement.

mod editable;
mod text_map;
mod tracker;

pub use editable::{contenteditable_host, element_is_editable, element_kind, is_editable};
pub use text_map::TextMap;
pub use tracker::SelectionTracker;
