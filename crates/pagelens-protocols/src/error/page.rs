//! Page access errors.

use thiserror::Error;

use crate::page::NodeId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageError {
    #[error("Invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("Node not found: {0:?}")]
    NodeNotFound(NodeId),

    #[error("Node is detached from the document: {0:?}")]
    Detached(NodeId),

    #[error("Node is not an element: {0:?}")]
    NotAnElement(NodeId),

    #[error("Invalid range: {0}")]
    InvalidRange(String),

    #[error("Unsupported range: {0}")]
    UnsupportedRange(String),

    #[error("Clipboard unavailable: {0}")]
    Clipboard(String),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_selector_display() {
        let err = PageError::InvalidSelector {
            selector: "[role=".to_string(),
            reason: "unterminated attribute".to_string(),
        };
        let display = err.to_string();
        assert!(display.contains("[role="));
        assert!(display.contains("unterminated"));
    }

    #[test]
    fn test_detached_display() {
        let err = PageError::Detached(NodeId::new(7));
        assert!(err.to_string().contains("detached"));
    }

    #[test]
    fn test_clipboard_display() {
        let err = PageError::Clipboard("permission denied".to_string());
        assert!(err.to_string().contains("permission denied"));
    }
}
