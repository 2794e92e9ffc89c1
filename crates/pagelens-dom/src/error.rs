//! Document host errors.

use pagelens_protocols::{NodeId, PageError};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    #[error("Unknown node: {0:?}")]
    UnknownNode(NodeId),

    #[error("Node cannot hold children: {0:?}")]
    NotAContainer(NodeId),

    #[error("Node is not a text node: {0:?}")]
    NotAText(NodeId),

    #[error("Offset {offset} out of bounds for {node:?} (length {len})")]
    OffsetOutOfBounds {
        node: NodeId,
        offset: usize,
        len: usize,
    },

    #[error("No element matches '{0}'")]
    NoMatch(String),

    #[error(transparent)]
    Page(#[from] PageError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_error_display() {
        let err = DomError::OffsetOutOfBounds {
            node: NodeId::new(4),
            offset: 9,
            len: 3,
        };
        let display = err.to_string();
        assert!(display.contains("Offset 9"));
        assert!(display.contains("length 3"));
    }

    #[test]
    fn test_page_error_is_transparent() {
        let err = DomError::from(PageError::NodeNotFound(NodeId::new(1)));
        assert!(err.to_string().starts_with("Node not found"));
    }
}
