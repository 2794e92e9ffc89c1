//! Selection staleness and replacement errors.

use thiserror::Error;

use super::PageError;

/// Why a previously captured selection can no longer be used.
///
/// This is an expected outcome, not a fault: page script and the user may
/// change anything between capture and use.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StaleSelection {
    #[error("Selection context has no target element id")]
    MissingTargetId,

    #[error("Target element {0} is no longer in the document")]
    TargetGone(String),

    #[error("Target element is no longer editable")]
    NotEditable,

    #[error("Target element is a <{found}>, expected {expected}")]
    KindMismatch { expected: String, found: String },

    #[error("Selection in target element is empty")]
    SelectionCollapsed,

    #[error("Live selection is no longer inside the target element")]
    SelectionMoved,

    #[error("Selected text could not be located in the target element")]
    TextNotFound,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplaceError {
    #[error("Selection is stale: {0}")]
    Stale(#[from] StaleSelection),

    #[error("Element kind '{0}' does not support replacement")]
    Unsupported(String),

    #[error("Mutation failed: {0}")]
    Mutation(#[from] PageError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stale_wraps_into_replace_error() {
        let err: ReplaceError = StaleSelection::SelectionCollapsed.into();
        assert!(err.to_string().contains("stale"));
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_kind_mismatch_display() {
        let err = StaleSelection::KindMismatch {
            expected: "textarea".to_string(),
            found: "div".to_string(),
        };
        assert!(err.to_string().contains("<div>"));
        assert!(err.to_string().contains("textarea"));
    }

    #[test]
    fn test_mutation_from_page_error() {
        let err: ReplaceError = PageError::InvalidRange("offset past end".to_string()).into();
        assert!(matches!(err, ReplaceError::Mutation(_)));
    }
}
