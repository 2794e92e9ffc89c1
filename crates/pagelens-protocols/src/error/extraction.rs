//! Extraction pass errors.

use thiserror::Error;

use super::PageError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    #[error("Page access failed: {0}")]
    Page(#[from] PageError),

    #[error("Document has no body element")]
    MissingBody,

    #[error("Extraction failed: {0}")]
    Failed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_page_error() {
        let err: ExtractionError = PageError::OperationFailed("boom".to_string()).into();
        assert!(err.to_string().contains("Page access failed"));
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn test_missing_body_display() {
        assert!(ExtractionError::MissingBody.to_string().contains("no body"));
    }
}
