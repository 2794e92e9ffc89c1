//! In-memory clipboard.

use pagelens_protocols::{Clipboard, PageError};

/// Records every successful write; refuses all writes when not permitted.
#[derive(Debug, Clone)]
pub struct MemoryClipboard {
    permitted: bool,
    writes: Vec<String>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self {
            permitted: true,
            writes: Vec::new(),
        }
    }

    /// A clipboard whose permission prompt was declined.
    pub fn denied() -> Self {
        Self {
            permitted: false,
            writes: Vec::new(),
        }
    }

    pub fn writes(&self) -> &[String] {
        &self.writes
    }

    pub fn last(&self) -> Option<&str> {
        self.writes.last().map(String::as_str)
    }
}

impl Default for MemoryClipboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Clipboard for MemoryClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), PageError> {
        if !self.permitted {
            return Err(PageError::Clipboard("write permission denied".to_string()));
        }
        self.writes.push(text.to_string());
        Ok(())
    }
}
