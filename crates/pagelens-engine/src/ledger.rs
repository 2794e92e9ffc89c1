//! Bookkeeping for one extraction pass: which fields were masked, which
//! sensitive categories fired, and which fields were cut to their cap.

use std::collections::BTreeSet;

use pagelens_protocols::{PrivacyInfo, SensitiveCategory};

use crate::redactor::{Redaction, Redactor};
use crate::util::truncate_chars;

/// Collects privacy and truncation notes while a payload is assembled.
///
/// Field names are dotted payload paths such as `text.errors[0].message`.
#[derive(Debug, Clone, Default)]
pub struct PayloadLedger {
    masking: bool,
    redacted_fields: Vec<String>,
    categories: BTreeSet<SensitiveCategory>,
    truncated_fields: Vec<String>,
}

impl PayloadLedger {
    pub fn new(masking: bool) -> Self {
        Self {
            masking,
            ..Self::default()
        }
    }

    pub fn masking(&self) -> bool {
        self.masking
    }

    /// Mask `text` when masking is on.
    pub fn mask(&mut self, field: &str, text: &str) -> String {
        if !self.masking {
            return text.to_string();
        }
        let redaction = Redactor::redact(text);
        self.absorb(field, redaction)
    }

    /// Mask markup when masking is on.
    pub fn mask_html(&mut self, field: &str, html: &str) -> String {
        if !self.masking {
            return html.to_string();
        }
        let redaction = Redactor::redact_html(html);
        let changed = redaction.text != html;
        let text = self.absorb(field, redaction);
        if changed {
            self.note_redacted(field);
        }
        text
    }

    /// Cap `text` at `max` chars, noting the field when it was cut.
    pub fn cap(&mut self, field: &str, text: &str, max: usize) -> (String, bool) {
        let (out, truncated) = truncate_chars(text, max);
        if truncated {
            self.note_truncated(field);
        }
        (out, truncated)
    }

    /// Mask, then cap. Masking first keeps a cut from splitting a secret.
    pub fn mask_capped(&mut self, field: &str, text: &str, max: usize) -> String {
        let masked = self.mask(field, text);
        self.cap(field, &masked, max).0
    }

    pub fn note_redacted(&mut self, field: &str) {
        if !self.redacted_fields.iter().any(|f| f == field) {
            self.redacted_fields.push(field.to_string());
        }
    }

    pub fn note_truncated(&mut self, field: &str) {
        if !self.truncated_fields.iter().any(|f| f == field) {
            self.truncated_fields.push(field.to_string());
        }
    }

    pub fn truncated_fields(&self) -> &[String] {
        &self.truncated_fields
    }

    pub fn privacy(&self) -> PrivacyInfo {
        PrivacyInfo {
            redacted_fields: self.redacted_fields.clone(),
            sensitive_data_types: self.categories.clone(),
            masking_applied: self.masking,
        }
    }

    fn absorb(&mut self, field: &str, redaction: Redaction) -> String {
        if redaction.changed() {
            self.note_redacted(field);
            self.categories.extend(redaction.categories);
        }
        redaction.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_records_field_and_category() {
        let mut ledger = PayloadLedger::new(true);
        let out = ledger.mask("text.visibleText", "ping ops@example.com");
        assert_eq!(out, "ping [EMAIL_REDACTED]");
        let privacy = ledger.privacy();
        assert_eq!(privacy.redacted_fields, vec!["text.visibleText"]);
        assert!(privacy.sensitive_data_types.contains(&SensitiveCategory::Email));
        assert!(privacy.masking_applied);
    }

    #[test]
    fn test_masking_disabled_passes_through() {
        let mut ledger = PayloadLedger::new(false);
        assert_eq!(ledger.mask("f", "ops@example.com"), "ops@example.com");
        assert!(ledger.privacy().redacted_fields.is_empty());
        assert!(!ledger.privacy().masking_applied);
    }

    #[test]
    fn test_cap_records_truncation_once() {
        let mut ledger = PayloadLedger::new(true);
        let (out, truncated) = ledger.cap("text.visibleText", "abcdefghij", 6);
        assert!(truncated);
        assert_eq!(out, "abc...");
        ledger.cap("text.visibleText", "abcdefghij", 6);
        ledger.cap("text.selectedText", "short", 6);
        assert_eq!(ledger.truncated_fields(), ["text.visibleText"]);
    }

    #[test]
    fn test_mask_capped_masks_before_cutting() {
        let mut ledger = PayloadLedger::new(true);
        let out = ledger.mask_capped("f", "key 10.0.0.1 trailing words", 20);
        assert!(out.starts_with("key [INTERNAL_IP]"));
        assert!(!out.contains("10.0"));
    }

    #[test]
    fn test_mask_html_notes_input_redaction() {
        let mut ledger = PayloadLedger::new(true);
        let out = ledger.mask_html("structure.sections[0].outerHTML", "<input type=\"password\" value=\"x\">");
        assert!(out.contains("[REDACTED]"));
        assert_eq!(ledger.privacy().redacted_fields.len(), 1);
    }
}
