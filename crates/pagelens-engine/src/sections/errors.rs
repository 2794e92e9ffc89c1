//! Error, warning and notice messages shown on the page.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use pagelens_protocols::{
    ElementSnapshot, ErrorKind, ExtractedError, NodeId, PageError, PageInspector, Severity,
};
use regex::Regex;
use tracing::debug;

use super::extractor::{MAX_CANDIDATES, SectionExtractor};
use crate::ledger::PayloadLedger;
use crate::util::{prefix_chars, rendered_text, visible_matches};

const ERROR_MARKERS: &str = "[role=alert], [role=alertdialog], [role=status], \
    .error, .error-message, .errors, .alert, .alert-danger, .alert-error, .alert-warning, \
    .warning, .notice, .flash, .flash-error, .invalid-feedback, .field-error, \
    .validation-error, .validation-message, .form-error, .toast, .snackbar, .notification, \
    [class*=error], [class*=warning], [aria-live=assertive]";

/// Chars of message text used to recognize duplicates.
const DEDUP_PREFIX: usize = 100;

const MAX_CONTEXT_CHARS: usize = 200;

static CRITICAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(fatal|crash(ed|es)?|outage|internal server error|5\d\d)\b")
        .expect("critical pattern is valid")
});

static WARNING_TEXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*(warning|warn)\b").expect("warning pattern is valid"));

impl SectionExtractor {
    /// Visible messages from error, alert, warning, validation and toast
    /// markers. Nested markers report only the innermost one carrying text.
    pub fn extract_errors<P: PageInspector + ?Sized>(
        &self,
        page: &P,
        ledger: &mut PayloadLedger,
    ) -> Result<Vec<ExtractedError>, PageError> {
        let markers = visible_matches(page, ERROR_MARKERS)?;
        if markers.len() > MAX_CANDIDATES {
            debug!(found = markers.len(), "Error markers capped");
            ledger.note_truncated("text.errors");
        }
        let candidates: Vec<(NodeId, String)> = markers
            .into_iter()
            .take(MAX_CANDIDATES)
            .filter_map(|node| rendered_text(page, node).map(|text| (node, text)))
            .collect();

        let mut seen = HashSet::new();
        let mut errors = Vec::new();
        for (node, text) in &candidates {
            let has_inner = candidates
                .iter()
                .any(|(other, _)| other != node && page.contains(*node, *other));
            if has_inner {
                continue;
            }
            if !seen.insert(prefix_chars(text, DEDUP_PREFIX)) {
                debug!(?node, "Duplicate error message skipped");
                continue;
            }
            if errors.len() == self.limits.max_errors {
                ledger.note_truncated("text.errors");
                break;
            }

            let field = format!("text.errors[{}]", errors.len());
            let kind = classify_kind(page, *node, text);
            let severity = classify_severity(page, *node, kind, text);
            let message = ledger.mask_capped(
                &format!("{field}.message"),
                text,
                self.limits.max_error_message,
            );
            let context = page
                .parent(*node)
                .and_then(|parent| rendered_text(page, parent))
                .map(|parent_text| {
                    ledger.mask_capped(&format!("{field}.context"), &parent_text, MAX_CONTEXT_CHARS)
                })
                .unwrap_or_default();

            errors.push(ExtractedError {
                kind,
                message,
                severity,
                context,
                element: snapshot(page, *node),
            });
        }
        debug!(count = errors.len(), "Errors extracted");
        Ok(errors)
    }
}

fn markers<P: PageInspector + ?Sized>(page: &P, node: NodeId) -> (String, Vec<String>) {
    let role = page
        .attribute(node, "role")
        .map(|r| r.to_ascii_lowercase())
        .unwrap_or_default();
    let classes = page
        .class_list(node)
        .into_iter()
        .map(|c| c.to_ascii_lowercase())
        .collect();
    (role, classes)
}

fn classify_kind<P: PageInspector + ?Sized>(page: &P, node: NodeId, text: &str) -> ErrorKind {
    let (role, classes) = markers(page, node);
    let class_has = |word: &str| classes.iter().any(|c| c.contains(word));

    if class_has("warn") || WARNING_TEXT.is_match(text) {
        ErrorKind::Warning
    } else if role == "status" || class_has("info") || class_has("notice") || class_has("status")
    {
        ErrorKind::Info
    } else {
        ErrorKind::Error
    }
}

fn classify_severity<P: PageInspector + ?Sized>(
    page: &P,
    node: NodeId,
    kind: ErrorKind,
    text: &str,
) -> Severity {
    match kind {
        ErrorKind::Info => Severity::Low,
        ErrorKind::Warning => Severity::Medium,
        ErrorKind::Error if CRITICAL.is_match(text) => Severity::Critical,
        ErrorKind::Error if is_field_validation(page, node) => Severity::Medium,
        ErrorKind::Error => Severity::High,
    }
}

/// Validation markers, or messages an invalid field points at.
fn is_field_validation<P: PageInspector + ?Sized>(page: &P, node: NodeId) -> bool {
    let (_, classes) = markers(page, node);
    if classes
        .iter()
        .any(|c| c.contains("invalid") || c.contains("validation") || c.contains("field-error"))
    {
        return true;
    }
    let Some(id) = page.attribute(node, "id") else {
        return false;
    };
    page.query_all("[aria-invalid=true]")
        .map(|fields| {
            fields.into_iter().any(|field| {
                ["aria-errormessage", "aria-describedby"].iter().any(|attr| {
                    page.attribute(field, attr)
                        .is_some_and(|refs| refs.split_whitespace().any(|r| r == id))
                })
            })
        })
        .unwrap_or(false)
}

pub(super) fn snapshot<P: PageInspector + ?Sized>(page: &P, node: NodeId) -> ElementSnapshot {
    ElementSnapshot {
        tag: page.tag_name(node).unwrap_or_default(),
        id: page.attribute(node, "id"),
        classes: page.class_list(node),
        role: page.attribute(node, "role"),
    }
}
