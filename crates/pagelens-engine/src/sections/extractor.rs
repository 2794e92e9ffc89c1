//! Relevance-ranked HTML sections under a global size budget.

use std::collections::BTreeMap;

use pagelens_config::{LimitsConfig, ScoringConfig};
use pagelens_protocols::{HtmlSection, NodeId, PageError, PageInspector};
use tracing::debug;

use super::scorer::RelevanceScorer;
use crate::ledger::PayloadLedger;
use crate::util::{char_len, collapse_whitespace};

/// Elements considered as sections.
const CANDIDATE_SELECTORS: &str = "main, section, article, [role=main], [role=region], \
    [role=alert], [role=alertdialog], [role=dialog], [role=status], form, table, pre, code, \
    [class*=error], [class*=alert], [class*=warning], [class*=panel], [class*=card], \
    [class*=modal], [class*=dialog], [class*=notification], [class*=toast]";

/// Candidates scored per pass, in document order.
pub(super) const MAX_CANDIDATES: usize = 300;

/// Attributes copied onto each section.
const KEPT_ATTRIBUTES: &[&str] = &["id", "class", "role", "aria-label", "aria-live", "data-testid"];

/// Reads the structured parts of a page: sections, errors, headings, code,
/// tables, forms, the open modal and the focused element.
///
/// Every method is a pure read. Masking and truncation are recorded in the
/// [`PayloadLedger`] passed in.
#[derive(Debug, Clone)]
pub struct SectionExtractor {
    pub(super) limits: LimitsConfig,
    scorer: RelevanceScorer,
}

impl SectionExtractor {
    pub fn new(limits: LimitsConfig, scoring: ScoringConfig) -> Self {
        Self {
            limits,
            scorer: RelevanceScorer::new(scoring),
        }
    }

    pub fn scorer(&self) -> &RelevanceScorer {
        &self.scorer
    }

    /// Candidates scoring above the keep threshold, best first, until either
    /// the section count or the total HTML budget runs out.
    pub fn extract_sections<P: PageInspector + ?Sized>(
        &self,
        page: &P,
        ledger: &mut PayloadLedger,
    ) -> Result<Vec<HtmlSection>, PageError> {
        let focused = focused_element(page);
        let threshold = self.scorer.keep_threshold();

        let mut scored: Vec<(NodeId, u8)> = Vec::new();
        for node in page.query_all(CANDIDATE_SELECTORS)?.into_iter().take(MAX_CANDIDATES) {
            let (score, reasons) = self.scorer.score(page, node, focused)?;
            if score > threshold {
                debug!(?node, score, ?reasons, "Section kept");
                scored.push((node, score));
            }
        }
        // sort_by is stable: equal scores stay in document order
        scored.sort_by(|a, b| b.1.cmp(&a.1));
        scored.truncate(self.limits.max_sections);

        let mut sections = Vec::with_capacity(scored.len());
        let mut total_html = 0;
        for (node, score) in scored {
            let field = format!("structure.sections[{}]", sections.len());
            let html_field = format!("{field}.outerHTML");
            let masked = ledger.mask_html(&html_field, &page.outer_html(node));
            let (outer_html, truncated) =
                ledger.cap(&html_field, &masked, self.limits.max_section_html);

            let len = char_len(&outer_html);
            if total_html + len > self.limits.max_total_html {
                debug!(total_html, len, "Section HTML budget exhausted");
                ledger.note_truncated("structure.sections");
                break;
            }
            total_html += len;

            let text_content = ledger.mask_capped(
                &format!("{field}.textContent"),
                &collapse_whitespace(&page.text_content(node)),
                self.limits.max_section_html,
            );
            let attributes: BTreeMap<String, String> = KEPT_ATTRIBUTES
                .iter()
                .filter_map(|name| page.attribute(node, name).map(|v| (name.to_string(), v)))
                .collect();

            sections.push(HtmlSection {
                purpose: RelevanceScorer::purpose(page, node),
                score,
                outer_html,
                text_content,
                attributes,
                truncated,
            });
        }
        Ok(sections)
    }
}

/// The focused element, unless focus rests on the body.
pub(super) fn focused_element<P: PageInspector + ?Sized>(page: &P) -> Option<NodeId> {
    page.active_element().filter(|node| Some(*node) != page.body())
}
