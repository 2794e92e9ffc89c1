//! Additive relevance scoring of candidate page sections.

use pagelens_config::ScoringConfig;
use pagelens_protocols::{NodeId, PageError, PageInspector, SectionPurpose};

use crate::util::char_len;

const HEADING_SELECTOR: &str = "h1, h2, h3, h4, h5, h6, [role=heading]";
const HEADING_TAGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];
const LANDMARK_TAGS: &[&str] = &["main", "article"];
const LANDMARK_ROLES: &[&str] = &["main", "region", "complementary"];
const STRUCTURAL_TAGS: &[&str] = &["form", "table", "pre", "code"];
const DIALOG_ROLES: &[&str] = &["dialog", "alertdialog"];

/// Scores a section by how likely it is to matter to someone debugging the
/// page. Each signal adds its configured weight and a reason string.
#[derive(Debug, Clone)]
pub struct RelevanceScorer {
    weights: ScoringConfig,
}

/// Marker facts about one element, gathered once per scoring pass.
struct Markers {
    tag: String,
    role: String,
    classes: Vec<String>,
}

impl Markers {
    fn read<P: PageInspector + ?Sized>(page: &P, node: NodeId) -> Self {
        Self {
            tag: page.tag_name(node).unwrap_or_default(),
            role: page
                .attribute(node, "role")
                .map(|r| r.trim().to_ascii_lowercase())
                .unwrap_or_default(),
            classes: page
                .class_list(node)
                .into_iter()
                .map(|c| c.to_ascii_lowercase())
                .collect(),
        }
    }

    fn class_mentions(&self, words: &[&str]) -> bool {
        self.classes
            .iter()
            .any(|class| words.iter().any(|w| class.contains(w)))
    }

    fn is_alert(&self) -> bool {
        self.role == "alert" || self.class_mentions(&["alert"])
    }

    fn is_error_container(&self) -> bool {
        self.class_mentions(&["error"])
    }

    fn is_dialog<P: PageInspector + ?Sized>(&self, page: &P, node: NodeId) -> bool {
        self.tag == "dialog"
            || DIALOG_ROLES.contains(&self.role.as_str())
            || page.attribute(node, "aria-modal").as_deref() == Some("true")
    }

    fn is_panel(&self) -> bool {
        self.class_mentions(&["panel", "card"])
    }
}

impl RelevanceScorer {
    pub fn new(weights: ScoringConfig) -> Self {
        Self { weights }
    }

    pub fn keep_threshold(&self) -> u8 {
        self.weights.keep_threshold
    }

    /// Score in `[0, 100]` with the reasons that contributed. Invisible
    /// elements score 0.
    pub fn score<P: PageInspector + ?Sized>(
        &self,
        page: &P,
        node: NodeId,
        focused: Option<NodeId>,
    ) -> Result<(u8, Vec<String>), PageError> {
        if !page.is_visible(node) {
            return Ok((0, vec!["invisible".to_string()]));
        }
        let w = &self.weights;
        let markers = Markers::read(page, node);
        let mut score: i32 = 0;
        let mut reasons = vec![];

        if markers.role == "alert" || markers.class_mentions(&["alert", "error"]) {
            score += w.alert_marker;
            reasons.push("alert_marker".to_string());
        }

        let text = page.text_content(node);
        let lowered = text.to_lowercase();
        for (word, weight) in [
            ("error", w.error_text),
            ("failed", w.failed_text),
            ("warning", w.warning_text),
        ] {
            if lowered.contains(word) {
                score += weight;
                reasons.push(format!("text:{word}"));
            }
        }

        let is_heading = HEADING_TAGS.contains(&markers.tag.as_str()) || markers.role == "heading";
        if is_heading || !page.query_within(node, HEADING_SELECTOR)?.is_empty() {
            score += w.heading;
            reasons.push("heading".to_string());
        }

        if LANDMARK_TAGS.contains(&markers.tag.as_str())
            || LANDMARK_ROLES.contains(&markers.role.as_str())
        {
            score += w.landmark;
            reasons.push("landmark".to_string());
        }

        if STRUCTURAL_TAGS.contains(&markers.tag.as_str()) {
            score += w.structural;
            reasons.push(format!("structural:{}", markers.tag));
        }

        if focused.is_some_and(|f| page.contains(node, f)) {
            score += w.contains_focus;
            reasons.push("contains_focus".to_string());
        }

        if markers.is_dialog(page, node) {
            score += w.dialog;
            reasons.push("dialog".to_string());
        }

        if markers.is_panel() {
            score += w.panel;
            reasons.push("panel".to_string());
        }

        let len = char_len(text.trim());
        if len > w.oversized_threshold {
            score -= w.oversized_penalty;
            reasons.push("oversized".to_string());
        } else if len < w.undersized_threshold {
            score -= w.undersized_penalty;
            reasons.push("undersized".to_string());
        }

        Ok((score.clamp(0, 100) as u8, reasons))
    }

    /// Most specific purpose: alert, error container, modal, form, table,
    /// code block, panel, then generic.
    pub fn purpose<P: PageInspector + ?Sized>(page: &P, node: NodeId) -> SectionPurpose {
        let markers = Markers::read(page, node);
        if markers.is_alert() {
            SectionPurpose::Alert
        } else if markers.is_error_container() {
            SectionPurpose::ErrorContainer
        } else if markers.is_dialog(page, node) || markers.class_mentions(&["modal", "dialog"]) {
            SectionPurpose::Modal
        } else if markers.tag == "form" {
            SectionPurpose::Form
        } else if markers.tag == "table" {
            SectionPurpose::Table
        } else if markers.tag == "pre" || markers.tag == "code" {
            SectionPurpose::CodeBlock
        } else if markers.is_panel() {
            SectionPurpose::Panel
        } else {
            SectionPurpose::Generic
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagelens_dom::PageDocument;

    fn scorer() -> RelevanceScorer {
        RelevanceScorer::new(ScoringConfig::default())
    }

    #[test]
    fn test_alert_with_error_text() {
        let mut doc = PageDocument::new("https://example.com/");
        let body = doc.body().unwrap();
        let alert = doc.append_element(body, "div", &[("role", "alert")]).unwrap();
        doc.append_text(alert, "Deployment failed with error 502").unwrap();

        let (score, reasons) = scorer().score(&doc, alert, None).unwrap();
        // alert 50 + error 30 + failed 25, clamped
        assert_eq!(score, 100);
        assert!(reasons.contains(&"alert_marker".to_string()));
        assert!(reasons.contains(&"text:failed".to_string()));
        assert_eq!(RelevanceScorer::purpose(&doc, alert), SectionPurpose::Alert);
    }

    #[test]
    fn test_plain_section_with_heading() {
        let mut doc = PageDocument::new("https://example.com/");
        let body = doc.body().unwrap();
        let section = doc.append_element(body, "section", &[]).unwrap();
        let h2 = doc.append_element(section, "h2", &[]).unwrap();
        doc.append_text(h2, "Build settings").unwrap();

        let (score, reasons) = scorer().score(&doc, section, None).unwrap();
        assert_eq!(score, 20);
        assert_eq!(reasons, vec!["heading"]);
        assert_eq!(RelevanceScorer::purpose(&doc, section), SectionPurpose::Generic);
    }

    #[test]
    fn test_focus_and_form() {
        let mut doc = PageDocument::new("https://example.com/");
        let body = doc.body().unwrap();
        let form = doc.append_element(body, "form", &[]).unwrap();
        doc.append_text(form, "Sign up for the newsletter").unwrap();
        let input = doc.append_element(form, "input", &[]).unwrap();

        let (unfocused, _) = scorer().score(&doc, form, None).unwrap();
        let (focused, reasons) = scorer().score(&doc, form, Some(input)).unwrap();
        assert_eq!(unfocused, 10);
        assert_eq!(focused, 50);
        assert!(reasons.contains(&"contains_focus".to_string()));
        assert_eq!(RelevanceScorer::purpose(&doc, form), SectionPurpose::Form);
    }

    #[test]
    fn test_tiny_text_penalty_never_goes_negative() {
        let mut doc = PageDocument::new("https://example.com/");
        let body = doc.body().unwrap();
        let div = doc.append_element(body, "div", &[]).unwrap();
        doc.append_text(div, "ok").unwrap();
        let (score, reasons) = scorer().score(&doc, div, None).unwrap();
        assert_eq!(score, 0);
        assert_eq!(reasons, vec!["undersized"]);
    }

    #[test]
    fn test_invisible_scores_zero() {
        let mut doc = PageDocument::new("https://example.com/");
        let body = doc.body().unwrap();
        let alert = doc
            .append_element(body, "div", &[("role", "alert"), ("hidden", "")])
            .unwrap();
        doc.append_text(alert, "Error: something failed").unwrap();
        assert_eq!(scorer().score(&doc, alert, None).unwrap().0, 0);
    }

    #[test]
    fn test_dialog_purpose_and_panel() {
        let mut doc = PageDocument::new("https://example.com/");
        let body = doc.body().unwrap();
        let dialog = doc
            .append_element(body, "div", &[("aria-modal", "true"), ("class", "card")])
            .unwrap();
        doc.append_text(dialog, "Confirm deletion of this project").unwrap();

        let (score, reasons) = scorer().score(&doc, dialog, None).unwrap();
        assert_eq!(score, 50);
        assert_eq!(reasons, vec!["dialog", "panel"]);
        assert_eq!(RelevanceScorer::purpose(&doc, dialog), SectionPurpose::Modal);
    }

    #[test]
    fn test_error_class_is_error_container() {
        let mut doc = PageDocument::new("https://example.com/");
        let body = doc.body().unwrap();
        let div = doc
            .append_element(body, "div", &[("class", "form-errors")])
            .unwrap();
        assert_eq!(
            RelevanceScorer::purpose(&doc, div),
            SectionPurpose::ErrorContainer
        );
    }
}
