//! Headings, code blocks, tables, forms, the open modal and the focused
//! element.

use pagelens_protocols::{
    CodeBlock, FocusedElement, FormContext, FormField, Heading, ModalContext, NodeId, PageError,
    PageInspector, TableData,
};
use tracing::debug;

use super::extractor::{SectionExtractor, focused_element};
use crate::ledger::PayloadLedger;
use crate::redactor::{REDACTED, Redactor};
use crate::selection::element_is_editable;
use crate::ui_state::MODAL_SELECTORS;
use crate::util::{char_len, element_by_id, rendered_text, visible_matches};

const HEADING_SELECTORS: &str = "h1, h2, h3, h4, h5, h6, [role=heading]";
const FIELD_SELECTORS: &str = "input, select, textarea";
const BUTTON_SELECTORS: &str =
    "button, [role=button], input[type=submit], input[type=button], input[type=reset]";

const MAX_MODAL_BUTTONS: usize = 10;
const MAX_LABEL_CHARS: usize = 200;
const MAX_FIELD_VALUE_CHARS: usize = 200;

/// Field types whose value is never interesting or never safe to report.
const VALUELESS_TYPES: &[&str] = &["submit", "button", "reset", "image", "file"];

impl SectionExtractor {
    pub fn extract_headings<P: PageInspector + ?Sized>(
        &self,
        page: &P,
        ledger: &mut PayloadLedger,
    ) -> Result<Vec<Heading>, PageError> {
        let mut headings = Vec::new();
        for node in visible_matches(page, HEADING_SELECTORS)? {
            let Some(text) = rendered_text(page, node) else {
                continue;
            };
            if headings.len() == self.limits.max_headings {
                ledger.note_truncated("text.headings");
                break;
            }
            let field = format!("text.headings[{}].text", headings.len());
            headings.push(Heading {
                level: heading_level(page, node),
                text: ledger.mask_capped(&field, &text, self.limits.max_heading_text),
            });
        }
        Ok(headings)
    }

    /// `pre` blocks and `code` elements outside any `pre`.
    pub fn extract_code_blocks<P: PageInspector + ?Sized>(
        &self,
        page: &P,
        ledger: &mut PayloadLedger,
    ) -> Result<Vec<CodeBlock>, PageError> {
        let mut blocks = Vec::new();
        for node in visible_matches(page, "pre, code")? {
            let tag = page.tag_name(node).unwrap_or_default();
            let in_pre = page
                .ancestors(node)
                .into_iter()
                .any(|a| page.tag_name(a).as_deref() == Some("pre"));
            if tag == "code" && in_pre {
                continue;
            }
            let raw = page.text_content(node);
            if raw.trim().is_empty() {
                continue;
            }
            if blocks.len() == self.limits.max_code_blocks {
                ledger.note_truncated("structure.codeBlocks");
                break;
            }

            let field = format!("structure.codeBlocks[{}].content", blocks.len());
            let masked = ledger.mask(&field, raw.trim_end());
            let line_count = masked.lines().count();
            let (content, truncated) = ledger.cap(&field, &masked, self.limits.max_code_block_text);
            blocks.push(CodeBlock {
                language: code_language(page, node),
                content,
                line_count,
                truncated,
            });
        }
        Ok(blocks)
    }

    /// Visible tables with their header row and a bounded grid of cells.
    /// Columns whose header names a sensitive field are blanked out.
    pub fn extract_tables<P: PageInspector + ?Sized>(
        &self,
        page: &P,
        ledger: &mut PayloadLedger,
    ) -> Result<Vec<TableData>, PageError> {
        let limits = &self.limits;
        let mut tables = Vec::new();
        for table in visible_matches(page, "table")? {
            if tables.len() == limits.max_tables {
                ledger.note_truncated("structure.tables");
                break;
            }
            let field = format!("structure.tables[{}]", tables.len());
            let rows: Vec<Vec<NodeId>> = page
                .query_within(table, "tr")?
                .into_iter()
                .map(|tr| cells_of(page, tr))
                .filter(|cells| !cells.is_empty())
                .collect();

            let header_row = rows.iter().position(|cells| {
                cells
                    .iter()
                    .all(|c| page.tag_name(*c).as_deref() == Some("th"))
            });
            let mut truncated = false;
            let mut headers = Vec::new();
            if let Some(idx) = header_row {
                let cells = &rows[idx];
                truncated |= cells.len() > limits.max_table_columns;
                for cell in cells.iter().take(limits.max_table_columns) {
                    let text = rendered_text(page, *cell).unwrap_or_default();
                    let header_field = format!("{field}.headers");
                    let masked = ledger.mask(&header_field, &text);
                    let (text, cut) = ledger.cap(&header_field, &masked, limits.max_table_cell);
                    truncated |= cut;
                    headers.push(text);
                }
            }
            let sensitive: Vec<bool> = headers.iter().map(|h| Redactor::is_sensitive_name(h)).collect();
            let redacted_columns: Vec<String> = headers
                .iter()
                .zip(&sensitive)
                .filter(|(_, s)| **s)
                .map(|(h, _)| h.clone())
                .collect();

            let data_rows: Vec<&Vec<NodeId>> = rows
                .iter()
                .enumerate()
                .filter(|(i, _)| Some(*i) != header_row)
                .map(|(_, cells)| cells)
                .collect();
            let total_rows = data_rows.len();
            truncated |= total_rows > limits.max_table_rows;

            let cell_field = format!("{field}.rows");
            let mut grid = Vec::new();
            for cells in data_rows.into_iter().take(limits.max_table_rows) {
                truncated |= cells.len() > limits.max_table_columns;
                let mut row = Vec::new();
                for (col, cell) in cells.iter().take(limits.max_table_columns).enumerate() {
                    if sensitive.get(col).copied().unwrap_or(false) {
                        ledger.note_redacted(&cell_field);
                        row.push(REDACTED.to_string());
                        continue;
                    }
                    let text = rendered_text(page, *cell).unwrap_or_default();
                    let masked = ledger.mask(&cell_field, &text);
                    let (text, cut) = ledger.cap(&cell_field, &masked, limits.max_table_cell);
                    truncated |= cut;
                    row.push(text);
                }
                grid.push(row);
            }

            let caption = page
                .query_within(table, "caption")?
                .first()
                .and_then(|c| rendered_text(page, *c))
                .map(|c| ledger.mask_capped(&format!("{field}.caption"), &c, limits.max_table_cell));

            tables.push(TableData {
                caption,
                headers,
                rows: grid,
                total_rows,
                truncated,
                redacted_columns,
            });
        }
        Ok(tables)
    }

    /// Visible forms and their fields. Hidden inputs are skipped; password
    /// and sensitively named fields report `[REDACTED]` instead of a value.
    pub fn extract_form_context<P: PageInspector + ?Sized>(
        &self,
        page: &P,
        ledger: &mut PayloadLedger,
    ) -> Result<Vec<FormContext>, PageError> {
        let mut forms = Vec::new();
        for form in visible_matches(page, "form")? {
            if forms.len() == self.limits.max_forms {
                ledger.note_truncated("structure.forms");
                break;
            }
            let form_field = format!("structure.forms[{}]", forms.len());
            let controls: Vec<NodeId> = page
                .query_within(form, FIELD_SELECTORS)?
                .into_iter()
                .filter(|node| attr_lower(page, *node, "type").as_deref() != Some("hidden"))
                .collect();
            let total_fields = controls.len();
            if total_fields > self.limits.max_form_fields {
                ledger.note_truncated(&format!("{form_field}.fields"));
            }

            let mut fields = Vec::new();
            for node in controls.into_iter().take(self.limits.max_form_fields) {
                let path = format!("{form_field}.fields[{}]", fields.len());
                fields.push(self.form_field(page, node, &path, ledger)?);
            }

            forms.push(FormContext {
                id: page.attribute(form, "id"),
                name: page.attribute(form, "name"),
                action: page.attribute(form, "action"),
                method: attr_lower(page, form, "method"),
                fields,
                total_fields,
            });
        }
        Ok(forms)
    }

    fn form_field<P: PageInspector + ?Sized>(
        &self,
        page: &P,
        node: NodeId,
        path: &str,
        ledger: &mut PayloadLedger,
    ) -> Result<FormField, PageError> {
        let tag = page.tag_name(node).unwrap_or_default();
        let field_type = match tag.as_str() {
            "input" => Some(attr_lower(page, node, "type").unwrap_or_else(|| "text".to_string())),
            "select" => Some("select".to_string()),
            _ => None,
        };
        let name = page.attribute(node, "name");
        let id = page.attribute(node, "id");
        let label = field_label(page, node)?;

        let is_password = field_type.as_deref() == Some("password");
        let sensitive = is_password
            || [&name, &id, &label, &page.attribute(node, "autocomplete")]
                .into_iter()
                .flatten()
                .any(|s| Redactor::is_sensitive_name(s));

        let raw_value = if field_type
            .as_deref()
            .is_some_and(|t| VALUELESS_TYPES.contains(&t))
        {
            None
        } else {
            page.value(node)
                .or_else(|| selected_option(page, node))
                .filter(|v| !v.is_empty())
        };
        let (value, redacted) = match raw_value {
            Some(_) if sensitive => {
                ledger.note_redacted(&format!("{path}.value"));
                (Some(REDACTED.to_string()), true)
            }
            Some(v) => (
                Some(ledger.mask_capped(&format!("{path}.value"), &v, MAX_FIELD_VALUE_CHARS)),
                false,
            ),
            None => (None, false),
        };

        let validation_message = if attr_lower(page, node, "aria-invalid").as_deref() == Some("true")
        {
            described_text(page, node)?
                .map(|m| ledger.mask_capped(&format!("{path}.validationMessage"), &m, MAX_LABEL_CHARS))
        } else {
            None
        };

        Ok(FormField {
            tag,
            field_type,
            name,
            id,
            label: label.map(|l| ledger.mask_capped(&format!("{path}.label"), &l, MAX_LABEL_CHARS)),
            placeholder: page
                .attribute(node, "placeholder")
                .map(|p| ledger.mask_capped(&format!("{path}.placeholder"), &p, MAX_LABEL_CHARS)),
            required: page.attribute(node, "required").is_some()
                || attr_lower(page, node, "aria-required").as_deref() == Some("true"),
            disabled: page.attribute(node, "disabled").is_some(),
            value,
            redacted,
            validation_message,
        })
    }

    /// First visible dialog.
    pub fn extract_modal<P: PageInspector + ?Sized>(
        &self,
        page: &P,
        ledger: &mut PayloadLedger,
    ) -> Result<Option<ModalContext>, PageError> {
        let Some(modal) = visible_matches(page, MODAL_SELECTORS)?.into_iter().next() else {
            return Ok(None);
        };

        let title = match labelled_by(page, modal)? {
            Some(title) => Some(title),
            None => match visible_matches(page, HEADING_SELECTORS)?
                .into_iter()
                .find(|h| page.contains(modal, *h))
            {
                Some(heading) => rendered_text(page, heading),
                None => page.attribute(modal, "aria-label"),
            },
        }
        .map(|t| ledger.mask_capped("structure.modal.title", &t, MAX_LABEL_CHARS));

        let text = rendered_text(page, modal).unwrap_or_default();
        let text = ledger.mask_capped("structure.modal.text", &text, self.limits.max_modal_text);

        let buttons = page
            .query_within(modal, BUTTON_SELECTORS)?
            .into_iter()
            .filter(|b| page.is_visible(*b))
            .filter_map(|b| rendered_text(page, b).or_else(|| page.value(b).filter(|v| !v.is_empty())))
            .take(MAX_MODAL_BUTTONS)
            .map(|t| ledger.mask_capped("structure.modal.buttons", &t, MAX_LABEL_CHARS))
            .collect();

        debug!(?modal, "Modal extracted");
        Ok(Some(ModalContext {
            title,
            text,
            buttons,
        }))
    }

    /// Descriptor of the focused element; never its value.
    pub fn extract_focused_element<P: PageInspector + ?Sized>(
        &self,
        page: &P,
        ledger: &mut PayloadLedger,
    ) -> Result<Option<FocusedElement>, PageError> {
        let Some(node) = focused_element(page) else {
            return Ok(None);
        };
        let label = field_label(page, node)?
            .map(|l| ledger.mask_capped("structure.focusedElement.label", &l, MAX_LABEL_CHARS));
        Ok(Some(FocusedElement {
            tag: page.tag_name(node).unwrap_or_default(),
            element_type: page.attribute(node, "type"),
            id: page.attribute(node, "id"),
            name: page.attribute(node, "name"),
            role: page.attribute(node, "role"),
            label,
            is_editable: element_is_editable(page, node),
        }))
    }
}

fn attr_lower<P: PageInspector + ?Sized>(page: &P, node: NodeId, name: &str) -> Option<String> {
    page.attribute(node, name).map(|v| v.trim().to_ascii_lowercase())
}

fn heading_level<P: PageInspector + ?Sized>(page: &P, node: NodeId) -> u8 {
    let from_tag = page
        .tag_name(node)
        .and_then(|tag| tag.strip_prefix('h').and_then(|n| n.parse::<u8>().ok()));
    from_tag
        .or_else(|| page.attribute(node, "aria-level").and_then(|l| l.trim().parse().ok()))
        .unwrap_or(2)
        .clamp(1, 6)
}

/// Language from a `language-*`/`lang-*` class on the block or its first
/// `code` child, or from `data-language`.
fn code_language<P: PageInspector + ?Sized>(page: &P, node: NodeId) -> Option<String> {
    let mut holders = vec![node];
    if let Some(first) = page
        .children(node)
        .into_iter()
        .find(|c| page.tag_name(*c).as_deref() == Some("code"))
    {
        holders.push(first);
    }
    for holder in holders {
        let from_class = page.class_list(holder).into_iter().find_map(|class| {
            class
                .strip_prefix("language-")
                .or_else(|| class.strip_prefix("lang-"))
                .filter(|l| !l.is_empty())
                .map(str::to_string)
        });
        if let Some(language) = from_class.or_else(|| page.attribute(holder, "data-language")) {
            return Some(language);
        }
    }
    None
}

fn cells_of<P: PageInspector + ?Sized>(page: &P, row: NodeId) -> Vec<NodeId> {
    page.children(row)
        .into_iter()
        .filter(|c| matches!(page.tag_name(*c).as_deref(), Some("td") | Some("th")))
        .collect()
}

fn selected_option<P: PageInspector + ?Sized>(page: &P, select: NodeId) -> Option<String> {
    if page.tag_name(select).as_deref() != Some("select") {
        return None;
    }
    let options = page.query_within(select, "option").ok()?;
    let chosen = options
        .iter()
        .find(|o| page.attribute(**o, "selected").is_some())
        .or_else(|| options.first())?;
    page.attribute(*chosen, "value")
        .or_else(|| rendered_text(page, *chosen))
}

/// Accessible label: `aria-label`, `aria-labelledby`, `label[for]`, then an
/// enclosing `label`.
fn field_label<P: PageInspector + ?Sized>(page: &P, node: NodeId) -> Result<Option<String>, PageError> {
    if let Some(label) = page.attribute(node, "aria-label").filter(|l| !l.trim().is_empty()) {
        return Ok(Some(label.trim().to_string()));
    }
    if let Some(label) = labelled_by(page, node)? {
        return Ok(Some(label));
    }
    if let Some(id) = page.attribute(node, "id") {
        let for_label = page
            .query_all("label[for]")?
            .into_iter()
            .find(|l| page.attribute(*l, "for").as_deref() == Some(id.as_str()));
        if let Some(text) = for_label.and_then(|l| rendered_text(page, l)) {
            return Ok(Some(text));
        }
    }
    Ok(page
        .ancestors(node)
        .into_iter()
        .find(|a| page.tag_name(*a).as_deref() == Some("label"))
        .and_then(|l| rendered_text(page, l)))
}

fn labelled_by<P: PageInspector + ?Sized>(page: &P, node: NodeId) -> Result<Option<String>, PageError> {
    referenced_text(page, node, "aria-labelledby")
}

/// Text of the elements an invalid field points at for its error.
fn described_text<P: PageInspector + ?Sized>(page: &P, node: NodeId) -> Result<Option<String>, PageError> {
    match referenced_text(page, node, "aria-errormessage")? {
        Some(text) => Ok(Some(text)),
        None => referenced_text(page, node, "aria-describedby"),
    }
}

/// Joined text of the elements whose ids are listed in `attr`.
fn referenced_text<P: PageInspector + ?Sized>(
    page: &P,
    node: NodeId,
    attr: &str,
) -> Result<Option<String>, PageError> {
    let Some(refs) = page.attribute(node, attr) else {
        return Ok(None);
    };
    let mut parts = Vec::new();
    for id in refs.split_whitespace() {
        if let Some(text) = element_by_id(page, id)?.and_then(|target| rendered_text(page, target)) {
            parts.push(text);
        }
    }
    let joined = parts.join(" ");
    Ok((char_len(&joined) > 0).then_some(joined))
}

#[cfg(test)]
#[path = "structure_tests.rs"]
mod tests;
