//! Heuristic page-state classification from DOM markers.

use pagelens_protocols::{PageError, PageInspector, PageState, ReadyState, UiStateAnalysis};
use tracing::debug;

use crate::util::{cap, element_by_id, rendered_text, visible_matches};

pub const LOADING_SELECTORS: &str = ".loading, .spinner, .loader, .skeleton, \
    [aria-busy=true], [role=progressbar], [class*=spinner]";

pub const ERROR_SELECTORS: &str = "[role=alert], .error, .error-message, .alert-danger, \
    .alert-error, .flash-error, .has-error, .is-error";

pub const EMPTY_SELECTORS: &str =
    ".empty-state, .empty, .no-results, .blankslate, .zero-state, [data-empty=true]";

pub const DISABLED_SELECTORS: &str = "button[disabled], input[disabled], select[disabled], \
    textarea[disabled], fieldset[disabled], [aria-disabled=true]";

pub const TOAST_SELECTORS: &str = ".toast, .notification, .snackbar, .Toastify__toast, \
    [role=status], [aria-live=assertive]";

pub const MODAL_SELECTORS: &str = "[role=dialog], [role=alertdialog], [aria-modal=true], \
    dialog[open], .modal.show, .modal.open, .modal.is-open";

pub const VALIDATION_SELECTORS: &str = ".invalid-feedback, .field-error, .validation-error, \
    .validation-message, .form-error, .error-text";

pub const INTERACTIVE_SELECTORS: &str = "a[href], button, input, select, textarea, \
    [role=button], [role=link], [role=checkbox], [role=tab], [tabindex], [contenteditable]";

const MAX_TOASTS: usize = 5;
const MAX_VALIDATION_MESSAGES: usize = 10;
const MAX_MESSAGE_CHARS: usize = 200;

pub struct UiStateAnalyzer;

impl UiStateAnalyzer {
    pub fn analyze(page: &dyn PageInspector) -> Result<UiStateAnalysis, PageError> {
        let loading = visible_matches(page, LOADING_SELECTORS)?.len();
        let errors = visible_matches(page, ERROR_SELECTORS)?.len();
        let empty = visible_matches(page, EMPTY_SELECTORS)?.len();

        let page_state = Self::classify(page.ready_state(), loading, errors, empty);

        let toast_messages = visible_matches(page, TOAST_SELECTORS)?
            .into_iter()
            .filter_map(|id| rendered_text(page, id))
            .map(|text| cap(&text, MAX_MESSAGE_CHARS))
            .take(MAX_TOASTS)
            .collect();

        let analysis = UiStateAnalysis {
            page_state,
            loading_indicators: loading,
            error_indicators: errors,
            empty_states: empty,
            disabled_controls: visible_matches(page, DISABLED_SELECTORS)?.len(),
            toast_messages,
            validation_messages: Self::validation_messages(page)?,
            has_open_modal: !visible_matches(page, MODAL_SELECTORS)?.is_empty(),
            interactive_elements: visible_matches(page, INTERACTIVE_SELECTORS)?.len(),
        };
        debug!(
            state = ?analysis.page_state,
            loading = loading,
            errors = errors,
            empty = empty,
            "UI state analyzed"
        );
        Ok(analysis)
    }

    /// Loading outranks error, which outranks empty.
    pub fn classify(ready: ReadyState, loading: usize, errors: usize, empty: usize) -> PageState {
        if loading > errors || ready != ReadyState::Complete {
            PageState::Loading
        } else if errors > 0 {
            PageState::Error
        } else if empty > 0 {
            PageState::Empty
        } else {
            PageState::Normal
        }
    }

    /// Messages of validation markers, then of the elements that invalid
    /// fields point at through `aria-errormessage` or `aria-describedby`.
    fn validation_messages(page: &dyn PageInspector) -> Result<Vec<String>, PageError> {
        let mut sources = visible_matches(page, VALIDATION_SELECTORS)?;
        for field in page.query_all("[aria-invalid=true]")? {
            let refs = page
                .attribute(field, "aria-errormessage")
                .or_else(|| page.attribute(field, "aria-describedby"))
                .unwrap_or_default();
            for id in refs.split_whitespace() {
                if let Some(target) = element_by_id(page, id)? {
                    if page.is_visible(target) && !sources.contains(&target) {
                        sources.push(target);
                    }
                }
            }
        }

        let mut messages: Vec<String> = Vec::new();
        for id in sources {
            let Some(text) = rendered_text(page, id) else {
                continue;
            };
            let text = cap(&text, MAX_MESSAGE_CHARS);
            if !messages.contains(&text) {
                messages.push(text);
            }
            if messages.len() == MAX_VALIDATION_MESSAGES {
                break;
            }
        }
        Ok(messages)
    }
}
