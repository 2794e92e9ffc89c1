//! Request/response contract between the engine and its callers.

use serde::{Deserialize, Serialize};

use super::context::{ContextPayload, ExtractedError, PlatformDetection};
use super::selection::{SelectionContext, SelectionTrigger, TextReplacementResult};

/// Switches for one extraction pass. Everything is on by default except
/// `selected_text_only`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtractionOptions {
    pub selected_text_only: bool,
    pub include_console_logs: bool,
    pub include_network_errors: bool,
    pub include_code_blocks: bool,
    pub include_tables: bool,
    pub include_form_context: bool,
    pub include_platform_specific: bool,
    #[serde(rename = "includeUIState")]
    pub include_ui_state: bool,
    pub include_runtime_errors: bool,
    pub include_performance_network_errors: bool,
    pub apply_privacy_masking: bool,
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        Self {
            selected_text_only: false,
            include_console_logs: true,
            include_network_errors: true,
            include_code_blocks: true,
            include_tables: true,
            include_form_context: true,
            include_platform_specific: true,
            include_ui_state: true,
            include_runtime_errors: true,
            include_performance_network_errors: true,
            apply_privacy_masking: true,
        }
    }
}

/// Streamed quick-action protocol: `START`, any number of `DELTA`, then one
/// `COMPLETE` or `ERROR`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum QuickActionEvent {
    Start {
        #[serde(default)]
        action_id: Option<String>,
    },
    Delta {
        full_content: String,
    },
    Complete {
        final_content: String,
    },
    Error {
        error: String,
    },
}

/// Inbound messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum Request {
    ExtractContext {
        #[serde(default)]
        options: ExtractionOptions,
    },
    GetPlatform,
    GetErrors,
    GetSelection,
    SelectionEvent {
        trigger: SelectionTrigger,
    },
    ReplaceSelection {
        new_text: String,
    },
    QuickAction {
        event: QuickActionEvent,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<ContextPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub extraction_time_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformResponse {
    pub platform: PlatformDetection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorsResponse {
    pub errors: Vec<ExtractedError>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionResponse {
    pub selected_text: Option<String>,
    pub selection_context: Option<SelectionContext>,
}

/// Where a quick action stands after an event was applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum QuickActionStatus {
    Pending { has_selection: bool },
    Streaming { content_length: usize },
    Previewed { content: String },
    Replaced { result: TextReplacementResult },
    Failed { error: String },
    Ignored { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureResponse {
    pub success: bool,
    pub error: String,
}

impl FailureResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

/// Outbound messages.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Response {
    Extraction(ExtractionResponse),
    Platform(PlatformResponse),
    Errors(ErrorsResponse),
    Selection(SelectionResponse),
    Replacement(TextReplacementResult),
    QuickAction(QuickActionStatus),
    Failure(FailureResponse),
}
