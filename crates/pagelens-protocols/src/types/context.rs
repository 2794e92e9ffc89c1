//! Extraction results and the context payload handed to the assistant.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::capture::{CapturedConsoleLog, CapturedNetworkError, CapturedRuntimeError};

// ============================================================================
// Platform
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlatformType {
    Github,
    Gitlab,
    Jira,
    Confluence,
    AwsConsole,
    GcpConsole,
    AzurePortal,
    Vercel,
    Netlify,
    StackOverflow,
    Slack,
    Notion,
    GoogleWorkspace,
    Salesforce,
    Linear,
    Generic,
}

impl fmt::Display for PlatformType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PlatformType::Github => "github",
            PlatformType::Gitlab => "gitlab",
            PlatformType::Jira => "jira",
            PlatformType::Confluence => "confluence",
            PlatformType::AwsConsole => "aws_console",
            PlatformType::GcpConsole => "gcp_console",
            PlatformType::AzurePortal => "azure_portal",
            PlatformType::Vercel => "vercel",
            PlatformType::Netlify => "netlify",
            PlatformType::StackOverflow => "stack_overflow",
            PlatformType::Slack => "slack",
            PlatformType::Notion => "notion",
            PlatformType::GoogleWorkspace => "google_workspace",
            PlatformType::Salesforce => "salesforce",
            PlatformType::Linear => "linear",
            PlatformType::Generic => "generic",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformDetection {
    #[serde(rename = "type")]
    pub platform: PlatformType,
    /// Always within `[0, 1]`.
    pub confidence: f64,
    pub indicators: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specific_product: Option<String>,
}

impl PlatformDetection {
    pub fn generic() -> Self {
        Self {
            platform: PlatformType::Generic,
            confidence: 0.0,
            indicators: Vec::new(),
            specific_product: None,
        }
    }
}

// ============================================================================
// UI state
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageState {
    Loading,
    Error,
    Empty,
    Normal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiStateAnalysis {
    pub page_state: PageState,
    pub loading_indicators: usize,
    pub error_indicators: usize,
    pub empty_states: usize,
    pub disabled_controls: usize,
    pub toast_messages: Vec<String>,
    pub validation_messages: Vec<String>,
    pub has_open_modal: bool,
    pub interactive_elements: usize,
}

// ============================================================================
// Errors shown on the page
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

/// Identifying attributes of the element an entry was read from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementSnapshot {
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedError {
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    pub message: String,
    pub severity: Severity,
    pub context: String,
    pub element: ElementSnapshot,
}

// ============================================================================
// Structure
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SectionPurpose {
    Alert,
    ErrorContainer,
    Form,
    Table,
    CodeBlock,
    Panel,
    Modal,
    Generic,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HtmlSection {
    pub purpose: SectionPurpose,
    pub score: u8,
    #[serde(rename = "outerHTML")]
    pub outer_html: String,
    pub text_content: String,
    pub attributes: BTreeMap<String, String>,
    pub truncated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    pub level: u8,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    pub content: String,
    pub line_count: usize,
    pub truncated: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub total_rows: usize,
    pub truncated: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub redacted_columns: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    pub tag: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    pub required: bool,
    pub disabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub redacted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    pub fields: Vec<FormField>,
    pub total_fields: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModalContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub text: String,
    pub buttons: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusedElement {
    pub tag: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub element_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub is_editable: bool,
}

// ============================================================================
// Privacy
// ============================================================================

/// Kinds of sensitive data the redactor recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensitiveCategory {
    Email,
    Jwt,
    CloudResource,
    CreditCard,
    Ssn,
    Phone,
    ApiKey,
    InternalIp,
    HexSecret,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivacyInfo {
    pub redacted_fields: Vec<String>,
    pub sensitive_data_types: BTreeSet<SensitiveCategory>,
    pub masking_applied: bool,
}

// ============================================================================
// Payload
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadMetadata {
    pub extracted_at: DateTime<Utc>,
    pub engine_version: String,
    pub selected_text_only: bool,
    /// Dotted paths of every field that was cut to its size cap.
    pub truncated_fields: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub url: String,
    pub title: String,
    pub hostname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<PlatformDetection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui_state: Option<UiStateAnalysis>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_text: Option<String>,
    pub visible_text: String,
    pub headings: Vec<Heading>,
    pub errors: Vec<ExtractedError>,
    pub console_logs: Vec<CapturedConsoleLog>,
    pub network_errors: Vec<CapturedNetworkError>,
    pub runtime_errors: Vec<CapturedRuntimeError>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureContext {
    pub sections: Vec<HtmlSection>,
    pub code_blocks: Vec<CodeBlock>,
    pub tables: Vec<TableData>,
    pub forms: Vec<FormContext>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modal: Option<ModalContext>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focused_element: Option<FocusedElement>,
}

/// Root aggregate of one extraction pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextPayload {
    pub metadata: PayloadMetadata,
    pub page: PageInfo,
    pub text: TextContext,
    pub structure: StructureContext,
    pub privacy: PrivacyInfo,
}
