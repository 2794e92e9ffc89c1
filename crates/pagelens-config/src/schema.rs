//! Configuration schema definitions.
//!
//! Every default here is a hand-tuned value kept for behavioral
//! compatibility with the extension's existing output.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub limits: LimitsConfig,

    #[serde(default)]
    pub scoring: ScoringConfig,

    #[serde(default)]
    pub capture: CaptureConfig,

    #[serde(default)]
    pub replacement: ReplacementConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Hard size caps applied to every extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub max_visible_text: usize,
    pub max_section_html: usize,
    pub max_total_html: usize,
    pub max_sections: usize,
    pub max_headings: usize,
    pub max_heading_text: usize,
    pub max_errors: usize,
    pub max_error_message: usize,
    pub max_console_logs: usize,
    pub max_selected_text: usize,
    pub max_runtime_errors: usize,
    pub max_network_errors: usize,
    pub max_code_blocks: usize,
    pub max_code_block_text: usize,
    pub max_tables: usize,
    pub max_table_rows: usize,
    pub max_table_columns: usize,
    pub max_table_cell: usize,
    pub max_forms: usize,
    pub max_form_fields: usize,
    pub max_modal_text: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_visible_text: 10_000,
            max_section_html: 500,
            max_total_html: 5_000,
            max_sections: 10,
            max_headings: 50,
            max_heading_text: 200,
            max_errors: 20,
            max_error_message: 500,
            max_console_logs: 100,
            max_selected_text: 5_000,
            max_runtime_errors: 50,
            max_network_errors: 50,
            max_code_blocks: 10,
            max_code_block_text: 2_000,
            max_tables: 5,
            max_table_rows: 20,
            max_table_columns: 10,
            max_table_cell: 100,
            max_forms: 5,
            max_form_fields: 30,
            max_modal_text: 1_000,
        }
    }
}

/// Additive relevance weights for section scoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub alert_marker: i32,
    pub error_text: i32,
    pub failed_text: i32,
    pub warning_text: i32,
    pub heading: i32,
    pub landmark: i32,
    pub structural: i32,
    pub contains_focus: i32,
    pub dialog: i32,
    pub panel: i32,
    pub oversized_penalty: i32,
    pub oversized_threshold: usize,
    pub undersized_penalty: i32,
    pub undersized_threshold: usize,
    /// Sections must score strictly above this to be kept.
    pub keep_threshold: u8,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            alert_marker: 50,
            error_text: 30,
            failed_text: 25,
            warning_text: 20,
            heading: 20,
            landmark: 15,
            structural: 10,
            contains_focus: 40,
            dialog: 35,
            panel: 15,
            oversized_penalty: 20,
            oversized_threshold: 5_000,
            undersized_penalty: 10,
            undersized_threshold: 10,
            keep_threshold: 30,
        }
    }
}

/// Passive capture ring-buffer capacities and fallback heuristics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub runtime_error_capacity: usize,
    pub network_error_capacity: usize,
    pub console_log_capacity: usize,
    pub max_message_chars: usize,
    pub max_stack_chars: usize,
    /// Only resource-timing entries this recent are inspected.
    pub resource_timing_window_ms: f64,
    /// Zero-byte transfers shorter than this are assumed to be cache hits.
    pub resource_timing_min_duration_ms: f64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            runtime_error_capacity: 50,
            network_error_capacity: 50,
            console_log_capacity: 100,
            max_message_chars: 1_000,
            max_stack_chars: 2_000,
            resource_timing_window_ms: 60_000.0,
            resource_timing_min_duration_ms: 50.0,
        }
    }
}

/// What to do with a completed quick action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuickActionBehavior {
    /// Replace the captured selection with the final content.
    AutoReplace,
    /// Hand the final content back without touching the page.
    #[default]
    Preview,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplacementConfig {
    #[serde(default)]
    pub quick_action_behavior: QuickActionBehavior,

    /// Attribute stamped onto elements that own a captured selection.
    #[serde(default = "default_target_attribute")]
    pub target_attribute: String,
}

impl Default for ReplacementConfig {
    fn default() -> Self {
        Self {
            quick_action_behavior: QuickActionBehavior::default(),
            target_attribute: default_target_attribute(),
        }
    }
}

fn default_target_attribute() -> String {
    "data-pagelens-target".to_string()
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for daily rolling log files; console only when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,

    #[serde(default = "default_max_log_files")]
    pub max_log_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: None,
            max_log_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    7
}
