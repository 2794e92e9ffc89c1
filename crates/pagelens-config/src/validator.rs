//! Configuration validation.

use crate::error::ConfigError;
use crate::schema::{Config, ScoringConfig};

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Turn the first error into a `ConfigError`.
    pub fn into_result(self) -> Result<Vec<ValidationWarning>, ConfigError> {
        match self.errors.into_iter().next() {
            Some(err) => Err(ConfigError::InvalidValue {
                field: err.path,
                message: err.message,
            }),
            None => Ok(self.warnings),
        }
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::validate_limits(config, &mut result);
        Self::validate_scoring(config, &mut result);
        Self::validate_capture(config, &mut result);
        Self::validate_replacement(config, &mut result);

        result
    }

    fn validate_limits(config: &Config, result: &mut ValidationResult) {
        let limits = &config.limits;
        let caps = [
            ("limits.max_visible_text", limits.max_visible_text),
            ("limits.max_section_html", limits.max_section_html),
            ("limits.max_total_html", limits.max_total_html),
            ("limits.max_sections", limits.max_sections),
            ("limits.max_headings", limits.max_headings),
            ("limits.max_errors", limits.max_errors),
            ("limits.max_error_message", limits.max_error_message),
            ("limits.max_selected_text", limits.max_selected_text),
        ];
        for (path, value) in caps {
            if value == 0 {
                result.add_error(ValidationError::new(path, "must be greater than 0"));
            }
        }

        if limits.max_section_html > limits.max_total_html {
            result.add_error(ValidationError::new(
                "limits.max_section_html",
                "per-section cap cannot exceed limits.max_total_html",
            ));
        }

        // Truncation markers need room.
        if limits.max_section_html > 0 && limits.max_section_html < 16 {
            result.add_warning(ValidationWarning::new(
                "limits.max_section_html",
                "sections this small carry almost no markup",
            ));
        }
    }

    fn validate_scoring(config: &Config, result: &mut ValidationResult) {
        if config.scoring.keep_threshold >= 100 {
            result.add_error(ValidationError::new(
                "scoring.keep_threshold",
                "threshold must be below 100 or no section can ever be kept",
            ));
        }

        if config.scoring != ScoringConfig::default() {
            result.add_warning(ValidationWarning::new(
                "scoring",
                "relevance weights differ from the tuned defaults; section ranking will change",
            ));
        }
    }

    fn validate_capture(config: &Config, result: &mut ValidationResult) {
        let capture = &config.capture;
        let capacities = [
            ("capture.runtime_error_capacity", capture.runtime_error_capacity),
            ("capture.network_error_capacity", capture.network_error_capacity),
            ("capture.console_log_capacity", capture.console_log_capacity),
        ];
        for (path, value) in capacities {
            if value == 0 {
                result.add_error(ValidationError::new(path, "capacity must be greater than 0"));
            }
        }

        if capture.resource_timing_window_ms <= 0.0 {
            result.add_error(ValidationError::new(
                "capture.resource_timing_window_ms",
                "window must be positive",
            ));
        }
    }

    fn validate_replacement(config: &Config, result: &mut ValidationResult) {
        let attr = &config.replacement.target_attribute;
        if attr.is_empty() {
            result.add_error(ValidationError::new(
                "replacement.target_attribute",
                "attribute name cannot be empty",
            ));
        } else if !attr.starts_with("data-") {
            result.add_warning(ValidationWarning::new(
                "replacement.target_attribute",
                "non data-* attributes may collide with page markup",
            ));
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
