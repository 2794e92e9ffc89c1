use super::*;

#[test]
fn test_validate_default_config() {
    let config = Config::default();
    let result = ConfigValidator::validate(&config);
    assert!(result.is_valid());
    assert!(result.warnings.is_empty());
}

#[test]
fn test_validate_zero_cap() {
    let mut config = Config::default();
    config.limits.max_errors = 0;

    let result = ConfigValidator::validate(&config);
    assert!(!result.is_valid());
    assert!(result.errors.iter().any(|e| e.path == "limits.max_errors"));
}

#[test]
fn test_validate_section_cap_above_total() {
    let mut config = Config::default();
    config.limits.max_section_html = 6_000;

    let result = ConfigValidator::validate(&config);
    assert!(result.errors.iter().any(|e| e.path == "limits.max_section_html"));
}

#[test]
fn test_validate_threshold_out_of_range() {
    let mut config = Config::default();
    config.scoring.keep_threshold = 100;

    let result = ConfigValidator::validate(&config);
    assert!(result.errors.iter().any(|e| e.path == "scoring.keep_threshold"));
}

#[test]
fn test_changed_weights_warn() {
    let mut config = Config::default();
    config.scoring.dialog = 60;

    let result = ConfigValidator::validate(&config);
    assert!(result.is_valid());
    assert!(result.warnings.iter().any(|w| w.path == "scoring"));
}

#[test]
fn test_validate_zero_capacity() {
    let mut config = Config::default();
    config.capture.console_log_capacity = 0;

    let result = ConfigValidator::validate(&config);
    assert!(result.errors.iter().any(|e| e.path == "capture.console_log_capacity"));
}

#[test]
fn test_validate_target_attribute() {
    let mut config = Config::default();
    config.replacement.target_attribute = String::new();
    assert!(!ConfigValidator::validate(&config).is_valid());

    config.replacement.target_attribute = "pagelens-id".to_string();
    let result = ConfigValidator::validate(&config);
    assert!(result.is_valid());
    assert_eq!(result.warnings.len(), 1);
}

#[test]
fn test_into_result_reports_first_error() {
    let mut config = Config::default();
    config.limits.max_visible_text = 0;

    let err = ConfigValidator::validate(&config).into_result().unwrap_err();
    assert!(err.to_string().contains("limits.max_visible_text"));
}

#[test]
fn test_validation_result_default() {
    let result = ValidationResult::default();
    assert!(result.is_valid());
    assert!(result.errors.is_empty());
    assert!(result.warnings.is_empty());
}
