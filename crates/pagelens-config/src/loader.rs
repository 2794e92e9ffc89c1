//! Configuration loader.

use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ConfigError;
use crate::schema::Config;

static ENV_VAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

/// Configuration loader with environment variable substitution.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let content = fs::read_to_string(path)?;
        Self::load_str(&content)
    }

    /// Load configuration from a file if given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Config, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Config::default()),
        }
    }

    /// Load configuration from a string.
    pub fn load_str(content: &str) -> Result<Config, ConfigError> {
        let expanded = Self::expand_env_vars(content)?;
        let mut config: Config = toml::from_str(&expanded)?;
        if let Some(dir) = config.logging.directory.take() {
            let expanded = Self::expand_path(&dir.to_string_lossy());
            config.logging.directory = Some(expanded.into());
        }
        Ok(config)
    }

    /// Expand environment variables in the format `${VAR}`.
    fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
        let mut result = content.to_string();

        for cap in ENV_VAR.captures_iter(content) {
            let var_name = &cap[1];
            let var_value = std::env::var(var_name)
                .map_err(|_| ConfigError::EnvVarNotSet(var_name.to_string()))?;
            result = result.replace(&cap[0], &var_value);
        }

        Ok(result)
    }

    /// Expand shell-style paths (e.g., `~/.pagelens`).
    pub fn expand_path(path: &str) -> String {
        shellexpand::tilde(path).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::QuickActionBehavior;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_empty_config() {
        let config = ConfigLoader::load_str("").unwrap();
        assert_eq!(config.limits.max_visible_text, 10_000);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_overrides() {
        let content = r#"
            [limits]
            max_visible_text = 2000

            [scoring]
            keep_threshold = 40

            [replacement]
            quick_action_behavior = "auto_replace"
        "#;
        let config = ConfigLoader::load_str(content).unwrap();
        assert_eq!(config.limits.max_visible_text, 2000);
        assert_eq!(config.limits.max_total_html, 5000);
        assert_eq!(config.scoring.keep_threshold, 40);
        assert_eq!(
            config.replacement.quick_action_behavior,
            QuickActionBehavior::AutoReplace
        );
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[capture]").unwrap();
        writeln!(file, "console_log_capacity = 10").unwrap();

        let config = ConfigLoader::load(file.path()).unwrap();
        assert_eq!(config.capture.console_log_capacity, 10);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = ConfigLoader::load(Path::new("/nonexistent/path/pagelens.toml"));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_or_default_without_path() {
        let config = ConfigLoader::load_or_default(None).unwrap();
        assert_eq!(config.capture.runtime_error_capacity, 50);
    }

    #[test]
    fn test_load_invalid_toml() {
        let result = ConfigLoader::load_str("limits = [unclosed");
        assert!(result.is_err());
    }

    #[test]
    fn test_expand_env_vars() {
        // SAFETY: This test runs in isolation and sets a unique test-only env var
        unsafe {
            std::env::set_var("PAGELENS_TEST_LEVEL", "debug");
        }
        let config = ConfigLoader::load_str("[logging]\nlevel = \"${PAGELENS_TEST_LEVEL}\"").unwrap();
        assert_eq!(config.logging.level, "debug");
        unsafe {
            std::env::remove_var("PAGELENS_TEST_LEVEL");
        }
    }

    #[test]
    fn test_expand_env_vars_not_set() {
        let content = "value = \"${PAGELENS_NONEXISTENT_VAR_12345}\"";
        let result = ConfigLoader::expand_env_vars(content);
        assert!(matches!(result, Err(ConfigError::EnvVarNotSet(_))));
    }

    #[test]
    fn test_log_directory_tilde_expanded() {
        let config = ConfigLoader::load_str("[logging]\ndirectory = \"~/pagelens-logs\"").unwrap();
        let dir = config.logging.directory.unwrap();
        assert!(!dir.to_string_lossy().starts_with('~'));
        assert!(dir.to_string_lossy().ends_with("pagelens-logs"));
    }
}
