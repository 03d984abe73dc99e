//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::ProjectConfig;
use std::path::Path;

/// Name of the configuration file looked up in the project root.
pub const CONFIG_FILE: &str = "classfold.toml";

/// Loads and validates `classfold.toml` from a project directory.
pub fn load_config(project_dir: &Path) -> Result<ProjectConfig, ConfigError> {
    load_config_file(&project_dir.join(CONFIG_FILE))
}

/// Loads and validates a configuration file at an explicit path.
pub fn load_config_file(path: &Path) -> Result<ProjectConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::IoError {
        path: path.to_path_buf(),
        source,
    })?;
    load_config_from_str(&content)
}

/// Parses and validates a configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<ProjectConfig, ConfigError> {
    let config: ProjectConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates that required fields are present and values are consistent.
pub fn validate_config(config: &ProjectConfig) -> Result<(), ConfigError> {
    if config.scan.file_types.is_empty() {
        return Err(ConfigError::MissingField("scan.file_types".to_string()));
    }
    if config.scan.file_types.iter().any(|ext| ext.is_empty()) {
        return Err(ConfigError::ValidationError(
            "scan.file_types entries must not be empty".to_string(),
        ));
    }
    if let Some(bad) = config
        .naming
        .prefix
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
    {
        return Err(ConfigError::ValidationError(format!(
            "naming.prefix contains '{bad}'; only letters, digits, '-' and '_' are allowed"
        )));
    }
    if config.naming.timeout_ms == 0 {
        return Err(ConfigError::ValidationError(
            "naming.timeout_ms must be greater than zero".to_string(),
        ));
    }
    if config.naming.use_strategy && config.naming.endpoint.trim().is_empty() {
        return Err(ConfigError::MissingField("naming.endpoint".to_string()));
    }
    if config.cache.path.trim().is_empty() {
        return Err(ConfigError::MissingField("cache.path".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_empty_config() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config, ProjectConfig::default());
        assert_eq!(config.scan.root, "src");
        assert!(!config.scan.order_matters);
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
[scan]
root = "web"
file_types = [".html", ".vue"]
excluded_directories = ["vendor"]
order_matters = true

[naming]
prefix = "ui_"
use_strategy = true
endpoint = "http://naming.local/ask?q="
max_invocations = 12
timeout_ms = 2500

[css]
utilities = "tools/utilities.json"

[cache]
path = ".classfold/cache.json"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.scan.root, "web");
        assert_eq!(config.scan.file_types, vec![".html", ".vue"]);
        assert_eq!(config.scan.excluded_directories, vec!["vendor"]);
        assert!(config.scan.order_matters);
        assert_eq!(config.naming.prefix, "ui_");
        assert!(config.naming.use_strategy);
        assert_eq!(config.naming.max_invocations, 12);
        assert_eq!(config.naming.timeout_ms, 2500);
        assert_eq!(config.css.utilities, "tools/utilities.json");
        assert_eq!(config.cache.path, ".classfold/cache.json");
    }

    #[test]
    fn empty_file_types_errors() {
        let err = load_config_from_str("[scan]\nfile_types = []\n").unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(_)));
    }

    #[test]
    fn prefix_outside_charset_errors() {
        let err = load_config_from_str("[naming]\nprefix = \"my prefix.\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn empty_prefix_is_allowed() {
        let config = load_config_from_str("[naming]\nprefix = \"\"\n").unwrap();
        assert_eq!(config.naming.prefix, "");
    }

    #[test]
    fn zero_timeout_errors() {
        let err = load_config_from_str("[naming]\ntimeout_ms = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn strategy_without_endpoint_errors() {
        let toml = "[naming]\nuse_strategy = true\nendpoint = \"\"\n";
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(_)));
    }

    #[test]
    fn invalid_toml_errors() {
        let err = load_config_from_str("this is not valid toml {{{}}}").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "[naming]\nprefix = \"x-\"\n").unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.naming.prefix, "x-");
    }

    #[test]
    fn io_error_from_nonexistent_dir() {
        let err = load_config(Path::new("/nonexistent/dir")).unwrap_err();
        assert!(matches!(err, ConfigError::IoError { .. }));
    }
}
