//! Configuration file parsing for the server.
//!
//! Loads settings from TOML files including bind address, model selection and
//! analyzer limits. Every field has a default, so a missing file or a partial
//! one is fine. Environment variables are applied on top.

use clausewise_analyzer::AnalyzerConfig;
use clausewise_llm::gemini::{DEFAULT_ENDPOINT, DEFAULT_MODEL};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Environment variable holding the Gemini API key
pub const API_KEY_VAR: &str = "GEMINI_API_KEY";

/// Environment variable overriding the bind port
pub const PORT_VAR: &str = "PORT";

/// Server configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// A value was present but unusable
    #[error("Invalid value for {field}: {message}")]
    InvalidValue {
        /// Setting name
        field: String,
        /// What was wrong with it
        message: String,
    },
}

/// Server configuration loaded from TOML
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0")
    pub bind_address: String,

    /// Bind port (default: 3000)
    pub bind_port: u16,

    /// Model provider settings
    pub llm: LlmConfig,

    /// Analysis limits and cache lifetime
    pub analyzer: AnalyzerConfig,
}

/// Model provider settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Model identifier (e.g., "gemini-2.5-flash")
    pub model: String,

    /// API base URL
    pub endpoint: String,

    /// API key; normally supplied through `GEMINI_API_KEY` rather than the file
    pub api_key: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            bind_port: 3000,
            llm: LlmConfig::default(),
            analyzer: AnalyzerConfig::default(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: ServerConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `PORT` and `GEMINI_API_KEY` overrides using `lookup` to read variables
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup(PORT_VAR) {
            self.bind_port = port.trim().parse().map_err(|_| ConfigError::InvalidValue {
                field: PORT_VAR.to_string(),
                message: format!("'{}' is not a valid port", port),
            })?;
        }

        if let Some(key) = lookup(API_KEY_VAR).filter(|k| !k.trim().is_empty()) {
            self.llm.api_key = Some(key);
        }

        Ok(())
    }

    /// Check values that deserialize fine but cannot be used
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.analyzer
            .validate()
            .map_err(|message| ConfigError::InvalidValue {
                field: "analyzer".to_string(),
                message,
            })?;

        if self.llm.model.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "llm.model".to_string(),
                message: "must not be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Get the full bind address (address:port)
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.bind_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
        assert_eq!(config.llm.model, "gemini-2.5-flash");
        assert_eq!(config.llm.api_key, None);
        assert_eq!(config.analyzer.max_text_length, 50_000);
        assert_eq!(config.analyzer.cache_ttl_secs, 86_400);
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
            bind_address = "127.0.0.1"
            bind_port = 8080

            [llm]
            model = "gemini-2.0-flash"

            [analyzer]
            max_text_length = 20000
        "#;

        let config: ServerConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
        assert_eq!(config.llm.model, "gemini-2.0-flash");
        assert_eq!(config.llm.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.analyzer.max_text_length, 20_000);
        assert_eq!(config.analyzer.cache_ttl_secs, 86_400);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "bind_port = 4000").unwrap();

        let config = ServerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.bind_port, 4000);
        assert_eq!(config.bind_address, "0.0.0.0");
    }

    #[test]
    fn test_from_file_rejects_zero_ttl() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[analyzer]\ncache_ttl_secs = 0").unwrap();

        let err = ServerConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = ServerConfig::from_file("/nonexistent/clausewise.toml").unwrap_err();
        assert!(matches!(err, ConfigError::FileRead(_)));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = ServerConfig::default();
        config
            .apply_env(env(&[("PORT", "8123"), ("GEMINI_API_KEY", "secret")]))
            .unwrap();
        assert_eq!(config.bind_port, 8123);
        assert_eq!(config.llm.api_key.as_deref(), Some("secret"));
    }

    #[test]
    fn test_blank_api_key_ignored() {
        let mut config = ServerConfig::default();
        config.apply_env(env(&[("GEMINI_API_KEY", "  ")])).unwrap();
        assert_eq!(config.llm.api_key, None);
    }

    #[test]
    fn test_bad_port() {
        let mut config = ServerConfig::default();
        let err = config.apply_env(env(&[("PORT", "eighty")])).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }
}
