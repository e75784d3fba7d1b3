//! Order service configuration, loaded from TOML.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tableside_core::StaffId;
use thiserror::Error;

/// Request timeout used when the config file does not set one.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("base_url must start with http:// or https:// (got '{0}')")]
    InvalidBaseUrl(String),

    #[error("timeout_secs must be greater than zero")]
    ZeroTimeout,
}

/// Where and how orders are submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Base URL of the REST backend, e.g. `http://localhost:8080/api`.
    pub base_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Staff member used when the caller does not name one.
    #[serde(default)]
    pub default_staff_id: Option<StaffId>,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl ServiceConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            default_staff_id: None,
        }
    }

    /// Load and validate a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidBaseUrl(self.base_url.clone()));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// `{base_url}/orders`, tolerating a trailing slash on the base.
    pub fn orders_url(&self) -> String {
        format!("{}/orders", self.base_url.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_full_config() {
        let config = ServiceConfig::from_toml(
            r#"
base_url = "https://pos.example.com/api/"
timeout_secs = 3
default_staff_id = 7
"#,
        )
        .unwrap();

        assert_eq!(config.timeout(), Duration::from_secs(3));
        assert_eq!(config.default_staff_id, Some(StaffId(7)));
        assert_eq!(config.orders_url(), "https://pos.example.com/api/orders");
    }

    #[test]
    fn timeout_defaults() {
        let config = ServiceConfig::from_toml(r#"base_url = "http://localhost:8080""#).unwrap();
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.default_staff_id, None);
        assert_eq!(config.orders_url(), "http://localhost:8080/orders");
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            ServiceConfig::from_toml(r#"base_url = "localhost:8080""#),
            Err(ConfigError::InvalidBaseUrl(_))
        ));
        assert!(matches!(
            ServiceConfig::from_toml("base_url = \"http://x\"\ntimeout_secs = 0"),
            Err(ConfigError::ZeroTimeout)
        ));
        assert!(matches!(
            ServiceConfig::from_toml("timeout_secs = 5"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "base_url = \"http://127.0.0.1:9000\"").unwrap();

        let config = ServiceConfig::from_file(file.path()).unwrap();
        assert_eq!(config, ServiceConfig::new("http://127.0.0.1:9000"));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = ServiceConfig::from_file(Path::new("/nonexistent/service.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/service.toml"));
    }
}
