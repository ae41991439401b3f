//! Configuration schema types.
//!
//! Every section rejects unknown keys and fills missing ones from its
//! defaults, so a file only needs to name what it changes.

use crate::ConfigError;
use kiln_core::ApiConfig;
use kiln_server::{
    ServerConfig, DEFAULT_BODY_TIMEOUT_SECS, DEFAULT_HTTP_ADDR, DEFAULT_SHUTDOWN_TIMEOUT_SECS,
};
use kiln_telemetry::LogConfig;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

/// Log levels accepted by [`LoggingSection::level`].
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Root configuration of a Kiln service.
///
/// # Example
///
/// ```
/// use kiln_config::KilnConfig;
///
/// let config: KilnConfig = toml::from_str(
///     r#"
///     [api]
///     path_prefix = "v1/"
///     "#,
/// )
/// .unwrap();
///
/// assert_eq!(config.api.collection_path("hello"), "/v1/hello");
/// assert_eq!(config.server.http_addr, "0.0.0.0:8080");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KilnConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerSection,

    /// Where the API is mounted.
    #[serde(default)]
    pub api: ApiConfig,

    /// Log output.
    #[serde(default)]
    pub logging: LoggingSection,
}

impl KilnConfig {
    /// Human-readable logs at `debug`, everything else default.
    #[must_use]
    pub fn development() -> Self {
        Self {
            logging: LoggingSection {
                level: "debug".to_string(),
                format: LogFormat::Pretty,
            },
            ..Self::default()
        }
    }

    /// Checks values serde cannot: the bind address parses, the log level
    /// is known, the path prefix is relative and the docs path is non-empty.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.http_addr.parse::<SocketAddr>().is_err() {
            return Err(ConfigError::validation_error(
                "server.http_addr",
                format!("'{}' is not a socket address", self.server.http_addr),
            ));
        }

        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::validation_error(
                "logging.level",
                format!("expected one of {}", LOG_LEVELS.join(", ")),
            ));
        }

        if self.api.path_prefix.starts_with('/') {
            return Err(ConfigError::validation_error(
                "api.path_prefix",
                "must not start with '/'",
            ));
        }

        if self.api.docs_path.as_deref().is_some_and(str::is_empty) {
            return Err(ConfigError::validation_error("api.docs_path", "must not be empty"));
        }

        Ok(())
    }
}

/// Server configuration section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    /// HTTP server bind address (e.g., "0.0.0.0:8080").
    #[serde(default = "default_http_addr")]
    pub http_addr: String,

    /// Graceful shutdown timeout in seconds.
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,

    /// Request body read timeout in seconds.
    #[serde(default = "default_body_timeout")]
    pub body_timeout_secs: u64,

    /// HTTP/1.1 keep-alive.
    #[serde(default = "default_true")]
    pub keep_alive: bool,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            http_addr: default_http_addr(),
            shutdown_timeout_secs: default_shutdown_timeout(),
            body_timeout_secs: default_body_timeout(),
            keep_alive: true,
        }
    }
}

impl From<&ServerSection> for ServerConfig {
    fn from(section: &ServerSection) -> Self {
        ServerConfig::builder()
            .http_addr(section.http_addr.clone())
            .shutdown_timeout(Duration::from_secs(section.shutdown_timeout_secs))
            .body_timeout(Duration::from_secs(section.body_timeout_secs))
            .keep_alive(section.keep_alive)
            .build()
    }
}

fn default_http_addr() -> String {
    DEFAULT_HTTP_ADDR.to_string()
}

fn default_shutdown_timeout() -> u64 {
    DEFAULT_SHUTDOWN_TIMEOUT_SECS
}

fn default_body_timeout() -> u64 {
    DEFAULT_BODY_TIMEOUT_SECS
}

fn default_true() -> bool {
    true
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per event.
    #[default]
    Json,
    /// Multi-line human-readable output.
    Pretty,
}

/// Logging configuration section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingSection {
    /// One of [`LOG_LEVELS`].
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::Json,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl From<&LoggingSection> for LogConfig {
    fn from(section: &LoggingSection) -> Self {
        let preset = match section.format {
            LogFormat::Json => LogConfig::production(),
            LogFormat::Pretty => LogConfig::development(),
        };
        preset.with_level(section.level.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_section_default_matches_server() {
        let config = ServerConfig::from(&ServerSection::default());
        assert_eq!(config, ServerConfig::builder().build());
    }

    #[test]
    fn test_server_section_conversion() {
        let section = ServerSection {
            http_addr: "127.0.0.1:3000".to_string(),
            shutdown_timeout_secs: 5,
            body_timeout_secs: 2,
            keep_alive: false,
        };
        let config = ServerConfig::from(&section);
        assert_eq!(config.http_addr(), "127.0.0.1:3000");
        assert_eq!(config.shutdown_timeout(), Duration::from_secs(5));
        assert_eq!(config.body_timeout(), Duration::from_secs(2));
        assert!(!config.keep_alive());
    }

    #[test]
    fn test_partial_section_keeps_defaults() {
        let config: KilnConfig = toml::from_str("[server]\nkeep_alive = false\n").unwrap();
        assert!(!config.server.keep_alive);
        assert_eq!(config.server.http_addr, DEFAULT_HTTP_ADDR);
        assert_eq!(config.logging, LoggingSection::default());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<KilnConfig, _> = toml::from_str("[server]\nmax_connections = 10\n");
        assert!(result.is_err());

        let result: Result<KilnConfig, _> = toml::from_str("[metrics]\nenabled = true\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_log_format_deserialize() {
        let section: LoggingSection =
            serde_json::from_str(r#"{"level":"warn","format":"pretty"}"#).unwrap();
        assert_eq!(section.format, LogFormat::Pretty);

        let log = LogConfig::from(&section);
        assert!(!log.json_format);
        assert_eq!(log.level, "warn");
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(KilnConfig::default().validate().is_ok());
        assert!(KilnConfig::development().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = KilnConfig::default();
        config.server.http_addr = "localhost".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError { field, .. }) if field == "server.http_addr"
        ));

        let mut config = KilnConfig::default();
        config.logging.level = "verbose".to_string();
        assert!(config.validate().is_err());

        let mut config = KilnConfig::default();
        config.api.path_prefix = "/v1/".to_string();
        assert!(config.validate().is_err());

        let mut config = KilnConfig::default();
        config.api.docs_path = Some(String::new());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_development_preset() {
        let config = KilnConfig::development();
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.server, ServerSection::default());
    }
}
