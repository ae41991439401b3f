//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file not found.
    #[error("configuration file not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// Failed to read configuration file.
    #[error("failed to read configuration file: {path}")]
    ReadError {
        /// Path to the file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The content is not valid for its format, or names unknown keys.
    #[error("failed to parse {format} configuration: {message}")]
    ParseError {
        /// `TOML`, `JSON` or `dotenv`.
        format: &'static str,
        /// Parser message.
        message: String,
    },

    /// An environment override could not be applied.
    #[error("failed to apply environment variable {var}: {reason}")]
    EnvVarError {
        /// The environment variable name.
        var: String,
        /// Explanation of the failure.
        reason: String,
    },

    /// A value is syntactically fine but not acceptable.
    #[error("invalid configuration value for {field}: {reason}")]
    ValidationError {
        /// Dotted path of the offending field.
        field: String,
        /// Explanation of why the value is invalid.
        reason: String,
    },

    /// Neither TOML nor JSON.
    #[error("unsupported configuration format: {0}")]
    UnsupportedFormat(String),
}

impl ConfigError {
    /// Create a new file not found error.
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Create a new read error.
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadError {
            path: path.into(),
            source,
        }
    }

    /// Create a new environment variable error.
    pub fn env_var_error(var: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::EnvVarError {
            var: var.into(),
            reason: reason.into(),
        }
    }

    /// Create a new validation error.
    pub fn validation_error(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        Self::ParseError {
            format: "TOML",
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::ParseError {
            format: "JSON",
            message: err.to_string(),
        }
    }
}

impl From<dotenvy::Error> for ConfigError {
    fn from(err: dotenvy::Error) -> Self {
        Self::ParseError {
            format: "dotenv",
            message: err.to_string(),
        }
    }
}
