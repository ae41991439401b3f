//! Layered configuration loading.

use std::env;
use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::schema::LogFormat;
use crate::{ConfigError, KilnConfig};

/// Environment prefix used when none is set.
pub const DEFAULT_ENV_PREFIX: &str = "KILN";

/// Configuration file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// TOML.
    Toml,
    /// JSON.
    Json,
}

impl Format {
    /// Picks the format from a file extension (`toml` or `json`).
    #[must_use]
    pub fn from_extension(path: &Path) -> Option<Self> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .as_deref()
        {
            Some("toml") => Some(Self::Toml),
            Some("json") => Some(Self::Json),
            _ => None,
        }
    }
}

/// Configuration loader with layered approach.
///
/// Later layers override earlier ones:
/// 1. Default values (or a preset)
/// 2. Configuration files and strings, TOML or JSON, in call order
/// 3. A `.env` file, loaded into the process environment
/// 4. Environment variables `PREFIX__SECTION__KEY`
///
/// A file only overrides the keys it names.
///
/// # Example
///
/// ```no_run
/// use kiln_config::ConfigLoader;
///
/// # fn main() -> Result<(), kiln_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_optional_file("kiln.toml")?
///     .with_dotenv()?
///     .with_env_prefix("KILN")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    config: KilnConfig,
    env_prefix: Option<String>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a loader holding the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: KilnConfig::default(),
            env_prefix: None,
        }
    }

    /// Start over from the development preset.
    ///
    /// # Example
    ///
    /// ```
    /// use kiln_config::{ConfigLoader, LogFormat};
    ///
    /// let config = ConfigLoader::new().with_development().load().unwrap();
    /// assert_eq!(config.logging.format, LogFormat::Pretty);
    /// ```
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = KilnConfig::development();
        self
    }

    /// Layer a configuration file on top. The format follows the extension.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file is missing or unreadable, has an
    /// unsupported extension, does not parse, or names unknown keys.
    pub fn with_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let format = Format::from_extension(path)
            .ok_or_else(|| ConfigError::UnsupportedFormat(path.display().to_string()))?;

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;

        self.with_str(&content, format)
    }

    /// Like [`with_file`](Self::with_file), but a missing file is skipped.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be loaded.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Layer configuration from a string.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ParseError` if the content is invalid or names
    /// unknown keys.
    ///
    /// # Example
    ///
    /// ```
    /// use kiln_config::{ConfigLoader, Format};
    ///
    /// let config = ConfigLoader::new()
    ///     .with_str("[server]\nhttp_addr = \"127.0.0.1:3000\"\n", Format::Toml)
    ///     .unwrap()
    ///     .with_str(r#"{"api":{"path_prefix":"v1/"}}"#, Format::Json)
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.server.http_addr, "127.0.0.1:3000");
    /// assert_eq!(config.api.path_prefix, "v1/");
    /// ```
    pub fn with_str(mut self, content: &str, format: Format) -> Result<Self, ConfigError> {
        // Parsing into the schema first reports unknown keys in the
        // source's own format.
        let overlay = match format {
            Format::Toml => {
                toml::from_str::<KilnConfig>(content)?;
                toml::from_str::<Value>(content)?
            }
            Format::Json => {
                serde_json::from_str::<KilnConfig>(content)?;
                serde_json::from_str::<Value>(content)?
            }
        };

        let mut merged = serde_json::to_value(&self.config)?;
        merge(&mut merged, overlay);
        self.config = serde_json::from_value(merged)?;
        Ok(self)
    }

    /// Set the environment variable prefix for overrides.
    ///
    /// Variables use the format `PREFIX__SECTION__KEY`, e.g.
    /// `KILN__SERVER__HTTP_ADDR=0.0.0.0:9000`.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Use [`DEFAULT_ENV_PREFIX`] for environment overrides.
    #[must_use]
    pub fn with_default_env(self) -> Self {
        self.with_env_prefix(DEFAULT_ENV_PREFIX)
    }

    /// Load `.env` from the working directory (or a parent) into the
    /// process environment. A missing file is skipped.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ParseError` if the file exists but is malformed.
    pub fn with_dotenv(self) -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(_) => Ok(self),
            Err(e) if e.not_found() => Ok(self),
            Err(e) => Err(e.into()),
        }
    }

    /// Load a specific dotenv file into the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file is missing or malformed.
    pub fn with_dotenv_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }
        dotenvy::from_path(path)?;
        Ok(self)
    }

    /// Apply environment overrides (if a prefix was set), validate, and
    /// return the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an override cannot be applied or validation
    /// fails.
    ///
    /// # Example
    ///
    /// ```
    /// use kiln_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new().load().unwrap();
    /// assert_eq!(config.server.http_addr, "0.0.0.0:8080");
    /// ```
    pub fn load(mut self) -> Result<KilnConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            self.apply_env_vars(&prefix, env::vars())?;
        }

        self.config.validate()?;

        Ok(self.config)
    }

    /// Return the configuration without environment overrides or
    /// validation.
    #[must_use]
    pub fn load_unvalidated(self) -> KilnConfig {
        self.config
    }

    fn apply_env_vars(
        &mut self,
        prefix: &str,
        vars: impl Iterator<Item = (String, String)>,
    ) -> Result<(), ConfigError> {
        let section_prefix = format!("{prefix}__");
        for (key, value) in vars {
            if let Some(path) = key.strip_prefix(&section_prefix) {
                self.apply_env_var(&key, path, &value)?;
            }
        }
        Ok(())
    }

    fn apply_env_var(&mut self, key: &str, path: &str, value: &str) -> Result<(), ConfigError> {
        let parts: Vec<&str> = path.split("__").collect();

        match parts.as_slice() {
            ["SERVER", "HTTP_ADDR"] => {
                self.config.server.http_addr = value.to_string();
            }
            ["SERVER", "SHUTDOWN_TIMEOUT_SECS"] => {
                self.config.server.shutdown_timeout_secs = parse_secs(key, value)?;
            }
            ["SERVER", "BODY_TIMEOUT_SECS"] => {
                self.config.server.body_timeout_secs = parse_secs(key, value)?;
            }
            ["SERVER", "KEEP_ALIVE"] => {
                self.config.server.keep_alive = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_var_error(key, "expected boolean"))?;
            }

            ["API", "BASE_URL"] => {
                self.config.api.base_url = value.to_string();
            }
            ["API", "PATH_PREFIX"] => {
                self.config.api.path_prefix = value.to_string();
            }
            ["API", "DOCS_PATH"] => {
                // Empty disables the docs endpoint.
                self.config.api.docs_path = if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                };
            }

            ["LOGGING", "LEVEL"] => {
                self.config.logging.level = value.to_lowercase();
            }
            ["LOGGING", "FORMAT"] => {
                self.config.logging.format = match value.to_lowercase().as_str() {
                    "json" => LogFormat::Json,
                    "pretty" => LogFormat::Pretty,
                    _ => {
                        return Err(ConfigError::env_var_error(
                            key,
                            "expected 'json' or 'pretty'",
                        ))
                    }
                };
            }

            _ => return Err(ConfigError::env_var_error(key, "unknown configuration key")),
        }

        Ok(())
    }
}

/// Deep-merges `overlay` into `base`; objects merge key by key, anything
/// else replaces.
fn merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(slot) => merge(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

fn parse_secs(key: &str, value: &str) -> Result<u64, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::env_var_error(key, "expected integer"))
}

/// Parse a boolean from a string.
fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
