//! Configuration for Kiln services.
//!
//! A [`KilnConfig`] has three sections:
//!
//! | Section | Feeds |
//! |---------|-------|
//! | `server` | [`kiln_server::ServerConfig`] |
//! | `api` | [`kiln_core::ApiConfig`] (base URL, path prefix, docs path) |
//! | `logging` | [`kiln_telemetry::LogConfig`] |
//!
//! [`ConfigLoader`] builds one from defaults, TOML/JSON files, a `.env`
//! file and `KILN__SECTION__KEY` environment variables, in that order.
//! Unknown keys are rejected at every layer.
//!
//! # Example
//!
//! ```toml
//! [server]
//! http_addr = "0.0.0.0:8080"
//! shutdown_timeout_secs = 30
//!
//! [api]
//! base_url = "https://api.example.com"
//! path_prefix = "v1/"
//! docs_path = "apidocs.json"
//!
//! [logging]
//! level = "info"
//! format = "json"
//! ```
//!
//! ```no_run
//! use kiln_config::ConfigLoader;
//! use kiln_server::ServerConfig;
//!
//! # fn main() -> Result<(), kiln_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_optional_file("kiln.toml")?
//!     .with_default_env()
//!     .load()?;
//!
//! let server = ServerConfig::from(&config.server);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod error;
mod loader;
mod schema;

pub use error::ConfigError;
pub use loader::{ConfigLoader, Format, DEFAULT_ENV_PREFIX};
pub use schema::{KilnConfig, LogFormat, LoggingSection, ServerSection, LOG_LEVELS};
