//! Logging setup for Kiln services.
//!
//! Kiln logs through [`tracing`] with structured fields. Library crates only
//! emit events; a binary installs a subscriber once at startup with
//! [`init_logging`].
//!
//! # Example
//!
//! ```rust,no_run
//! use kiln_telemetry::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::development()).expect("logging already installed");
//! tracing::info!(resource = "hello", "Service starting");
//! ```
//!
//! The configured level is a default: when `RUST_LOG` is set it wins, so
//! `RUST_LOG=kiln_resource=debug` works without touching configuration.

#![warn(missing_docs)]

pub mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{init_logging, LogConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
