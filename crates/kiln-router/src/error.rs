//! Router errors.

use http::Method;
use thiserror::Error;

/// Errors raised while inserting a route.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
    /// The path pattern is malformed.
    #[error("invalid route pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// The method is already routed on this path.
    #[error("route {method} {pattern} is already registered")]
    Conflict {
        /// The method.
        method: Method,
        /// The pattern as given to the second insert.
        pattern: String,
    },
}

impl RouterError {
    pub(crate) fn invalid(pattern: &str, reason: &'static str) -> Self {
        Self::InvalidPattern {
            pattern: pattern.to_string(),
            reason,
        }
    }
}
