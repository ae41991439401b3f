//! Registration errors.

use http::Method;
use kiln_router::RouterError;
use thiserror::Error;

/// Why a resource could not be registered.
///
/// All of these are configuration mistakes; a service should fail to start
/// rather than serve with a partially registered resource.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// The resource description is unusable.
    #[error("resource '{name}' is invalid: {reason}")]
    InvalidResource {
        /// Display name of the resource.
        name: String,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// The resource lists no capability.
    #[error("resource '{0}' implements no capability")]
    NoCapabilities(String),

    /// A route with the same method and path exists already.
    #[error("route {method} {path} is already registered")]
    DuplicateRoute {
        /// The HTTP method.
        method: Method,
        /// The path pattern.
        path: String,
    },

    /// The router rejected a generated pattern.
    #[error(transparent)]
    Router(RouterError),
}

impl From<RouterError> for RegistrationError {
    fn from(error: RouterError) -> Self {
        match error {
            RouterError::Conflict { method, pattern } => Self::DuplicateRoute {
                method,
                path: pattern,
            },
            other => Self::Router(other),
        }
    }
}
