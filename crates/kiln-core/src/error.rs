//! Error envelope types for Kiln.
//!
//! [`ErrorResponse`] is the single error representation that flows out of the
//! dispatch pipeline. Every failure, whether it was detected by the
//! dispatcher or produced by a resource handler, ends up serialized in the
//! same wire shape:
//!
//! ```json
//! {
//!   "errors": [
//!     {
//!       "statusCode": 400,
//!       "description": "Query-Parameter 'name' is required but missing",
//!       "source": { "parameter": "name" },
//!       "context": "validate"
//!     }
//!   ]
//! }
//! ```
//!
//! `internalerror` is only present (and `true`) for internal failures.
//! `source` and `context` are omitted when unset.

use http::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Context label used for parameter and identifier validation failures.
pub const VALIDATE_CONTEXT: &str = "validate";

/// A human-readable error message.
///
/// This is the one type the envelope constructors accept for their message.
/// Plain strings convert verbatim, failure values convert through their
/// display text.
///
/// # Example
///
/// ```
/// use kiln_core::ErrorMessage;
///
/// let from_str = ErrorMessage::from("no such widget");
/// let from_err = ErrorMessage::from_error(&std::io::Error::other("disk full"));
///
/// assert_eq!(from_str.as_str(), "no such widget");
/// assert_eq!(from_err.as_str(), "disk full");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ErrorMessage(String);

impl ErrorMessage {
    /// Builds a message from the display text of a failure.
    #[must_use]
    pub fn from_error(error: &(dyn std::error::Error + '_)) -> Self {
        Self(error.to_string())
    }

    /// Returns the message text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the message, returning the inner string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ErrorMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ErrorMessage {
    fn from(message: &str) -> Self {
        Self(message.to_string())
    }
}

impl From<String> for ErrorMessage {
    fn from(message: String) -> Self {
        Self(message)
    }
}

impl From<&String> for ErrorMessage {
    fn from(message: &String) -> Self {
        Self(message.clone())
    }
}

impl From<serde_json::Error> for ErrorMessage {
    fn from(error: serde_json::Error) -> Self {
        Self::from_error(&error)
    }
}

impl From<AuthError> for ErrorMessage {
    fn from(error: AuthError) -> Self {
        Self::from_error(&error)
    }
}

impl From<ValidationFailure> for ErrorMessage {
    fn from(failure: ValidationFailure) -> Self {
        Self(failure.message)
    }
}

/// Points at the input that caused an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorSource {
    /// Name of the offending query or path parameter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<String>,
    /// JSON pointer into the request body (e.g. `/name`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pointer: Option<String>,
}

impl ErrorSource {
    /// Source for a query or path parameter.
    #[must_use]
    pub fn parameter(name: impl Into<String>) -> Self {
        Self {
            parameter: Some(name.into()),
            pointer: None,
        }
    }

    /// Source for a location in the request body.
    #[must_use]
    pub fn pointer(pointer: impl Into<String>) -> Self {
        Self {
            parameter: None,
            pointer: Some(pointer.into()),
        }
    }
}

/// A single entry of the error envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEntry {
    /// HTTP status code.
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    /// Whether this is an internal (server-side) failure.
    #[serde(
        rename = "internalerror",
        default,
        skip_serializing_if = "std::ops::Not::not"
    )]
    pub internal: bool,
    /// Human-readable message.
    pub description: String,
    /// The input that caused the error, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<ErrorSource>,
    /// Label of the pipeline stage that produced the error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

/// Serializable error envelope for HTTP responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// One or more error entries.
    pub errors: Vec<ErrorEntry>,
}

/// A failure on its way to the client.
///
/// # Example
///
/// ```
/// use http::StatusCode;
/// use kiln_core::ErrorResponse;
///
/// let err = ErrorResponse::bad_request("can't parse request data", "POST Data Validation");
/// assert_eq!(err.status(), StatusCode::BAD_REQUEST);
/// assert_eq!(err.context(), Some("POST Data Validation"));
/// assert!(!err.is_internal());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{status}: {message}")]
pub struct ErrorResponse {
    status: StatusCode,
    internal: bool,
    message: ErrorMessage,
    locator: Option<ErrorSource>,
    context: Option<String>,
}

impl ErrorResponse {
    /// Creates an error envelope from its parts.
    ///
    /// An empty context label is treated as absent.
    #[must_use]
    pub fn new(
        status: StatusCode,
        internal: bool,
        message: impl Into<ErrorMessage>,
        context: impl Into<String>,
    ) -> Self {
        let context = context.into();
        Self {
            status,
            internal,
            message: message.into(),
            locator: None,
            context: (!context.is_empty()).then_some(context),
        }
    }

    /// 400 Bad Request.
    #[must_use]
    pub fn bad_request(message: impl Into<ErrorMessage>, context: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, false, message, context)
    }

    /// 401 Unauthorized.
    #[must_use]
    pub fn unauthorized(message: impl Into<ErrorMessage>, context: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, false, message, context)
    }

    /// 404 Not Found for a resource of the given type.
    #[must_use]
    pub fn not_found(type_name: &str) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            false,
            format!("This {type_name} does not exist."),
            type_name,
        )
    }

    /// 405 Method Not Allowed.
    #[must_use]
    pub fn method_not_allowed(method: &http::Method, context: impl Into<String>) -> Self {
        Self::new(
            StatusCode::METHOD_NOT_ALLOWED,
            false,
            format!("Method {method} is not allowed on this path"),
            context,
        )
    }

    /// 500 Internal Server Error, flagged internal.
    #[must_use]
    pub fn internal(message: impl Into<ErrorMessage>, context: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, true, message, context)
    }

    /// 503 Service Unavailable.
    #[must_use]
    pub fn service_unavailable(
        message: impl Into<ErrorMessage>,
        context: impl Into<String>,
    ) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, false, message, context)
    }

    /// Attaches the offending input.
    #[must_use]
    pub fn with_source(mut self, source: ErrorSource) -> Self {
        self.locator = Some(source);
        self
    }

    /// Returns the HTTP status code.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns `true` for internal failures.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        self.internal
    }

    /// Returns the human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Returns the source of the error, if known.
    #[must_use]
    pub const fn locator(&self) -> Option<&ErrorSource> {
        self.locator.as_ref()
    }

    /// Returns the context label.
    #[must_use]
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    /// Converts this error to a serializable envelope.
    #[must_use]
    pub fn to_envelope(&self) -> ErrorEnvelope {
        ErrorEnvelope {
            errors: vec![ErrorEntry {
                status_code: self.status.as_u16(),
                internal: self.internal,
                description: self.message.to_string(),
                source: self.locator.clone(),
                context: self.context.clone(),
            }],
        }
    }
}

/// Result type for capability handlers.
pub type ErrorResult<T> = Result<T, ErrorResponse>;

/// An authentication backend failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No credential was supplied.
    #[error("missing credential")]
    MissingCredential,

    /// The credential was rejected.
    #[error("invalid credential: {0}")]
    InvalidCredential(String),

    /// The backend could not be reached or failed.
    #[error("authentication backend failed: {0}")]
    Backend(String),
}

impl AuthError {
    /// Creates an invalid-credential error.
    #[must_use]
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidCredential(reason.into())
    }

    /// Creates a backend error.
    #[must_use]
    pub fn backend(reason: impl Into<String>) -> Self {
        Self::Backend(reason.into())
    }
}

/// A failed domain validation of a decoded request body.
///
/// # Example
///
/// ```
/// use kiln_core::ValidationFailure;
///
/// let failure = ValidationFailure::new("name must not be empty").at("/name");
/// assert_eq!(failure.pointer(), Some("/name"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationFailure {
    message: String,
    pointer: Option<String>,
}

impl ValidationFailure {
    /// Creates a validation failure with a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            pointer: None,
        }
    }

    /// Points the failure at a location in the request body.
    #[must_use]
    pub fn at(mut self, pointer: impl Into<String>) -> Self {
        self.pointer = Some(pointer.into());
        self
    }

    /// Returns the message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the JSON pointer into the body, if any.
    #[must_use]
    pub fn pointer(&self) -> Option<&str> {
        self.pointer.as_deref()
    }
}

/// A required parameter was missing from the request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}-Parameter '{name}' is required but missing")]
pub struct ParamError {
    /// `Query` or `Path`.
    pub kind: &'static str,
    /// The parameter name.
    pub name: String,
}

impl From<ParamError> for ErrorResponse {
    fn from(error: ParamError) -> Self {
        let source = ErrorSource::parameter(error.name.clone());
        Self::bad_request(ErrorMessage::from_error(&error), VALIDATE_CONTEXT).with_source(source)
    }
}
