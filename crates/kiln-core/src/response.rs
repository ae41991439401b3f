//! Outgoing responses.

use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_TYPE};
use http::{HeaderMap, StatusCode};
use serde::Serialize;

const APPLICATION_JSON: &str = "application/json";

/// A buffered HTTP response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl ApiResponse {
    /// Creates a response with an empty body.
    #[must_use]
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// Serializes `value` as the JSON body.
    pub fn json<T: Serialize + ?Sized>(
        status: StatusCode,
        value: &T,
    ) -> Result<Self, serde_json::Error> {
        let body = serde_json::to_vec(value)?;
        let mut response = Self::new(status).with_body(body);
        response
            .headers
            .insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
        Ok(response)
    }

    /// Replaces the body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Returns the status code.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the headers mutably.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Returns the body.
    #[must_use]
    pub const fn body(&self) -> &Bytes {
        &self.body
    }

    /// Splits the response into status, headers and body.
    #[must_use]
    pub fn into_parts(self) -> (StatusCode, HeaderMap, Bytes) {
        (self.status, self.headers, self.body)
    }
}

/// A write-once slot for the response of one request.
///
/// The first write wins. Any later write is dropped with a warning, so a
/// request can never end up with both a success body and an error body.
///
/// # Example
///
/// ```
/// use http::StatusCode;
/// use kiln_core::{ApiResponse, ResponseSink};
///
/// let mut sink = ResponseSink::new();
/// assert!(sink.write(ApiResponse::new(StatusCode::OK)));
/// assert!(!sink.write(ApiResponse::new(StatusCode::BAD_REQUEST)));
/// assert_eq!(sink.into_response().unwrap().status(), StatusCode::OK);
/// ```
#[derive(Debug, Default)]
pub struct ResponseSink {
    response: Option<ApiResponse>,
}

impl ResponseSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes the response. Returns `false` if one was already written.
    pub fn write(&mut self, response: ApiResponse) -> bool {
        if let Some(existing) = &self.response {
            tracing::warn!(
                written = existing.status().as_u16(),
                dropped = response.status().as_u16(),
                "response already written, dropping second write"
            );
            return false;
        }
        self.response = Some(response);
        true
    }

    /// Returns `true` once a response has been written.
    #[must_use]
    pub const fn is_written(&self) -> bool {
        self.response.is_some()
    }

    /// Returns the written response, if any.
    #[must_use]
    pub fn into_response(self) -> Option<ApiResponse> {
        self.response
    }
}
