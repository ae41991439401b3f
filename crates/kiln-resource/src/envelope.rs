//! The success response envelope.

use http::StatusCode;
use kiln_core::{ApiResponse, ErrorResponse, HandlerResult};
use serde::Serialize;

/// A success payload.
///
/// A payload may name a substitute it wants serialized in its place when it
/// is logically empty, for example an explicit marker instead of `[]`.
///
/// # Example
///
/// ```
/// use kiln_resource::Payload;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Page {
///     items: Vec<String>,
/// }
///
/// impl Payload for Page {
///     fn empty_response(&self) -> Option<serde_json::Value> {
///         self.items.is_empty().then(|| serde_json::json!({"items": null, "empty": true}))
///     }
/// }
/// ```
pub trait Payload: Serialize + Send {
    /// Substitute to serialize instead of `self`.
    fn empty_response(&self) -> Option<serde_json::Value> {
        None
    }
}

impl Payload for serde_json::Value {}

/// Wraps a success payload.
///
/// Without a payload the envelope serializes itself, which is `{}`.
#[derive(Debug, Default, Serialize)]
pub struct ResponseEnvelope<P> {
    #[serde(skip)]
    parent: Option<P>,
}

impl<P: Payload> ResponseEnvelope<P> {
    /// Creates an envelope without payload.
    #[must_use]
    pub const fn new() -> Self {
        Self { parent: None }
    }

    /// Attaches the payload.
    #[must_use]
    pub fn with_parent(mut self, parent: P) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Serializes the envelope with status 200.
    pub fn send(self) -> HandlerResult {
        self.send_with_status(StatusCode::OK)
    }

    /// Serializes the envelope with the given status.
    pub fn send_with_status(self, status: StatusCode) -> HandlerResult {
        let rendered = match &self.parent {
            Some(parent) => match parent.empty_response() {
                Some(substitute) => ApiResponse::json(status, &substitute),
                None => ApiResponse::json(status, parent),
            },
            None => ApiResponse::json(status, &self),
        };
        rendered.map_err(|err| ErrorResponse::internal(err, "response"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[derive(Serialize)]
    struct Listing {
        items: Vec<u32>,
    }

    impl Payload for Listing {
        fn empty_response(&self) -> Option<Value> {
            self.items.is_empty().then(|| json!({"items": [], "empty": true}))
        }
    }

    fn body(response: &ApiResponse) -> Value {
        serde_json::from_slice(response.body()).unwrap()
    }

    #[test]
    fn test_parent_is_serialized() {
        let response = ResponseEnvelope::new()
            .with_parent(Listing { items: vec![1, 2] })
            .send()
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body(&response), json!({"items": [1, 2]}));
    }

    #[test]
    fn test_empty_substitute_wins() {
        let response = ResponseEnvelope::new()
            .with_parent(Listing { items: vec![] })
            .send()
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body(&response), json!({"items": [], "empty": true}));
    }

    #[test]
    fn test_without_parent_serializes_envelope() {
        let response = ResponseEnvelope::<Value>::new()
            .send_with_status(StatusCode::NO_CONTENT)
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(body(&response), json!({}));
    }
}
