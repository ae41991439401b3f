//! Request-scoped context.
//!
//! The dispatcher creates one [`RequestContext`] per request, authenticates
//! through it, hands it to the capability handler and finally announces it in
//! the request attributes so filters can see who made the request.

use crate::identity::{ApiContext, Principal};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// A unique identifier for each request, using UUID v7.
///
/// UUID v7 is time-ordered, which makes it ideal for request tracking
/// and log correlation.
///
/// # Example
///
/// ```
/// use kiln_core::RequestId;
///
/// let id = RequestId::new();
/// println!("Request ID: {}", id);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new unique request ID using UUID v7.
    ///
    /// UUID v7 incorporates a Unix timestamp, making IDs time-ordered
    /// and suitable for distributed systems.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates a `RequestId` from an existing UUID.
    ///
    /// This is useful when parsing request IDs from headers or other sources.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for RequestId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<RequestId> for Uuid {
    fn from(id: RequestId) -> Self {
        id.0
    }
}

/// Per-request context that flows from the dispatcher into handlers.
///
/// `RequestContext` carries:
/// - Unique request ID for log correlation
/// - The [`ApiContext`] the service's context factory produced
/// - The authenticated [`Principal`], once authentication succeeded
/// - The operation ID of the matched route
/// - Request timing information
///
/// A context is never shared between requests.
pub struct RequestContext {
    request_id: RequestId,
    api: Box<dyn ApiContext>,
    principal: Option<Principal>,
    operation_id: Option<String>,
    started_at: Instant,
}

impl RequestContext {
    /// Creates a new context around the given [`ApiContext`].
    #[must_use]
    pub fn new(api: Box<dyn ApiContext>) -> Self {
        Self {
            request_id: RequestId::new(),
            api,
            principal: None,
            operation_id: None,
            started_at: Instant::now(),
        }
    }

    /// Returns the request ID.
    #[must_use]
    pub const fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Returns the service-provided context.
    #[must_use]
    pub fn api(&self) -> &dyn ApiContext {
        self.api.as_ref()
    }

    /// Returns the authenticated principal, if any.
    #[must_use]
    pub const fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    /// Returns the principal as `T`.
    #[must_use]
    pub fn principal_as<T: std::any::Any>(&self) -> Option<&T> {
        self.principal.as_ref().and_then(|p| p.downcast_ref::<T>())
    }

    /// Returns `true` once a principal is attached.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.principal.is_some()
    }

    /// Attaches the authenticated principal.
    pub fn set_principal(&mut self, principal: Principal) {
        self.principal = Some(principal);
    }

    /// Returns a new context with the specified principal.
    #[must_use]
    pub fn with_principal(mut self, principal: Principal) -> Self {
        self.principal = Some(principal);
        self
    }

    /// Returns the operation ID if set.
    #[must_use]
    pub fn operation_id(&self) -> Option<&str> {
        self.operation_id.as_deref()
    }

    /// Sets the operation ID of the matched route.
    pub fn set_operation_id(&mut self, operation_id: impl Into<String>) {
        self.operation_id = Some(operation_id.into());
    }

    /// Returns a new context with the specified operation ID.
    #[must_use]
    pub fn with_operation_id(mut self, operation_id: impl Into<String>) -> Self {
        self.operation_id = Some(operation_id.into());
        self
    }

    /// Returns the elapsed time since the request started.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("request_id", &self.request_id)
            .field("principal", &self.principal)
            .field("operation_id", &self.operation_id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::DenyAll;

    fn context() -> RequestContext {
        RequestContext::new(Box::new(DenyAll))
    }

    #[test]
    fn test_request_id_new_generates_unique_ids() {
        let id1 = RequestId::new();
        let id2 = RequestId::new();
        assert_ne!(id1, id2, "Each RequestId should be unique");
    }

    #[test]
    fn test_request_id_display() {
        let id = RequestId::new();
        let display = id.to_string();
        assert_eq!(display.len(), 36, "UUID string should be 36 characters");
        assert!(display.contains('-'), "UUID should contain hyphens");
    }

    #[test]
    fn test_request_id_serialization() {
        let id = RequestId::new();
        let json = serde_json::to_string(&id).expect("serialization should work");
        let parsed: RequestId = serde_json::from_str(&json).expect("deserialization should work");
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_request_context_new_is_anonymous() {
        let ctx = context();
        assert!(!ctx.is_authenticated());
        assert!(ctx.principal().is_none());
        assert!(ctx.operation_id().is_none());
    }

    #[test]
    fn test_request_context_principal() {
        let ctx = context()
            .with_principal(Principal::new("alice".to_string()))
            .with_operation_id("Widgets.get");

        assert!(ctx.is_authenticated());
        assert_eq!(ctx.principal_as::<String>().map(String::as_str), Some("alice"));
        assert_eq!(ctx.operation_id(), Some("Widgets.get"));
    }

    #[test]
    fn test_request_context_elapsed() {
        let ctx = context();
        std::thread::sleep(Duration::from_millis(10));
        assert!(ctx.elapsed() >= Duration::from_millis(10));
    }
}
