//! Authentication collaborators.
//!
//! Kiln does not know how callers authenticate. A service supplies a
//! [`ContextFactory`] that hands out one [`ApiContext`] per request, and the
//! dispatcher asks that context to authenticate the request whenever the
//! matched capability requires it. The result is an opaque [`Principal`].

use crate::error::AuthError;
use crate::request::ApiRequest;
use async_trait::async_trait;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// An authenticated caller.
///
/// Kiln never looks inside a principal; it only stores it on the request
/// context so handlers (and logging) can read it back with
/// [`Principal::downcast_ref`].
///
/// # Example
///
/// ```
/// use kiln_core::Principal;
///
/// #[derive(Debug)]
/// struct User {
///     login: String,
/// }
///
/// let principal = Principal::new(User { login: "alice".into() });
/// assert_eq!(principal.downcast_ref::<User>().unwrap().login, "alice");
/// assert!(principal.downcast_ref::<String>().is_none());
/// ```
#[derive(Clone)]
pub struct Principal(Arc<dyn Any + Send + Sync>);

impl Principal {
    /// Wraps any value as a principal.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    /// Returns the principal as `T` if that is what it holds.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    /// Returns `true` if the principal holds a `T`.
    #[must_use]
    pub fn is<T: Any>(&self) -> bool {
        self.0.is::<T>()
    }
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Principal").finish_non_exhaustive()
    }
}

/// Per-request authentication context.
#[async_trait]
pub trait ApiContext: Send + Sync {
    /// Authenticates the request.
    ///
    /// `Ok(None)` means no caller could be identified. The dispatcher treats
    /// it exactly like an error on routes that require authentication.
    async fn authenticate(&self, request: &ApiRequest) -> Result<Option<Principal>, AuthError>;

    /// Called once after the request has been dispatched.
    fn log_summary(&self) {}
}

/// Produces a fresh [`ApiContext`] for every request.
pub trait ContextFactory: Send + Sync {
    /// Creates a new request-scoped context.
    fn new_context(&self) -> Box<dyn ApiContext>;
}

impl<F> ContextFactory for F
where
    F: Fn() -> Box<dyn ApiContext> + Send + Sync,
{
    fn new_context(&self) -> Box<dyn ApiContext> {
        self()
    }
}

/// Shared handle to a context factory.
pub type SharedContextFactory = Arc<dyn ContextFactory>;

#[cfg(test)]
mod tests {
    use super::*;

    struct Anonymous;

    #[async_trait]
    impl ApiContext for Anonymous {
        async fn authenticate(&self, _request: &ApiRequest) -> Result<Option<Principal>, AuthError> {
            Ok(None)
        }
    }

    #[test]
    fn test_principal_downcast() {
        let principal = Principal::new(42_u64);
        assert!(principal.is::<u64>());
        assert_eq!(principal.downcast_ref::<u64>(), Some(&42));
        assert!(principal.downcast_ref::<i32>().is_none());
    }

    #[test]
    fn test_principal_clone_shares_value() {
        let principal = Principal::new(String::from("alice"));
        let copy = principal.clone();
        assert_eq!(copy.downcast_ref::<String>().map(String::as_str), Some("alice"));
    }

    #[tokio::test]
    async fn test_closure_as_context_factory() {
        let factory = || Box::new(Anonymous) as Box<dyn ApiContext>;
        let ctx = factory.new_context();
        let request = ApiRequest::new(http::Method::GET, http::Uri::from_static("/hello"));
        assert!(ctx.authenticate(&request).await.unwrap().is_none());
    }
}
