//! Authentication fixtures for Kiln development and testing.
//!
//! # Example
//!
//! ```
//! use kiln_core::fixtures::{token_factory, TokenUser};
//! use kiln_core::ContextFactory;
//!
//! let factory = token_factory("s3cret");
//! let _ctx = factory.new_context();
//! ```

use crate::error::AuthError;
use crate::identity::{ApiContext, ContextFactory, Principal, SharedContextFactory};
use crate::request::ApiRequest;
use async_trait::async_trait;
use std::sync::Arc;

/// A context whose authentication always fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct DenyAll;

#[async_trait]
impl ApiContext for DenyAll {
    async fn authenticate(&self, _request: &ApiRequest) -> Result<Option<Principal>, AuthError> {
        Err(AuthError::backend("Auth is not implemented"))
    }
}

/// The principal produced by [`TokenAuth`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenUser {
    /// The token the caller presented.
    pub token: String,
}

/// A context that accepts one fixed token.
///
/// The token is read from the `accesstoken` query parameter or from an
/// `Authorization: Bearer` header.
#[derive(Debug, Clone)]
pub struct TokenAuth {
    expected: Arc<str>,
}

impl TokenAuth {
    /// Accepts `token` only.
    #[must_use]
    pub fn new(token: &str) -> Self {
        Self {
            expected: Arc::from(token),
        }
    }
}

#[async_trait]
impl ApiContext for TokenAuth {
    async fn authenticate(&self, request: &ApiRequest) -> Result<Option<Principal>, AuthError> {
        let presented = request
            .query_values("accesstoken")
            .next()
            .map(str::to_string)
            .or_else(|| {
                request
                    .header("authorization")
                    .and_then(|v| v.strip_prefix("Bearer "))
                    .map(str::to_string)
            });

        match presented {
            None => Ok(None),
            Some(token) if *token == *self.expected => Ok(Some(Principal::new(TokenUser { token }))),
            Some(_) => Err(AuthError::invalid("unknown token")),
        }
    }
}

struct TokenFactory(Arc<str>);

impl ContextFactory for TokenFactory {
    fn new_context(&self) -> Box<dyn ApiContext> {
        Box::new(TokenAuth {
            expected: Arc::clone(&self.0),
        })
    }
}

/// Factory handing out [`TokenAuth`] contexts for `token`.
#[must_use]
pub fn token_factory(token: &str) -> SharedContextFactory {
    Arc::new(TokenFactory(Arc::from(token)))
}

/// Factory handing out [`DenyAll`] contexts.
#[must_use]
pub fn deny_all_factory() -> SharedContextFactory {
    Arc::new(|| Box::new(DenyAll) as Box<dyn ApiContext>)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{Method, Uri};

    #[tokio::test]
    async fn test_token_auth_query_parameter() {
        let ctx = token_factory("abc").new_context();
        let request = ApiRequest::new(Method::POST, Uri::from_static("/w?accesstoken=abc"));
        let principal = ctx.authenticate(&request).await.unwrap().unwrap();
        assert_eq!(principal.downcast_ref::<TokenUser>().unwrap().token, "abc");
    }

    #[tokio::test]
    async fn test_token_auth_bearer_header() {
        let ctx = TokenAuth::new("abc");
        let request = ApiRequest::new(Method::POST, Uri::from_static("/w")).with_header(
            http::header::AUTHORIZATION,
            http::HeaderValue::from_static("Bearer abc"),
        );
        assert!(ctx.authenticate(&request).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_token_auth_missing_and_wrong() {
        let ctx = TokenAuth::new("abc");
        let missing = ApiRequest::new(Method::POST, Uri::from_static("/w"));
        assert!(ctx.authenticate(&missing).await.unwrap().is_none());

        let wrong = ApiRequest::new(Method::POST, Uri::from_static("/w?accesstoken=nope"));
        assert!(ctx.authenticate(&wrong).await.is_err());
    }

    #[tokio::test]
    async fn test_deny_all() {
        let ctx = deny_all_factory().new_context();
        let request = ApiRequest::new(Method::GET, Uri::from_static("/w"));
        assert!(ctx.authenticate(&request).await.is_err());
    }
}
