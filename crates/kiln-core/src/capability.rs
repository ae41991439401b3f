//! Capability traits.
//!
//! A resource opts into a capability by implementing one of the traits below
//! and naming it when it lists its capabilities at registration. Each trait
//! carries the handler plus the metadata the registrar turns into a route:
//! documentation, declared parameters, and whether the caller must be
//! authenticated.
//!
//! | Trait | Route | Auth by default |
//! |-------|-------|-----------------|
//! | [`GetOne`] | `GET /{endpoint}` | no |
//! | [`GetByIds`] | `GET /{endpoint}/{id}`, `GET /{endpoint}?ids[]=…` | no |
//! | [`Create`] | `POST /{endpoint}` | yes |
//! | [`Replace`] | `PUT /{endpoint}/{type-id}` | yes |
//! | [`PartialUpdate`] | `PATCH /{endpoint}/{type-id}` | yes |
//! | [`Delete`] | `DELETE /{endpoint}/{type-id}` | yes |

use crate::context::RequestContext;
use crate::error::{ErrorResponse, ValidationFailure};
use crate::param::{ParamDecl, ParamMap};
use crate::request::ApiRequest;
use crate::response::ApiResponse;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::ops::{Deref, DerefMut};

/// What every capability handler returns.
///
/// `Err` is written through the error responder unchanged.
pub type HandlerResult = Result<ApiResponse, ErrorResponse>;

/// The shape a write capability expects its request body in.
pub trait BodyShape: Sized + Send + Sync + 'static {
    /// `false` when the capability reads no body. Decoding and the
    /// validation hook are skipped in that case.
    const EXPECTED: bool;

    /// Decodes the raw request body.
    fn decode(body: &[u8]) -> Result<Self, serde_json::Error>;
}

/// A JSON request body decoded into `T`.
///
/// # Example
///
/// ```
/// use kiln_core::{BodyShape, Json};
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Widget {
///     name: String,
/// }
///
/// let Json(widget) = Json::<Widget>::decode(br#"{"name":"sprocket"}"#).unwrap();
/// assert_eq!(widget.name, "sprocket");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    /// Consumes the wrapper, returning the inner value.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Json<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> DerefMut for Json<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}

impl<T> BodyShape for Json<T>
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    const EXPECTED: bool = true;

    fn decode(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body).map(Json)
    }
}

/// Marks a write capability that reads no request body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoBody;

impl BodyShape for NoBody {
    const EXPECTED: bool = false;

    fn decode(_body: &[u8]) -> Result<Self, serde_json::Error> {
        Ok(Self)
    }
}

/// Retrieve items matching query parameters on the collection path.
#[async_trait]
pub trait GetOne: Send + Sync + 'static {
    /// Route documentation. Defaults to `retrieve a <type>`.
    fn get_doc(&self) -> Option<&str> {
        None
    }

    /// Declared query and path parameters.
    fn get_params(&self) -> Vec<ParamDecl> {
        Vec::new()
    }

    /// Whether the caller must be authenticated.
    fn get_auth_required(&self) -> bool {
        false
    }

    /// Handles the request with the validated parameters.
    async fn get(
        &self,
        ctx: &RequestContext,
        request: &ApiRequest,
        params: ParamMap,
    ) -> HandlerResult;
}

/// Retrieve items by one or more identifiers.
#[async_trait]
pub trait GetByIds: Send + Sync + 'static {
    /// Route documentation. Defaults to `retrieve <type>s by id`.
    fn get_by_ids_doc(&self) -> Option<&str> {
        None
    }

    /// Additional declared parameters. Required ones are enforced.
    fn get_by_ids_params(&self) -> Vec<ParamDecl> {
        Vec::new()
    }

    /// Whether the caller must be authenticated.
    fn get_by_ids_auth_required(&self) -> bool {
        false
    }

    /// Handles the request. `ids` is never empty.
    async fn get_by_ids(
        &self,
        ctx: &RequestContext,
        request: &ApiRequest,
        ids: Vec<String>,
    ) -> HandlerResult;
}

/// Create a new item on the collection path.
#[async_trait]
pub trait Create: Send + Sync + 'static {
    /// Expected request body.
    type Body: BodyShape;

    /// Route documentation. Defaults to `create a new <type>`.
    fn create_doc(&self) -> Option<&str> {
        None
    }

    /// Declared parameters (documentation only).
    fn create_params(&self) -> Vec<ParamDecl> {
        Vec::new()
    }

    /// Whether the caller must be authenticated.
    fn create_auth_required(&self) -> bool {
        true
    }

    /// Domain validation of the decoded body.
    async fn validate_create(
        &self,
        _ctx: &RequestContext,
        _body: &Self::Body,
        _request: &ApiRequest,
    ) -> Result<(), ValidationFailure> {
        Ok(())
    }

    /// Handles the request.
    async fn create(
        &self,
        ctx: &RequestContext,
        body: Self::Body,
        request: &ApiRequest,
    ) -> HandlerResult;
}

/// Replace the item addressed by `{type-id}`.
#[async_trait]
pub trait Replace: Send + Sync + 'static {
    /// Expected request body.
    type Body: BodyShape;

    /// Route documentation. Defaults to `replace a <type>`.
    fn replace_doc(&self) -> Option<&str> {
        None
    }

    /// Declared parameters (documentation only).
    fn replace_params(&self) -> Vec<ParamDecl> {
        Vec::new()
    }

    /// Whether the caller must be authenticated.
    fn replace_auth_required(&self) -> bool {
        true
    }

    /// Domain validation of the decoded body.
    async fn validate_replace(
        &self,
        _ctx: &RequestContext,
        _body: &Self::Body,
        _request: &ApiRequest,
    ) -> Result<(), ValidationFailure> {
        Ok(())
    }

    /// Handles the request for item `id`.
    async fn replace(
        &self,
        ctx: &RequestContext,
        id: String,
        body: Self::Body,
        request: &ApiRequest,
    ) -> HandlerResult;
}

/// Partially update the item addressed by `{type-id}`.
#[async_trait]
pub trait PartialUpdate: Send + Sync + 'static {
    /// Expected request body.
    type Body: BodyShape;

    /// Route documentation. Defaults to `update a <type>`.
    fn update_doc(&self) -> Option<&str> {
        None
    }

    /// Declared parameters (documentation only).
    fn update_params(&self) -> Vec<ParamDecl> {
        Vec::new()
    }

    /// Whether the caller must be authenticated.
    fn update_auth_required(&self) -> bool {
        true
    }

    /// Domain validation of the decoded body.
    async fn validate_update(
        &self,
        _ctx: &RequestContext,
        _body: &Self::Body,
        _request: &ApiRequest,
    ) -> Result<(), ValidationFailure> {
        Ok(())
    }

    /// Handles the request for item `id`.
    async fn update(
        &self,
        ctx: &RequestContext,
        id: String,
        body: Self::Body,
        request: &ApiRequest,
    ) -> HandlerResult;
}

/// Delete the item addressed by `{type-id}`.
#[async_trait]
pub trait Delete: Send + Sync + 'static {
    /// Route documentation. Defaults to `delete a <type>`.
    fn delete_doc(&self) -> Option<&str> {
        None
    }

    /// Declared parameters (documentation only).
    fn delete_params(&self) -> Vec<ParamDecl> {
        Vec::new()
    }

    /// Whether the caller must be authenticated.
    fn delete_auth_required(&self) -> bool {
        true
    }

    /// Handles the request for item `id`.
    async fn delete(&self, ctx: &RequestContext, id: String, request: &ApiRequest)
        -> HandlerResult;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Widget {
        name: String,
    }

    #[test]
    fn test_json_body_decodes() {
        let body = Json::<Widget>::decode(br#"{"name":"gear"}"#).unwrap();
        assert_eq!(body.name, "gear");
        assert_eq!(body.into_inner(), Widget { name: "gear".into() });
    }

    #[test]
    fn test_json_body_rejects_garbage() {
        assert!(Json::<Widget>::decode(b"not json").is_err());
        assert!(Json::<Widget>::decode(b"").is_err());
    }

    #[test]
    fn test_no_body_is_not_expected() {
        assert!(!NoBody::EXPECTED);
        assert!(<Json<Widget> as BodyShape>::EXPECTED);
        assert_eq!(NoBody::decode(b"ignored").unwrap(), NoBody);
    }
}
