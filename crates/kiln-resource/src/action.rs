//! Route actions: the per-route closures bound to a concrete resource.
//!
//! Every capability a resource lists is turned into a [`Binding`] at
//! registration: its metadata plus a type-erased handler that owns an `Arc`
//! of the resource. Write handlers also carry the body decoding and the
//! capability's validation hook, since only they know the body type.

use crate::dispatch::BoundRoute;
use crate::resource::ResourceInfo;
use http::Method;
use kiln_core::{
    ApiRequest, BodyShape, Create, Delete, ErrorResponse, ErrorSource, GetByIds, GetOne,
    HandlerResult, ParamDecl, ParamError, ParamMap, PartialUpdate, Replace, RequestContext,
    ValidationFailure,
};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// A boxed, sendable future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Handler of a [`GetOne`] route.
pub(crate) type GetOneFn = Arc<
    dyn for<'a> Fn(&'a RequestContext, &'a ApiRequest, ParamMap) -> BoxFuture<'a, HandlerResult>
        + Send
        + Sync,
>;

/// Handler of a [`GetByIds`] route.
pub(crate) type ByIdsFn = Arc<
    dyn for<'a> Fn(&'a RequestContext, &'a ApiRequest, Vec<String>) -> BoxFuture<'a, HandlerResult>
        + Send
        + Sync,
>;

/// Handler of a write route (body decoding and validation included).
pub(crate) type WriteFn = Arc<
    dyn for<'a> Fn(&'a RequestContext, &'a ApiRequest) -> BoxFuture<'a, HandlerResult>
        + Send
        + Sync,
>;

/// Message written when a request body cannot be decoded.
pub const UNPARSABLE_BODY: &str = "can't parse request data";

/// A capability's metadata and its bound handler.
pub(crate) struct Binding<F> {
    pub doc: String,
    pub params: Vec<ParamDecl>,
    pub auth_required: bool,
    pub body_expected: bool,
    pub handler: F,
}

/// What a matched route does once authentication passed.
pub(crate) enum RouteAction {
    /// Collection GET; requests carrying `ids[]` go to `redirect` instead.
    GetOne {
        handler: GetOneFn,
        validate: Vec<ParamDecl>,
        redirect: Option<Arc<BoundRoute>>,
    },
    /// Lookup by identifiers.
    GetByIds {
        handler: ByIdsFn,
        validate: Vec<ParamDecl>,
    },
    /// POST, PUT or PATCH.
    Write { verb: Method, handler: WriteFn },
    /// DELETE of one item.
    Delete { handler: WriteFn },
}

/// Context label of body decoding and validation failures.
pub fn data_validation_label(verb: &Method) -> String {
    format!("{verb} Data Validation")
}

fn get_one_fn<F>(f: F) -> GetOneFn
where
    F: for<'a> Fn(&'a RequestContext, &'a ApiRequest, ParamMap) -> BoxFuture<'a, HandlerResult>
        + Send
        + Sync
        + 'static,
{
    Arc::new(f)
}

fn by_ids_fn<F>(f: F) -> ByIdsFn
where
    F: for<'a> Fn(&'a RequestContext, &'a ApiRequest, Vec<String>) -> BoxFuture<'a, HandlerResult>
        + Send
        + Sync
        + 'static,
{
    Arc::new(f)
}

fn write_fn<F>(f: F) -> WriteFn
where
    F: for<'a> Fn(&'a RequestContext, &'a ApiRequest) -> BoxFuture<'a, HandlerResult>
        + Send
        + Sync
        + 'static,
{
    Arc::new(f)
}

fn doc_or(declared: Option<&str>, default: impl FnOnce() -> String) -> String {
    declared.map_or_else(default, str::to_string)
}

fn decode_body<B: BodyShape>(request: &ApiRequest, verb: &Method) -> Result<B, ErrorResponse> {
    let raw: &[u8] = if B::EXPECTED { request.body() } else { &[] };
    B::decode(raw).map_err(|err| {
        tracing::debug!(error = %err, method = %verb, "request body rejected");
        ErrorResponse::bad_request(UNPARSABLE_BODY, data_validation_label(verb))
    })
}

fn rejected(failure: ValidationFailure, verb: &Method) -> ErrorResponse {
    let pointer = failure.pointer().map(ErrorSource::pointer);
    let error = ErrorResponse::bad_request(failure, data_validation_label(verb));
    match pointer {
        Some(source) => error.with_source(source),
        None => error,
    }
}

fn item_id(request: &ApiRequest, id_param: &str) -> Result<String, ErrorResponse> {
    request
        .path_param(id_param)
        .map(|id| id.replace('+', " "))
        .ok_or_else(|| {
            ParamError {
                kind: "Path",
                name: id_param.to_string(),
            }
            .into()
        })
}

pub(crate) fn bind_get_one<R: GetOne>(resource: &Arc<R>, info: &ResourceInfo) -> Binding<GetOneFn> {
    let bound = Arc::clone(resource);
    Binding {
        doc: doc_or(resource.get_doc(), || format!("retrieve a {}", info.type_name)),
        params: resource.get_params(),
        auth_required: resource.get_auth_required(),
        body_expected: false,
        handler: get_one_fn(move |ctx, request, params| {
            let resource = Arc::clone(&bound);
            Box::pin(async move { resource.get(ctx, request, params).await })
        }),
    }
}

pub(crate) fn bind_get_by_ids<R: GetByIds>(
    resource: &Arc<R>,
    info: &ResourceInfo,
) -> Binding<ByIdsFn> {
    let bound = Arc::clone(resource);
    Binding {
        doc: doc_or(resource.get_by_ids_doc(), || {
            format!("retrieve {}s by id", info.type_name)
        }),
        params: resource.get_by_ids_params(),
        auth_required: resource.get_by_ids_auth_required(),
        body_expected: false,
        handler: by_ids_fn(move |ctx, request, ids| {
            let resource = Arc::clone(&bound);
            Box::pin(async move { resource.get_by_ids(ctx, request, ids).await })
        }),
    }
}

pub(crate) fn bind_create<R: Create>(resource: &Arc<R>, info: &ResourceInfo) -> Binding<WriteFn> {
    let bound = Arc::clone(resource);
    Binding {
        doc: doc_or(resource.create_doc(), || format!("create a new {}", info.type_name)),
        params: resource.create_params(),
        auth_required: resource.create_auth_required(),
        body_expected: R::Body::EXPECTED,
        handler: write_fn(move |ctx, request| {
            let resource = Arc::clone(&bound);
            Box::pin(async move {
                let body = decode_body::<R::Body>(request, &Method::POST)?;
                if R::Body::EXPECTED {
                    resource
                        .validate_create(ctx, &body, request)
                        .await
                        .map_err(|failure| rejected(failure, &Method::POST))?;
                }
                resource.create(ctx, body, request).await
            })
        }),
    }
}

pub(crate) fn bind_replace<R: Replace>(resource: &Arc<R>, info: &ResourceInfo) -> Binding<WriteFn> {
    let bound = Arc::clone(resource);
    let id_param = info.id_param();
    Binding {
        doc: doc_or(resource.replace_doc(), || format!("replace a {}", info.type_name)),
        params: resource.replace_params(),
        auth_required: resource.replace_auth_required(),
        body_expected: R::Body::EXPECTED,
        handler: write_fn(move |ctx, request| {
            let resource = Arc::clone(&bound);
            let id = item_id(request, &id_param);
            Box::pin(async move {
                let id = id?;
                let body = decode_body::<R::Body>(request, &Method::PUT)?;
                if R::Body::EXPECTED {
                    resource
                        .validate_replace(ctx, &body, request)
                        .await
                        .map_err(|failure| rejected(failure, &Method::PUT))?;
                }
                resource.replace(ctx, id, body, request).await
            })
        }),
    }
}

pub(crate) fn bind_partial_update<R: PartialUpdate>(
    resource: &Arc<R>,
    info: &ResourceInfo,
) -> Binding<WriteFn> {
    let bound = Arc::clone(resource);
    let id_param = info.id_param();
    Binding {
        doc: doc_or(resource.update_doc(), || format!("update a {}", info.type_name)),
        params: resource.update_params(),
        auth_required: resource.update_auth_required(),
        body_expected: R::Body::EXPECTED,
        handler: write_fn(move |ctx, request| {
            let resource = Arc::clone(&bound);
            let id = item_id(request, &id_param);
            Box::pin(async move {
                let id = id?;
                let body = decode_body::<R::Body>(request, &Method::PATCH)?;
                if R::Body::EXPECTED {
                    resource
                        .validate_update(ctx, &body, request)
                        .await
                        .map_err(|failure| rejected(failure, &Method::PATCH))?;
                }
                resource.update(ctx, id, body, request).await
            })
        }),
    }
}

pub(crate) fn bind_delete<R: Delete>(resource: &Arc<R>, info: &ResourceInfo) -> Binding<WriteFn> {
    let bound = Arc::clone(resource);
    let id_param = info.id_param();
    Binding {
        doc: doc_or(resource.delete_doc(), || format!("delete a {}", info.type_name)),
        params: resource.delete_params(),
        auth_required: resource.delete_auth_required(),
        body_expected: false,
        handler: write_fn(move |ctx, request| {
            let resource = Arc::clone(&bound);
            let id = item_id(request, &id_param);
            Box::pin(async move { resource.delete(ctx, id?, request).await })
        }),
    }
}
