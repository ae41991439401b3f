//! The per-route dispatcher.
//!
//! Every request that reaches a registered route runs the same sequence,
//! stopping at the first failure:
//!
//! 1. resolve the `ids[]` redirect of a collection GET
//! 2. create the request context
//! 3. authenticate, if the route requires it, and store the principal
//! 4. validate parameters (GET family) or decode and validate the body
//!    (write family)
//! 5. call the handler
//!
//! The outcome lands in a write-once [`ResponseSink`], and the context is
//! announced in the request attributes afterwards.

use crate::action::RouteAction;
use crate::resource::ResourceDescriptor;
use crate::responder;
use crate::route::Route;
use crate::validate::{collect_ids, validate_params, IDS_PARAM};
use http::header::HeaderValue;
use http::{HeaderName, Method, StatusCode};
use kiln_core::{ApiRequest, ApiResponse, ErrorResponse, HandlerResult, RequestContext, ResponseSink};
use std::sync::Arc;

/// Message of the error returned when authentication fails.
pub const UNAUTHORIZED_MESSAGE: &str = "Invalid accesstoken";

/// Header carrying the request id.
pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// A route bound to its resource.
pub(crate) struct BoundRoute {
    pub route: Route,
    pub descriptor: Arc<ResourceDescriptor>,
    pub action: RouteAction,
}

impl BoundRoute {
    /// Runs the request through the route and returns exactly one response.
    pub(crate) async fn dispatch(&self, request: &mut ApiRequest) -> ApiResponse {
        let target = self.resolve(request);
        let mut ctx = RequestContext::new(target.descriptor.context_factory().new_context())
            .with_operation_id(target.route.operation_id());

        let mut sink = ResponseSink::new();
        match target.run(&mut ctx, request).await {
            Ok(response) => {
                sink.write(response);
            }
            Err(error) => responder::respond(request, Some(&mut sink), &error),
        }

        ctx.api().log_summary();
        let request_id = ctx.request_id();
        request.attributes_mut().insert(Arc::new(ctx));

        let mut response = sink
            .into_response()
            .unwrap_or_else(|| ApiResponse::new(StatusCode::INTERNAL_SERVER_ERROR));
        if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
            response.headers_mut().insert(REQUEST_ID_HEADER, value);
        }
        response
    }

    fn resolve(&self, request: &ApiRequest) -> &Self {
        match &self.action {
            RouteAction::GetOne {
                redirect: Some(by_ids),
                ..
            } if request.has_query(IDS_PARAM) => by_ids,
            _ => self,
        }
    }

    async fn run(&self, ctx: &mut RequestContext, request: &ApiRequest) -> HandlerResult {
        if self.route.auth_required() {
            authenticate(ctx, request, self.route.method()).await?;
        }

        let ctx = &*ctx;
        match &self.action {
            RouteAction::GetOne {
                handler, validate, ..
            } => {
                let params = validate_params(request, validate)?;
                handler(ctx, request, params).await
            }
            RouteAction::GetByIds { handler, validate } => {
                validate_params(request, validate)?;
                let ids = collect_ids(request)?;
                handler(ctx, request, ids).await
            }
            RouteAction::Write { handler, .. } | RouteAction::Delete { handler } => {
                handler(ctx, request).await
            }
        }
    }
}

async fn authenticate(
    ctx: &mut RequestContext,
    request: &ApiRequest,
    verb: &Method,
) -> Result<(), ErrorResponse> {
    let outcome = ctx.api().authenticate(request).await;
    match outcome {
        Ok(Some(principal)) => {
            ctx.set_principal(principal);
            Ok(())
        }
        Ok(None) => {
            tracing::debug!(method = %verb, "no principal for request");
            Err(ErrorResponse::unauthorized(UNAUTHORIZED_MESSAGE, verb.as_str()))
        }
        Err(err) => {
            tracing::debug!(method = %verb, error = %err, "authentication failed");
            Err(ErrorResponse::unauthorized(UNAUTHORIZED_MESSAGE, verb.as_str()))
        }
    }
}
