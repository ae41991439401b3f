//! Container filters.
//!
//! Filters wrap the container dispatch. Each filter receives the request and
//! a [`Next`] handle; calling [`Next::run`] continues the chain, returning a
//! response without calling it short-circuits.
//!
//! # Example
//!
//! ```
//! use kiln_core::{ApiRequest, ApiResponse};
//! use kiln_server::{BoxFuture, Filter, Next};
//!
//! struct PoweredBy;
//!
//! impl Filter for PoweredBy {
//!     fn name(&self) -> &'static str {
//!         "powered-by"
//!     }
//!
//!     fn apply<'a>(&'a self, request: &'a mut ApiRequest, next: Next<'a>) -> BoxFuture<'a, ApiResponse> {
//!         Box::pin(async move {
//!             let mut response = next.run(request).await;
//!             response
//!                 .headers_mut()
//!                 .insert("x-powered-by", http::HeaderValue::from_static("kiln"));
//!             response
//!         })
//!     }
//! }
//! ```

use std::sync::Arc;
use std::time::Instant;

use http::header::{
    HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN,
};
use http::{Method, StatusCode};
use kiln_core::{ApiRequest, ApiResponse, ErrorResponse, RequestContext, ResponseSink};
use kiln_resource::ApiContainer;

use crate::shutdown::{RequestTracker, ShutdownSignal};

pub use kiln_resource::BoxFuture;

/// Name of the in-flight request gauge.
pub const IN_FLIGHT_GAUGE: &str = "kiln_requests_in_flight";

/// Name of the handled request counter.
pub const REQUESTS_COUNTER: &str = "kiln_requests_total";

/// Headers allowed on cross-origin requests.
pub const ALLOWED_HEADERS: &str = "authorization, content-type";

/// Methods allowed on cross-origin requests.
pub const ALLOWED_METHODS: &str = "GET, POST, PUT, PATCH, DELETE";

/// A step around container dispatch.
pub trait Filter: Send + Sync + 'static {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Handles the request, usually by calling `next.run(request)`.
    fn apply<'a>(&'a self, request: &'a mut ApiRequest, next: Next<'a>) -> BoxFuture<'a, ApiResponse>;
}

/// The rest of the filter chain, ending in the container.
pub struct Next<'a> {
    filters: &'a [Arc<dyn Filter>],
    container: &'a ApiContainer,
    failure: Option<&'a ErrorResponse>,
}

impl<'a> Next<'a> {
    pub(crate) fn new(filters: &'a [Arc<dyn Filter>], container: &'a ApiContainer) -> Self {
        Self {
            filters,
            container,
            failure: None,
        }
    }

    /// A chain that ends in writing `failure` instead of dispatching.
    pub(crate) fn failing(
        filters: &'a [Arc<dyn Filter>],
        container: &'a ApiContainer,
        failure: &'a ErrorResponse,
    ) -> Self {
        Self {
            filters,
            container,
            failure: Some(failure),
        }
    }

    /// Runs the remaining filters and the container dispatch.
    pub fn run<'b>(self, request: &'b mut ApiRequest) -> BoxFuture<'b, ApiResponse>
    where
        'a: 'b,
    {
        match (self.filters.split_first(), self.failure) {
            (Some((filter, rest)), failure) => filter.apply(
                request,
                Self {
                    filters: rest,
                    container: self.container,
                    failure,
                },
            ),
            (None, Some(failure)) => Box::pin(std::future::ready(reject(request, failure))),
            (None, None) => Box::pin(self.container.dispatch(request)),
        }
    }
}

fn reject(request: &ApiRequest, failure: &ErrorResponse) -> ApiResponse {
    let mut sink = ResponseSink::new();
    kiln_resource::respond(request, Some(&mut sink), failure);
    sink.into_response()
        .unwrap_or_else(|| ApiResponse::new(failure.status()))
}

/// Rejects requests while shutting down and counts the ones it lets in.
#[derive(Debug, Clone)]
pub struct ShutdownGate {
    signal: ShutdownSignal,
    tracker: RequestTracker,
}

impl ShutdownGate {
    /// Creates a gate observing `signal` and counting into `tracker`.
    #[must_use]
    pub const fn new(signal: ShutdownSignal, tracker: RequestTracker) -> Self {
        Self { signal, tracker }
    }
}

impl Filter for ShutdownGate {
    fn name(&self) -> &'static str {
        "shutdown-gate"
    }

    fn apply<'a>(&'a self, request: &'a mut ApiRequest, next: Next<'a>) -> BoxFuture<'a, ApiResponse> {
        Box::pin(async move {
            if self.signal.is_shutdown() {
                tracing::warn!(method = %request.method(), uri = %request.uri(), "Rejecting incoming request");
                let body = serde_json::json!({ "error": "Server is shutting down" });
                return ApiResponse::json(StatusCode::SERVICE_UNAVAILABLE, &body)
                    .unwrap_or_else(|_| ApiResponse::new(StatusCode::SERVICE_UNAVAILABLE));
            }
            let _guard = self.tracker.acquire();
            next.run(request).await
        })
    }
}

/// Logs every request and counts it by method and status.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestLogging;

impl Filter for RequestLogging {
    fn name(&self) -> &'static str {
        "logging"
    }

    fn apply<'a>(&'a self, request: &'a mut ApiRequest, next: Next<'a>) -> BoxFuture<'a, ApiResponse> {
        Box::pin(async move {
            if request.method() == Method::OPTIONS {
                return next.run(request).await;
            }

            let method = request.method().clone();
            let uri = request.uri().clone();
            tracing::info!(%method, %uri, "Handling request");
            let started = Instant::now();

            let response = next.run(&mut *request).await;

            let context = request.attribute::<Arc<RequestContext>>();
            let request_id = context.map(|ctx| ctx.request_id().to_string());
            let authenticated = context.is_some_and(|ctx| ctx.is_authenticated());
            let status = response.status().as_u16();
            tracing::info!(
                %method,
                %uri,
                status,
                duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
                request_id = request_id.as_deref().unwrap_or("-"),
                authenticated,
                "Finished request"
            );
            metrics::counter!(
                REQUESTS_COUNTER,
                "method" => method.to_string(),
                "status" => status.to_string()
            )
            .increment(1);
            response
        })
    }
}

/// Answers preflight `OPTIONS` requests without dispatching them.
#[derive(Debug, Clone, Copy, Default)]
pub struct OptionsResponder;

impl Filter for OptionsResponder {
    fn name(&self) -> &'static str {
        "options"
    }

    fn apply<'a>(&'a self, request: &'a mut ApiRequest, next: Next<'a>) -> BoxFuture<'a, ApiResponse> {
        if request.method() != Method::OPTIONS {
            return next.run(request);
        }
        let mut response = ApiResponse::new(StatusCode::OK);
        let headers = response.headers_mut();
        headers.insert(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOWED_HEADERS),
        );
        headers.insert(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        );
        Box::pin(std::future::ready(response))
    }
}

/// Allows every origin.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cors;

impl Filter for Cors {
    fn name(&self) -> &'static str {
        "cors"
    }

    fn apply<'a>(&'a self, request: &'a mut ApiRequest, next: Next<'a>) -> BoxFuture<'a, ApiResponse> {
        Box::pin(async move {
            let mut response = next.run(request).await;
            response
                .headers_mut()
                .insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
            response
        })
    }
}
