//! The servable API: container plus filter chain.

use std::sync::Arc;

use kiln_core::{ApiRequest, ApiResponse, ErrorResponse};
use kiln_resource::ApiContainer;

use crate::filter::{Cors, Filter, Next, OptionsResponder, RequestLogging, ShutdownGate, IN_FLIGHT_GAUGE};
use crate::shutdown::{RequestTracker, ShutdownSignal};

/// An [`ApiContainer`] behind the standard filter chain.
///
/// The chain is: shutdown gate, logging, CORS, OPTIONS, then any filter
/// added with [`with_filter`](Self::with_filter), then the container.
///
/// # Example
///
/// ```
/// use kiln_core::ApiConfig;
/// use kiln_resource::ApiContainer;
/// use kiln_server::ApiService;
///
/// let service = ApiService::new(ApiContainer::new(ApiConfig::default()));
/// assert_eq!(service.filter_names(), ["shutdown-gate", "logging", "cors", "options"]);
/// ```
#[derive(Clone)]
pub struct ApiService {
    container: Arc<ApiContainer>,
    filters: Vec<Arc<dyn Filter>>,
    shutdown: ShutdownSignal,
    requests: RequestTracker,
}

impl ApiService {
    /// Wraps `container` with a fresh shutdown signal.
    #[must_use]
    pub fn new(container: ApiContainer) -> Self {
        Self::with_shutdown(container, ShutdownSignal::new())
    }

    /// Wraps `container`, gating requests on `shutdown`.
    #[must_use]
    pub fn with_shutdown(container: ApiContainer, shutdown: ShutdownSignal) -> Self {
        let requests = RequestTracker::with_gauge(IN_FLIGHT_GAUGE);
        let filters: Vec<Arc<dyn Filter>> = vec![
            Arc::new(ShutdownGate::new(shutdown.clone(), requests.clone())),
            Arc::new(RequestLogging),
            Arc::new(Cors),
            Arc::new(OptionsResponder),
        ];
        Self {
            container: Arc::new(container),
            filters,
            shutdown,
            requests,
        }
    }

    /// Appends a filter right before the container.
    #[must_use]
    pub fn with_filter(mut self, filter: impl Filter) -> Self {
        self.filters.push(Arc::new(filter));
        self
    }

    /// Returns the container.
    #[must_use]
    pub fn container(&self) -> &ApiContainer {
        &self.container
    }

    /// Returns the shutdown signal the gate observes.
    #[must_use]
    pub fn shutdown_signal(&self) -> &ShutdownSignal {
        &self.shutdown
    }

    /// Returns the tracker of in-flight requests.
    #[must_use]
    pub fn requests(&self) -> &RequestTracker {
        &self.requests
    }

    /// Returns the filter names in chain order.
    #[must_use]
    pub fn filter_names(&self) -> Vec<&'static str> {
        self.filters.iter().map(|filter| filter.name()).collect()
    }

    /// Runs `request` through the filters and the container.
    pub async fn handle(&self, request: &mut ApiRequest) -> ApiResponse {
        Next::new(&self.filters, &self.container).run(request).await
    }

    /// Runs `request` through the filters, answering with `failure` where
    /// the container would have dispatched.
    ///
    /// Used for requests that fail before they can be dispatched, such as a
    /// body that could not be read.
    pub async fn handle_failure(&self, request: &mut ApiRequest, failure: &ErrorResponse) -> ApiResponse {
        Next::failing(&self.filters, &self.container, failure)
            .run(request)
            .await
    }
}

impl std::fmt::Debug for ApiService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiService")
            .field("container", &self.container)
            .field("filters", &self.filter_names())
            .field("in_flight", &self.requests.in_flight())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::BoxFuture;
    use http::header::{ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN};
    use http::{Method, StatusCode, Uri};
    use kiln_core::ApiConfig;

    fn service() -> ApiService {
        ApiService::new(ApiContainer::new(ApiConfig::default()))
    }

    fn request(method: Method, uri: &'static str) -> ApiRequest {
        ApiRequest::new(method, Uri::from_static(uri))
    }

    #[tokio::test]
    async fn test_unknown_route_gets_cors_header() {
        let response = service().handle(&mut request(Method::GET, "/nothing")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    #[tokio::test]
    async fn test_options_short_circuits() {
        let response = service().handle(&mut request(Method::OPTIONS, "/nothing")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.body().is_empty());
        assert_eq!(
            response.headers()[ACCESS_CONTROL_ALLOW_METHODS],
            "GET, POST, PUT, PATCH, DELETE"
        );
        assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    #[tokio::test]
    async fn test_gate_rejects_after_shutdown() {
        let service = service();
        service.shutdown_signal().trigger();

        let response = service.handle(&mut request(Method::GET, "/nothing")).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body, serde_json::json!({ "error": "Server is shutting down" }));
        assert_eq!(service.requests().in_flight(), 0);
    }

    #[tokio::test]
    async fn test_failure_goes_through_filters() {
        let service = service();
        let failure = ErrorResponse::new(StatusCode::REQUEST_TIMEOUT, false, "Request body collection timed out", "body");

        let response = service
            .handle_failure(&mut request(Method::POST, "/nothing"), &failure)
            .await;
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
        assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["errors"][0]["context"], "body");
        assert_eq!(service.requests().in_flight(), 0);
    }

    #[tokio::test]
    async fn test_failure_rejected_by_gate_after_shutdown() {
        let service = service();
        service.shutdown_signal().trigger();
        let failure = ErrorResponse::bad_request("Failed to read request body", "body");

        let response = service
            .handle_failure(&mut request(Method::POST, "/nothing"), &failure)
            .await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    struct InFlightCheck(RequestTracker);

    impl Filter for InFlightCheck {
        fn name(&self) -> &'static str {
            "in-flight-check"
        }

        fn apply<'a>(&'a self, request: &'a mut ApiRequest, next: Next<'a>) -> BoxFuture<'a, ApiResponse> {
            assert_eq!(self.0.in_flight(), 1);
            next.run(request)
        }
    }

    #[tokio::test]
    async fn test_request_counted_while_in_flight() {
        let base = service();
        let tracker = base.requests().clone();
        let service = base.with_filter(InFlightCheck(tracker.clone()));
        assert_eq!(service.filter_names().last(), Some(&"in-flight-check"));

        service.handle(&mut request(Method::GET, "/nothing")).await;
        assert_eq!(tracker.in_flight(), 0);
    }
}
