//! Test client for in-memory requests.

use crate::error::TestError;
use crate::request::TestRequestBuilder;
use crate::response::TestResponse;
use bytes::Bytes;
use http::Method;
use kiln_resource::ApiContainer;
use kiln_server::ApiService;
use serde::Serialize;

/// Drives an [`ApiService`] without a socket.
///
/// Requests pass through the service's full filter chain, so shutdown
/// gating, CORS and OPTIONS handling behave as they do behind the server.
///
/// # Example
///
/// ```ignore
/// use kiln_test::TestClient;
///
/// let client = TestClient::new(service);
/// let response = client.get("/hello").query("name", "kiln").send().await;
/// response.assert_status(http::StatusCode::OK);
/// ```
#[must_use]
#[derive(Debug, Clone)]
pub struct TestClient {
    service: ApiService,
    default_headers: Vec<(String, String)>,
}

impl TestClient {
    /// Creates a client for a service.
    pub fn new(service: ApiService) -> Self {
        Self {
            service,
            default_headers: Vec::new(),
        }
    }

    /// Creates a client for a container wrapped in the default filters.
    pub fn from_container(container: ApiContainer) -> Self {
        Self::new(ApiService::new(container))
    }

    /// Adds a header sent with every request.
    pub fn with_default_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// The service under test.
    #[must_use]
    pub fn service(&self) -> &ApiService {
        &self.service
    }

    /// Creates a GET request builder.
    pub fn get(&self, path: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::GET, path)
    }

    /// Creates a POST request builder.
    pub fn post(&self, path: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::POST, path)
    }

    /// Creates a PUT request builder.
    pub fn put(&self, path: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::PUT, path)
    }

    /// Creates a PATCH request builder.
    pub fn patch(&self, path: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::PATCH, path)
    }

    /// Creates a DELETE request builder.
    pub fn delete(&self, path: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::DELETE, path)
    }

    /// Creates an OPTIONS request builder.
    pub fn options(&self, path: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::OPTIONS, path)
    }

    /// Creates a request builder with a custom method.
    pub fn request(&self, method: Method, path: impl AsRef<str>) -> TestClientRequest<'_> {
        let mut builder = TestRequestBuilder::new(method, path);
        for (name, value) in &self.default_headers {
            builder = builder.header(name, value);
        }
        TestClientRequest {
            client: self,
            builder,
        }
    }
}

/// A request builder bound to a test client.
#[must_use]
#[derive(Debug)]
pub struct TestClientRequest<'a> {
    client: &'a TestClient,
    builder: TestRequestBuilder,
}

impl TestClientRequest<'_> {
    /// Appends an encoded query pair.
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.builder = self.builder.query(name, value);
        self
    }

    /// Sets a header on the request.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.builder = self.builder.header(name, value);
        self
    }

    /// Sets the Authorization header with a Bearer token.
    pub fn bearer_token(mut self, token: impl AsRef<str>) -> Self {
        self.builder = self.builder.bearer_token(token);
        self
    }

    /// Sets the raw request body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.builder = self.builder.body(body);
        self
    }

    /// Sets the request body as JSON.
    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        self.builder = self.builder.json(value);
        self
    }

    /// Sets a form-urlencoded body.
    pub fn form<'p>(mut self, pairs: impl IntoIterator<Item = (&'p str, &'p str)>) -> Self {
        self.builder = self.builder.form(pairs);
        self
    }

    /// Sends the request and returns the response.
    ///
    /// # Panics
    ///
    /// Panics if the request could not be built.
    pub async fn send(self) -> TestResponse {
        self.try_send().await.expect("valid test request")
    }

    /// Sends the request and returns a Result.
    ///
    /// # Errors
    ///
    /// Returns `TestError` if the request could not be built.
    pub async fn try_send(self) -> Result<TestResponse, TestError> {
        let mut request = self.builder.build()?;
        let response = self.client.service.handle(&mut request).await;
        Ok(response.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use kiln_core::fixtures::deny_all_factory;
    use kiln_core::{
        async_trait, ApiConfig, ApiRequest, HandlerResult, ParamMap, RequestContext,
    };
    use kiln_resource::{CapabilitySet, Resource, ResourceInfo, ResponseEnvelope};
    use serde_json::json;

    struct Echo;

    #[async_trait]
    impl kiln_core::GetOne for Echo {
        async fn get(&self, _ctx: &RequestContext, req: &ApiRequest, _params: ParamMap) -> HandlerResult {
            let query: Vec<_> = req.query_pairs().to_vec();
            ResponseEnvelope::new()
                .with_parent(json!({
                    "query": query,
                    "trace": req.header("x-trace"),
                }))
                .send()
        }
    }

    impl Resource for Echo {
        fn info(&self) -> ResourceInfo {
            ResourceInfo::new("EchoResource", "echo", "echo")
        }

        fn capabilities(caps: &mut CapabilitySet<Self>) {
            caps.get_one();
        }
    }

    fn client() -> TestClient {
        let config = ApiConfig::default();
        let mut container = ApiContainer::new(config.clone());
        container
            .register(&config, deny_all_factory(), Echo)
            .unwrap();
        TestClient::from_container(container)
    }

    #[tokio::test]
    async fn test_get_through_service() {
        let response = client().get("/echo").query("q", "a+b c").send().await;

        response.assert_status(StatusCode::OK);
        let body: serde_json::Value = response.json().unwrap();
        assert_eq!(body["query"][0], json!(["q", "a+b c"]));
    }

    #[tokio::test]
    async fn test_default_headers() {
        let response = client()
            .with_default_header("x-trace", "t-1")
            .get("/echo")
            .send()
            .await;
        let body: serde_json::Value = response.json().unwrap();
        assert_eq!(body["trace"], "t-1");
    }

    #[tokio::test]
    async fn test_filters_apply() {
        let client = client();

        client
            .get("/missing")
            .send()
            .await
            .assert_status(StatusCode::NOT_FOUND)
            .assert_header("access-control-allow-origin", "*");

        client
            .options("/echo")
            .send()
            .await
            .assert_status(StatusCode::OK);
    }

    #[tokio::test]
    async fn test_try_send_reports_build_errors() {
        let result = client().get("/echo").header("bad header", "x").try_send().await;
        assert!(matches!(result, Err(TestError::InvalidHeader(_))));
    }
}
