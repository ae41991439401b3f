//! Test request building.

use crate::error::TestError;
use bytes::Bytes;
use http::{header, HeaderMap, HeaderName, HeaderValue, Method, Uri};
use kiln_core::ApiRequest;
use serde::Serialize;

/// Builder for requests sent through a [`TestClient`](crate::TestClient).
///
/// Query pairs added with [`query`](Self::query) are percent-encoded, so
/// `query("ids[]", "a b")` arrives at the validator as `ids[]` = `a b`.
#[must_use]
#[derive(Debug)]
pub struct TestRequestBuilder {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
    error: Option<TestError>,
}

impl TestRequestBuilder {
    /// Creates a builder. `path` may already carry a query string.
    pub fn new(method: Method, path: impl AsRef<str>) -> Self {
        Self {
            method,
            path: path.as_ref().to_string(),
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
            error: None,
        }
    }

    /// Appends an encoded query pair. Repeat the call for multi-valued keys.
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Sets a header on the request.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        let name = HeaderName::try_from(name.as_ref());
        let value = HeaderValue::try_from(value.as_ref());
        match (name, value) {
            (Ok(name), Ok(value)) => {
                self.headers.insert(name, value);
            }
            (Err(e), _) => self.fail(TestError::InvalidHeader(e.to_string())),
            (_, Err(e)) => self.fail(TestError::InvalidHeader(e.to_string())),
        }
        self
    }

    /// Sets the Authorization header with a Bearer token.
    pub fn bearer_token(self, token: impl AsRef<str>) -> Self {
        self.header(header::AUTHORIZATION.as_str(), format!("Bearer {}", token.as_ref()))
    }

    /// Sets the raw request body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Sets the request body as JSON and the matching `Content-Type`.
    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(bytes) => self.body = Bytes::from(bytes),
            Err(e) => self.fail(e.into()),
        }
        self.header(header::CONTENT_TYPE.as_str(), "application/json")
    }

    /// Sets a form-urlencoded body from name/value pairs.
    pub fn form<'p>(self, pairs: impl IntoIterator<Item = (&'p str, &'p str)>) -> Self {
        let encoded = encode_pairs(pairs);
        self.body(encoded)
            .header(header::CONTENT_TYPE.as_str(), "application/x-www-form-urlencoded")
    }

    /// Builds the request.
    ///
    /// # Errors
    ///
    /// Returns the first error recorded by a builder method, or
    /// `TestError::RequestBuild` if the URI is invalid.
    pub fn build(self) -> Result<ApiRequest, TestError> {
        if let Some(error) = self.error {
            return Err(error);
        }

        let mut target = self.path;
        if !self.query.is_empty() {
            target.push(if target.contains('?') { '&' } else { '?' });
            target.push_str(&encode_pairs(
                self.query.iter().map(|(k, v)| (k.as_str(), v.as_str())),
            ));
        }

        let uri: Uri = target
            .parse()
            .map_err(|e| TestError::RequestBuild(format!("Invalid URI '{target}': {e}")))?;

        let mut request = ApiRequest::new(self.method, uri).with_body(self.body);
        for (name, value) in &self.headers {
            request = request.with_header(name.clone(), value.clone());
        }
        Ok(request)
    }

    fn fail(&mut self, error: TestError) {
        self.error.get_or_insert(error);
    }
}

fn encode_pairs<'p>(pairs: impl IntoIterator<Item = (&'p str, &'p str)>) -> String {
    pairs
        .into_iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_pairs_are_encoded() {
        let request = TestRequestBuilder::new(Method::GET, "/widgets")
            .query("ids[]", "a b")
            .query("ids[]", "c&d")
            .build()
            .unwrap();

        let ids: Vec<_> = request.query_values("ids[]").collect();
        assert_eq!(ids, vec!["a b", "c&d"]);
    }

    #[test]
    fn test_query_appends_to_existing() {
        let request = TestRequestBuilder::new(Method::GET, "/hello?name=x")
            .query("extra", "1")
            .build()
            .unwrap();
        assert!(request.has_query("name"));
        assert!(request.has_query("extra"));
    }

    #[test]
    fn test_json_sets_content_type() {
        let request = TestRequestBuilder::new(Method::POST, "/widgets")
            .json(&serde_json::json!({ "name": "gear" }))
            .build()
            .unwrap();
        assert_eq!(request.header("content-type"), Some("application/json"));
        assert_eq!(&request.body()[..], br#"{"name":"gear"}"#);
    }

    #[test]
    fn test_form_body() {
        let request = TestRequestBuilder::new(Method::POST, "/widgets")
            .form([("name", "big gear")])
            .build()
            .unwrap();
        assert_eq!(&request.body()[..], b"name=big%20gear");
    }

    #[test]
    fn test_invalid_header_is_reported_at_build() {
        let result = TestRequestBuilder::new(Method::GET, "/")
            .header("bad header", "x")
            .build();
        assert!(matches!(result, Err(TestError::InvalidHeader(_))));
    }

    #[test]
    fn test_invalid_uri() {
        let result = TestRequestBuilder::new(Method::GET, "/with space").build();
        assert!(matches!(result, Err(TestError::RequestBuild(_))));
    }
}
