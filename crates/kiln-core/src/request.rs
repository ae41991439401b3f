//! The inbound request as seen by filters, the dispatcher and handlers.

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{Extensions, HeaderMap, HeaderName, HeaderValue, Method, Uri};
use std::borrow::Cow;

/// An inbound request with a fully buffered body.
///
/// Query pairs are percent-decoded once on construction. A literal `+` is
/// left untouched so the parameter validator can apply the form-encoding
/// rule itself.
///
/// # Example
///
/// ```
/// use http::{Method, Uri};
/// use kiln_core::ApiRequest;
///
/// let request = ApiRequest::new(Method::GET, Uri::from_static("/widgets?ids[]=1&ids[]=2"));
/// let ids: Vec<&str> = request.query_values("ids[]").collect();
/// assert_eq!(ids, ["1", "2"]);
/// ```
#[derive(Debug)]
pub struct ApiRequest {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
    query: Vec<(String, String)>,
    path_params: Vec<(String, String)>,
    attributes: Extensions,
}

impl ApiRequest {
    /// Creates a request without headers or body.
    #[must_use]
    pub fn new(method: Method, uri: Uri) -> Self {
        let query = uri.query().map(parse_pairs).unwrap_or_default();
        Self {
            method,
            uri,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            query,
            path_params: Vec::new(),
            attributes: Extensions::new(),
        }
    }

    /// Creates a request from an `http::Request` with a buffered body.
    #[must_use]
    pub fn from_http(request: http::Request<Bytes>) -> Self {
        let (parts, body) = request.into_parts();
        let mut this = Self::new(parts.method, parts.uri);
        this.headers = parts.headers;
        this.body = body;
        this.attributes = parts.extensions;
        this
    }

    /// Sets the request body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Returns the HTTP method.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request URI.
    #[must_use]
    pub const fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Returns the request path.
    #[must_use]
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// Returns the request headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns a header value as a string, if present and valid UTF-8.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns the raw request body.
    #[must_use]
    pub const fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns all decoded query pairs in encounter order.
    #[must_use]
    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    /// Returns every value of a query parameter in encounter order.
    pub fn query_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.query
            .iter()
            .filter(move |(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Returns `true` if the query string contains the parameter, even without a value.
    #[must_use]
    pub fn has_query(&self, name: &str) -> bool {
        self.query.iter().any(|(key, _)| key == name)
    }

    /// Returns a path parameter captured by the router.
    #[must_use]
    pub fn path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Returns all captured path parameters.
    #[must_use]
    pub fn path_params(&self) -> &[(String, String)] {
        &self.path_params
    }

    /// Replaces the captured path parameters.
    ///
    /// Values are percent-decoded the same way query values are; `+` is kept.
    pub fn set_path_params(&mut self, params: impl IntoIterator<Item = (String, String)>) {
        self.path_params = params
            .into_iter()
            .map(|(name, value)| (name, percent_decode(&value)))
            .collect();
    }

    /// Returns the form data of the request: query pairs followed by the
    /// pairs of an `application/x-www-form-urlencoded` body.
    #[must_use]
    pub fn form_data(&self) -> Vec<(String, String)> {
        let mut pairs = self.query.clone();
        let is_form = self
            .header(CONTENT_TYPE.as_str())
            .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));
        if is_form {
            if let Ok(body) = std::str::from_utf8(&self.body) {
                pairs.extend(parse_pairs(body));
            }
        }
        pairs
    }

    /// Returns the attribute store.
    #[must_use]
    pub const fn attributes(&self) -> &Extensions {
        &self.attributes
    }

    /// Returns the attribute store mutably.
    pub fn attributes_mut(&mut self) -> &mut Extensions {
        &mut self.attributes
    }

    /// Returns an attribute by type.
    #[must_use]
    pub fn attribute<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.attributes.get::<T>()
    }
}

fn parse_pairs(raw: &str) -> Vec<(String, String)> {
    raw.split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (percent_decode(key), percent_decode(value))
        })
        .collect()
}

fn percent_decode(raw: &str) -> String {
    urlencoding::decode(raw).map_or_else(|_| raw.to_string(), Cow::into_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get(uri: &'static str) -> ApiRequest {
        ApiRequest::new(Method::GET, Uri::from_static(uri))
    }

    #[test]
    fn test_query_values_keep_order() {
        let request = get("/w?ids[]=3&x=1&ids[]=1");
        let values: Vec<_> = request.query_values("ids[]").collect();
        assert_eq!(values, ["3", "1"]);
    }

    #[test]
    fn test_query_percent_decoding_preserves_plus() {
        let request = get("/hello?name=J%C3%BCrgen+M&tag=a%2Bb");
        assert_eq!(request.query_values("name").next(), Some("Jürgen+M"));
        assert_eq!(request.query_values("tag").next(), Some("a+b"));
    }

    #[test]
    fn test_has_query_without_value() {
        let request = get("/w?ids[]");
        assert!(request.has_query("ids[]"));
        assert_eq!(request.query_values("ids[]").next(), Some(""));
        assert!(!request.has_query("name"));
    }

    #[test]
    fn test_path_params() {
        let mut request = get("/w/42");
        assert!(request.path_param("id").is_none());
        request.set_path_params([("id".to_string(), "42".to_string())]);
        assert_eq!(request.path_param("id"), Some("42"));
    }

    #[test]
    fn test_path_params_percent_decoded() {
        let mut request = get("/w/caf%C3%A9%20one");
        request.set_path_params([("id".to_string(), "caf%C3%A9%20one+x".to_string())]);
        assert_eq!(request.path_param("id"), Some("café one+x"));
    }

    #[test]
    fn test_form_data_includes_urlencoded_body() {
        let request = ApiRequest::new(Method::POST, Uri::from_static("/w?a=1"))
            .with_header(
                CONTENT_TYPE,
                HeaderValue::from_static("application/x-www-form-urlencoded"),
            )
            .with_body("b=2&c=3");
        let form = request.form_data();
        assert_eq!(form.len(), 3);
        assert_eq!(form[1], ("b".to_string(), "2".to_string()));
    }

    #[test]
    fn test_form_data_ignores_json_body() {
        let request = ApiRequest::new(Method::POST, Uri::from_static("/w"))
            .with_header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .with_body(r#"{"b":2}"#);
        assert!(request.form_data().is_empty());
    }

    #[test]
    fn test_attributes() {
        let mut request = get("/w");
        request.attributes_mut().insert(7_u32);
        assert_eq!(request.attribute::<u32>(), Some(&7));
    }
}
