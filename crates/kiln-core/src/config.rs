//! API-level configuration shared by the registrar and the docs endpoint.

use serde::{Deserialize, Serialize};

/// Where the API lives.
///
/// # Example
///
/// ```
/// use kiln_core::ApiConfig;
///
/// let config = ApiConfig::new("http://localhost:8080").with_path_prefix("v1/");
/// assert_eq!(config.collection_path("widgets"), "/v1/widgets");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    /// Public base URL of the service.
    #[serde(default)]
    pub base_url: String,

    /// Prefix placed between `/` and every resource endpoint.
    #[serde(default)]
    pub path_prefix: String,

    /// Path (without the leading `/`) the API description is served at.
    #[serde(default)]
    pub docs_path: Option<String>,
}

impl ApiConfig {
    /// Creates a configuration for the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Sets the path prefix.
    #[must_use]
    pub fn with_path_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.path_prefix = prefix.into();
        self
    }

    /// Serves the API description at `/<path>`.
    #[must_use]
    pub fn with_docs_path(mut self, path: impl Into<String>) -> Self {
        self.docs_path = Some(path.into());
        self
    }

    /// The collection path of an endpoint: `/` + prefix + endpoint.
    #[must_use]
    pub fn collection_path(&self, endpoint: &str) -> String {
        format!("/{}{}", self.path_prefix, endpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_path_without_prefix() {
        assert_eq!(ApiConfig::default().collection_path("hello"), "/hello");
    }

    #[test]
    fn test_deserialize_rejects_unknown_fields() {
        let result: Result<ApiConfig, _> =
            serde_json::from_str(r#"{"base_url":"x","swagger":true}"#);
        assert!(result.is_err());
    }
}
