//! In-memory testing for Kiln services.
//!
//! [`TestClient`] sends requests straight into an
//! [`ApiService`](kiln_server::ApiService): no socket, no port, but the same
//! filter chain and dispatcher the server uses.
//!
//! ```ignore
//! use kiln_test::TestClient;
//! use serde_json::json;
//!
//! #[tokio::test]
//! async fn test_create_widget() {
//!     let client = TestClient::new(service());
//!     let response = client
//!         .post("/widgets")
//!         .query("accesstoken", "s3cret")
//!         .json(&json!({ "name": "sprocket" }))
//!         .send()
//!         .await;
//!
//!     response.assert_status(http::StatusCode::CREATED);
//! }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod error;
mod request;
mod response;

pub use client::{TestClient, TestClientRequest};
pub use error::TestError;
pub use request::TestRequestBuilder;
pub use response::TestResponse;
