//! # Kiln Server
//!
//! Serves an [`ApiContainer`](kiln_resource::ApiContainer) over HTTP.
//!
//! - [`ApiService`]: the container behind the standard filter chain
//!   (shutdown gate, logging, CORS, OPTIONS)
//! - [`Filter`] / [`Next`]: extension point for additional filters
//! - [`Server`]: Hyper/Tokio HTTP/1.1 server with graceful shutdown
//! - [`ShutdownSignal`] / [`RequestTracker`]: shared shutdown state

#![doc(html_root_url = "https://docs.rs/kiln-server/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod filter;
mod server;
mod service;
pub mod shutdown;

pub use config::{
    ServerConfig, ServerConfigBuilder, DEFAULT_BODY_TIMEOUT_SECS, DEFAULT_HTTP_ADDR,
    DEFAULT_SHUTDOWN_TIMEOUT_SECS,
};
pub use filter::{
    BoxFuture, Cors, Filter, Next, OptionsResponder, RequestLogging, ShutdownGate, ALLOWED_HEADERS,
    ALLOWED_METHODS, IN_FLIGHT_GAUGE, REQUESTS_COUNTER,
};
pub use server::{HttpResponse, ResponseBody, Server, ServerError};
pub use service::ApiService;
pub use shutdown::{RequestGuard, RequestTracker, ShutdownReceiver, ShutdownSignal};
