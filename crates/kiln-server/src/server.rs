//! HTTP server.
//!
//! Hyper 1 on Tokio, HTTP/1.1. Every accepted connection is served on its
//! own task; every request body is buffered (with a timeout) and handed to
//! the [`ApiService`].
//!
//! # Example
//!
//! ```rust,ignore
//! use kiln_core::ApiConfig;
//! use kiln_resource::ApiContainer;
//! use kiln_server::{ApiService, Server, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = ApiService::new(ApiContainer::new(ApiConfig::default()));
//!     let config = ServerConfig::builder().http_addr("0.0.0.0:8080").build();
//!
//!     Server::new(config, service).run().await?;
//!     Ok(())
//! }
//! ```

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http::{Request, Response, StatusCode};
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use kiln_core::{ApiRequest, ApiResponse, ErrorResponse};
use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::service::ApiService;
use crate::shutdown::{RequestTracker, ShutdownSignal};

/// Type alias for HTTP response body.
pub type ResponseBody = Full<Bytes>;

/// Type alias for the HTTP response.
pub type HttpResponse = Response<ResponseBody>;

/// Errors that stop the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind to the configured address.
    #[error("Bind error: {0}")]
    BindError(String),

    /// I/O error while serving.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// The Kiln HTTP server.
pub struct Server {
    config: ServerConfig,
    service: ApiService,
}

impl Server {
    /// Creates a server for `service`.
    #[must_use]
    pub const fn new(config: ServerConfig, service: ApiService) -> Self {
        Self { config, service }
    }

    /// Returns the server configuration.
    #[must_use]
    pub const fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Returns the served service.
    #[must_use]
    pub const fn service(&self) -> &ApiService {
        &self.service
    }

    /// Runs until SIGTERM or SIGINT.
    ///
    /// # Errors
    ///
    /// Returns an error if the server cannot bind to the configured address.
    pub async fn run(self) -> Result<(), ServerError> {
        let shutdown = self.service.shutdown_signal().clone();
        shutdown.listen_for_os_signals();
        self.run_with_shutdown(shutdown).await
    }

    /// Runs until `shutdown` triggers, then drains.
    ///
    /// When `shutdown` fires, the service's own signal is triggered too, so
    /// the shutdown gate rejects requests from then on. After the signal the
    /// server stops accepting, waits up to the
    /// configured shutdown timeout for in-flight requests and connections,
    /// and returns.
    ///
    /// # Errors
    ///
    /// Returns an error if the server cannot bind to the configured address.
    pub async fn run_with_shutdown(self, shutdown: ShutdownSignal) -> Result<(), ServerError> {
        let addr = self.config.socket_addr().map_err(|e| {
            ServerError::BindError(format!("Invalid address '{}': {e}", self.config.http_addr()))
        })?;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindError(format!("Failed to bind to {addr}: {e}")))?;
        let local = listener.local_addr()?;
        tracing::info!(addr = %local, "Server listening");

        let server = Arc::new(self);
        let connections = RequestTracker::new();

        loop {
            tokio::select! {
                result = listener.accept() => match result {
                    Ok((stream, remote_addr)) => {
                        let server = Arc::clone(&server);
                        let token = connections.acquire();
                        let shutdown = shutdown.clone();
                        tokio::spawn(async move {
                            if let Err(e) = server.handle_connection(stream, remote_addr, shutdown).await {
                                tracing::debug!(remote = %remote_addr, error = %e, "connection error");
                            }
                            drop(token);
                        });
                    }
                    Err(e) => tracing::error!(error = %e, "Failed to accept connection"),
                },
                () = shutdown.recv() => {
                    server.service.shutdown_signal().trigger();
                    tracing::info!("Shutdown signal received, stopping server");
                    break;
                }
            }
        }
        drop(listener);

        let timeout = server.config.shutdown_timeout();
        let requests = server.service.requests().clone();
        tracing::info!(
            timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            requests = requests.in_flight(),
            connections = connections.in_flight(),
            "Draining"
        );
        let drained = tokio::time::timeout(timeout, async {
            requests.wait_idle().await;
            connections.wait_idle().await;
        })
        .await;
        match drained {
            Ok(()) => tracing::info!("All requests finished"),
            Err(_) => tracing::warn!(
                requests = requests.in_flight(),
                connections = connections.in_flight(),
                "Shutdown timeout reached"
            ),
        }

        tracing::info!("Server stopped");
        Ok(())
    }

    async fn handle_connection(
        self: Arc<Self>,
        stream: tokio::net::TcpStream,
        remote_addr: SocketAddr,
        shutdown: ShutdownSignal,
    ) -> Result<(), hyper::Error> {
        let io = TokioIo::new(stream);
        let server = Arc::clone(&self);
        let service = service_fn(move |req: Request<Incoming>| {
            let server = Arc::clone(&server);
            async move { Ok::<_, Infallible>(server.handle_request(req).await) }
        });

        let conn = http1::Builder::new()
            .keep_alive(self.config.keep_alive())
            .serve_connection(io, service);
        tokio::pin!(conn);

        tokio::select! {
            result = conn.as_mut() => return result,
            () = shutdown.recv() => {
                tracing::debug!(remote = %remote_addr, "closing connection for shutdown");
                conn.as_mut().graceful_shutdown();
            }
        }
        conn.await
    }

    async fn handle_request(&self, req: Request<Incoming>) -> HttpResponse {
        let (parts, body) = req.into_parts();
        let collected = tokio::time::timeout(self.config.body_timeout(), body.collect()).await;

        let failure = match collected {
            Ok(Ok(collected)) => {
                let mut request = ApiRequest::from_http(Request::from_parts(parts, collected.to_bytes()));
                return into_http(self.service.handle(&mut request).await);
            }
            Ok(Err(e)) => ErrorResponse::bad_request(format!("Failed to read request body: {e}"), "body"),
            Err(_) => ErrorResponse::new(
                StatusCode::REQUEST_TIMEOUT,
                false,
                "Request body collection timed out",
                "body",
            ),
        };

        let mut request = ApiRequest::from_http(Request::from_parts(parts, Bytes::new()));
        into_http(self.service.handle_failure(&mut request, &failure).await)
    }
}

fn into_http(response: ApiResponse) -> HttpResponse {
    let (status, headers, body) = response.into_parts();
    let mut out = Response::new(Full::new(body));
    *out.status_mut() = status;
    *out.headers_mut() = headers;
    out
}
