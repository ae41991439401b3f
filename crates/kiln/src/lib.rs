//! # Kiln
//!
//! REST endpoint families built from capabilities.
//!
//! A resource names its type and endpoint and implements any of the six
//! capability traits ([`GetOne`](core::GetOne), [`GetByIds`](core::GetByIds),
//! [`Create`](core::Create), [`Replace`](core::Replace),
//! [`PartialUpdate`](core::PartialUpdate), [`Delete`](core::Delete)).
//! Registering it in an [`ApiContainer`](resource::ApiContainer) derives the
//! routes, and every request then goes through the same pipeline:
//! authenticate, validate parameters and body, call the handler, answer
//! with a JSON payload or an error envelope.
//!
//! ## Crates
//!
//! | Module | Crate |
//! |--------|-------|
//! | [`core`] | request/response types, capabilities, error envelope |
//! | [`router`] | radix path router |
//! | [`resource`] | registrar, dispatcher, validator, API description |
//! | [`server`] | filters, HTTP server, graceful shutdown |
//! | [`config`] | layered configuration |
//! | [`telemetry`] | logging setup |
//!
//! ## Example
//!
//! ```rust,no_run
//! use kiln::prelude::*;
//!
//! struct Hello;
//!
//! #[async_trait]
//! impl GetOne for Hello {
//!     fn get_params(&self) -> Vec<ParamDecl> {
//!         vec![ParamDecl::query("name", "who to greet").required(true)]
//!     }
//!
//!     async fn get(&self, _ctx: &RequestContext, _req: &ApiRequest, params: ParamMap) -> HandlerResult {
//!         let name = params.first("name").unwrap_or_default();
//!         ResponseEnvelope::new()
//!             .with_parent(serde_json::json!({ "reply": format!("Hello {name}") }))
//!             .send()
//!     }
//! }
//!
//! impl Resource for Hello {
//!     fn info(&self) -> ResourceInfo {
//!         ResourceInfo::new("HelloResource", "reply", "hello")
//!     }
//!
//!     fn capabilities(caps: &mut CapabilitySet<Self>) {
//!         caps.get_one();
//!     }
//! }
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ApiConfig::new("http://localhost:8080");
//! let mut container = ApiContainer::new(config.clone());
//! container.register(&config, kiln::core::fixtures::deny_all_factory(), Hello)?;
//!
//! Server::new(ServerConfig::default(), ApiService::new(container)).run().await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub use kiln_config as config;
pub use kiln_core as core;
pub use kiln_resource as resource;
pub use kiln_router as router;
pub use kiln_server as server;
pub use kiln_telemetry as telemetry;

/// Prelude module for convenient imports.
///
/// ```rust
/// use kiln::prelude::*;
/// ```
pub mod prelude {
    pub use kiln_core::{
        async_trait, ApiConfig, ApiContext, ApiRequest, ApiResponse, AuthError, ContextFactory,
        Create, Delete, ErrorResponse, GetByIds, GetOne, HandlerResult, Json, NoBody, ParamDecl,
        ParamMap, PartialUpdate, Principal, Replace, RequestContext, SharedContextFactory,
        ValidationFailure,
    };

    pub use kiln_resource::{
        ApiContainer, CapabilitySet, Payload, RegistrationError, Resource, ResourceInfo,
        ResponseEnvelope,
    };

    pub use kiln_server::{ApiService, Server, ServerConfig, ShutdownSignal};

    pub use kiln_config::{ConfigLoader, KilnConfig};

    pub use kiln_telemetry::{init_logging, LogConfig};
}
