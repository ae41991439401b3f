//! # Kiln Resource
//!
//! Capability-driven route registration and request dispatch.
//!
//! A [`Resource`] lists the capabilities it implements. Registering it with
//! an [`ApiContainer`] produces one route per capability, each bound to a
//! dispatcher that authenticates, validates and then calls the resource.
//!
//! ## Example
//!
//! ```
//! use kiln_core::fixtures::deny_all_factory;
//! use kiln_core::{async_trait, ApiConfig, ApiRequest, GetOne, HandlerResult, ParamDecl, ParamMap, RequestContext};
//! use kiln_resource::{ApiContainer, CapabilitySet, Resource, ResourceInfo, ResponseEnvelope};
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
//! let config = ApiConfig::new("http://localhost:8080");
//! let mut container = ApiContainer::new(config.clone());
//! container.register(&config, deny_all_factory(), Hello).unwrap();
//! assert_eq!(container.routes().count(), 1);
//! ```

#![doc(html_root_url = "https://docs.rs/kiln-resource/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod action;
mod container;
mod dispatch;
pub mod docs;
mod envelope;
mod error;
mod registrar;
mod resource;
mod responder;
mod route;
mod validate;

pub use action::{data_validation_label, BoxFuture, UNPARSABLE_BODY};
pub use container::{ApiContainer, ROUTE_CONTEXT};
pub use dispatch::{REQUEST_ID_HEADER, UNAUTHORIZED_MESSAGE};
pub use envelope::{Payload, ResponseEnvelope};
pub use error::RegistrationError;
pub use registrar::ACCESS_TOKEN_PARAM;
pub use resource::{Capabilities, CapabilitySet, Resource, ResourceDescriptor, ResourceInfo};
pub use responder::respond;
pub use route::{CapabilityKind, Route};
pub use validate::{collect_ids, decode_param, validate_params, IDS_PARAM, ID_PARAM, NO_IDS_MESSAGE};
