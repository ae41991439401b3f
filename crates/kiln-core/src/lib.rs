//! # Kiln Core
//!
//! Core types and traits for the Kiln resource framework.
//!
//! This crate provides the foundational types used throughout Kiln:
//!
//! - [`ApiRequest`] / [`ApiResponse`] / [`ResponseSink`] - Buffered request and response types
//! - [`RequestContext`] - Per-request context carrying the authenticated [`Principal`]
//! - [`ApiContext`] / [`ContextFactory`] - The authentication collaborators a service supplies
//! - [`ErrorResponse`] - The uniform error envelope
//! - [`GetOne`], [`GetByIds`], [`Create`], [`Replace`], [`PartialUpdate`], [`Delete`] - Capability traits
//! - [`ParamDecl`] / [`ParamMap`] - Parameter declarations and validated values
//! - [`ApiConfig`] - Base URL and path prefix of the API

#![doc(html_root_url = "https://docs.rs/kiln-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod capability;
mod config;
mod context;
mod error;
pub mod fixtures;
mod identity;
mod param;
mod request;
mod response;

pub use async_trait::async_trait;
pub use capability::{
    BodyShape, Create, Delete, GetByIds, GetOne, HandlerResult, Json, NoBody, PartialUpdate,
    Replace,
};
pub use config::ApiConfig;
pub use context::{RequestContext, RequestId};
pub use error::{
    AuthError, ErrorEntry, ErrorEnvelope, ErrorMessage, ErrorResponse, ErrorResult, ErrorSource,
    ParamError, ValidationFailure, VALIDATE_CONTEXT,
};
pub use identity::{ApiContext, ContextFactory, Principal, SharedContextFactory};
pub use param::{ParamDecl, ParamKind, ParamMap};
pub use request::ApiRequest;
pub use response::{ApiResponse, ResponseSink};
