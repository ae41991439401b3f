//! Radix tree router for Kiln.
//!
//! The router maps an HTTP method and a path to a value of any type. Kiln
//! routes to the index of a registered resource route, but nothing in this
//! crate depends on that.
//!
//! # Features
//!
//! - **Radix Tree Matching**: O(k) path lookup vs O(n) linear scan
//! - **Path Parameters**: Extract named parameters from paths (`/widgets/{id}`)
//! - **Per-Route Parameter Names**: `/{id}` and `/{widget-id}` can live side by side
//! - **Wildcards**: Catch-all routes (`/files/*path`)
//! - **405 Support**: Lookups report the routed methods when only the path matched
//!
//! # Example
//!
//! ```rust
//! use kiln_router::{Lookup, Router};
//! use http::Method;
//!
//! let mut router = Router::new();
//! router.insert(Method::GET, "/widgets", "list").unwrap();
//! router.insert(Method::GET, "/widgets/{id}", "get").unwrap();
//!
//! match router.lookup(&Method::GET, "/widgets/42") {
//!     Lookup::Matched(found) => {
//!         assert_eq!(*found.value, "get");
//!         assert_eq!(found.params.get("id"), Some("42"));
//!     }
//!     _ => unreachable!(),
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//!                    (root)
//!                      │
//!                  "widgets"
//!              [GET list, POST create]
//!                      │
//!                    "{}"
//!        [GET {id}, PUT {widget-id}, DELETE {widget-id}]
//! ```

#![doc(html_root_url = "https://docs.rs/kiln-router/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod method_router;
mod node;
mod params;
mod router;

pub use error::RouterError;
pub use method_router::{Endpoint, MethodRouter};
pub use params::Params;
pub use router::{Lookup, RouteMatch, Router};
