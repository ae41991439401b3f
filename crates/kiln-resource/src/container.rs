//! The routing container.

use crate::dispatch::BoundRoute;
use crate::docs::{self, OpenApi};
use crate::error::RegistrationError;
use crate::registrar;
use crate::resource::{Resource, ResourceDescriptor};
use crate::responder;
use crate::route::Route;
use http::header::{HeaderValue, ALLOW};
use http::{Method, StatusCode};
use kiln_core::{ApiConfig, ApiRequest, ApiResponse, ErrorResponse, ResponseSink, SharedContextFactory};
use kiln_router::{Lookup, Router};
use std::sync::Arc;

/// Context label of routing failures.
pub const ROUTE_CONTEXT: &str = "route";

/// Holds every registered route and dispatches requests to them.
///
/// Registration must complete before the container starts serving; it is
/// shared read-only afterwards.
///
/// # Example
///
/// ```
/// use kiln_core::ApiConfig;
/// use kiln_resource::ApiContainer;
///
/// let container = ApiContainer::new(ApiConfig::new("http://localhost:8080"));
/// assert!(container.routes().next().is_none());
/// ```
pub struct ApiContainer {
    config: ApiConfig,
    title: String,
    version: String,
    router: Router<usize>,
    routes: Vec<BoundRoute>,
    descriptors: Vec<Arc<ResourceDescriptor>>,
}

impl ApiContainer {
    /// Creates an empty container.
    #[must_use]
    pub fn new(config: ApiConfig) -> Self {
        Self {
            config,
            title: "kiln".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            router: Router::new(),
            routes: Vec::new(),
            descriptors: Vec::new(),
        }
    }

    /// Sets the title and version shown in the API description.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>, version: impl Into<String>) -> Self {
        self.title = title.into();
        self.version = version.into();
        self
    }

    /// Returns the container configuration.
    #[must_use]
    pub const fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Registers `resource` under `config`.
    ///
    /// Either every route of the resource is registered or none is.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource description is unusable, lists no
    /// capability, or one of its routes is registered already.
    pub fn register<R: Resource>(
        &mut self,
        config: &ApiConfig,
        context_factory: SharedContextFactory,
        resource: R,
    ) -> Result<(), RegistrationError> {
        let bound = registrar::bind_resource(config, context_factory, resource)?;

        let mut router = self.router.clone();
        for (offset, route) in bound.iter().enumerate() {
            router.insert(
                route.route.method().clone(),
                route.route.path(),
                self.routes.len() + offset,
            )?;
        }
        self.router = router;

        let Some(first) = bound.first() else {
            return Ok(());
        };
        let descriptor = Arc::clone(&first.descriptor);
        tracing::info!(
            resource = %descriptor.info().name,
            endpoint = %config.collection_path(&descriptor.info().endpoint),
            routes = bound.len(),
            "Registered resource"
        );
        self.descriptors.push(descriptor);
        self.routes.extend(bound);
        Ok(())
    }

    /// Iterates over the registered routes in registration order.
    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter().map(|bound| &bound.route)
    }

    /// Returns the descriptors of the registered resources.
    #[must_use]
    pub fn descriptors(&self) -> &[Arc<ResourceDescriptor>] {
        &self.descriptors
    }

    /// Builds the API description document.
    #[must_use]
    pub fn api_description(&self) -> OpenApi {
        let routes: Vec<&Route> = self.routes().collect();
        docs::describe(&self.title, &self.version, &self.config, &routes)
    }

    /// Dispatches a request to its route.
    ///
    /// Always yields exactly one response. Unknown paths get 404 and known
    /// paths with the wrong method get 405 with an `Allow` header.
    pub async fn dispatch(&self, request: &mut ApiRequest) -> ApiResponse {
        if let Some(response) = self.serve_docs(request) {
            return response;
        }

        let index = match self.router.lookup(request.method(), request.path()) {
            Lookup::Matched(found) => {
                let index = *found.value;
                request.set_path_params(found.params);
                index
            }
            Lookup::MethodNotAllowed(allowed) => {
                let error = ErrorResponse::method_not_allowed(request.method(), ROUTE_CONTEXT);
                let mut response = reject(request, &error);
                let allow = allowed
                    .iter()
                    .map(Method::as_str)
                    .collect::<Vec<_>>()
                    .join(", ");
                if let Ok(value) = HeaderValue::from_str(&allow) {
                    response.headers_mut().insert(ALLOW, value);
                }
                return response;
            }
            Lookup::NotFound => return reject(request, &ErrorResponse::not_found(ROUTE_CONTEXT)),
        };

        match self.routes.get(index) {
            Some(route) => route.dispatch(request).await,
            None => reject(
                request,
                &ErrorResponse::internal("route table out of sync", ROUTE_CONTEXT),
            ),
        }
    }

    fn serve_docs(&self, request: &ApiRequest) -> Option<ApiResponse> {
        let docs_path = self.config.docs_path.as_deref()?;
        if request.method() != Method::GET || request.path().trim_start_matches('/') != docs_path {
            return None;
        }
        Some(
            ApiResponse::json(StatusCode::OK, &self.api_description()).unwrap_or_else(|err| {
                reject(request, &ErrorResponse::internal(err, "docs"))
            }),
        )
    }
}

fn reject(request: &ApiRequest, error: &ErrorResponse) -> ApiResponse {
    let mut sink = ResponseSink::new();
    responder::respond(request, Some(&mut sink), error);
    sink.into_response()
        .unwrap_or_else(|| ApiResponse::new(error.status()))
}

impl std::fmt::Debug for ApiContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiContainer")
            .field("config", &self.config)
            .field("title", &self.title)
            .field("routes", &self.routes.len())
            .finish_non_exhaustive()
    }
}
