//! Per-path method table.

use http::Method;
use smallvec::SmallVec;

/// A routed value together with the parameter names of its own pattern.
///
/// Sibling patterns such as `/widgets/{id}` and `/widgets/{widget-id}` share
/// one tree node; each endpoint keeps its own names so captured values are
/// labelled the way the matched pattern spelled them.
#[derive(Debug, Clone)]
pub struct Endpoint<T> {
    value: T,
    param_names: SmallVec<[String; 4]>,
}

impl<T> Endpoint<T> {
    pub(crate) fn new(value: T, param_names: SmallVec<[String; 4]>) -> Self {
        Self { value, param_names }
    }

    /// Returns the routed value.
    pub const fn value(&self) -> &T {
        &self.value
    }

    /// Returns the parameter names in pattern order.
    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }
}

/// Maps HTTP methods to endpoints for a single path.
///
/// # Example
///
/// ```rust
/// use kiln_router::Router;
/// use http::Method;
///
/// let mut router = Router::new();
/// router.insert(Method::GET, "/widgets", "list").unwrap();
/// router.insert(Method::POST, "/widgets", "create").unwrap();
///
/// let (methods, _) = router.match_path("/widgets").unwrap();
/// assert_eq!(methods.allowed_methods(), vec![Method::GET, Method::POST]);
/// ```
#[derive(Debug, Clone)]
pub struct MethodRouter<T> {
    endpoints: Vec<(Method, Endpoint<T>)>,
}

impl<T> Default for MethodRouter<T> {
    fn default() -> Self {
        Self {
            endpoints: Vec::new(),
        }
    }
}

impl<T> MethodRouter<T> {
    /// Creates a new empty method router.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an endpoint for `method`.
    ///
    /// Hands the endpoint back if the method is already taken.
    pub(crate) fn insert(&mut self, method: Method, endpoint: Endpoint<T>) -> Result<(), Endpoint<T>> {
        if self.get(&method).is_some() {
            return Err(endpoint);
        }
        self.endpoints.push((method, endpoint));
        Ok(())
    }

    /// Returns the endpoint for a method.
    #[must_use]
    pub fn get(&self, method: &Method) -> Option<&Endpoint<T>> {
        self.endpoints
            .iter()
            .find(|(m, _)| m == method)
            .map(|(_, endpoint)| endpoint)
    }

    /// Returns true if any method is routed.
    #[must_use]
    pub fn has_any_method(&self) -> bool {
        !self.endpoints.is_empty()
    }

    /// Returns the routed methods in insertion order.
    ///
    /// Useful for building the `Allow` header of a 405 response.
    #[must_use]
    pub fn allowed_methods(&self) -> Vec<Method> {
        self.endpoints.iter().map(|(m, _)| m.clone()).collect()
    }
}
