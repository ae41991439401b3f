//! High-level router API.

use http::Method;

use crate::error::RouterError;
use crate::method_router::MethodRouter;
use crate::node::{Node, Segment};
use crate::params::Params;

/// A matched route with its value and labelled path parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a, T> {
    /// The value routed for the method and path.
    pub value: &'a T,
    /// Path parameters, named as in the matched pattern.
    pub params: Params,
}

/// Outcome of a lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<'a, T> {
    /// A route matched both path and method.
    Matched(RouteMatch<'a, T>),
    /// The path matched, the method did not. Carries the routed methods.
    MethodNotAllowed(Vec<Method>),
    /// Nothing matched the path.
    NotFound,
}

/// A radix tree router generic over the routed value.
///
/// Routes are matched in O(k) time where k is the number of path segments.
///
/// # Example
///
/// ```rust
/// use kiln_router::Router;
/// use http::Method;
///
/// let mut router = Router::new();
/// router.insert(Method::GET, "/widgets/{id}", 1).unwrap();
/// router.insert(Method::PUT, "/widgets/{widget-id}", 2).unwrap();
///
/// let get = router.match_route(&Method::GET, "/widgets/42").unwrap();
/// assert_eq!(*get.value, 1);
/// assert_eq!(get.params.get("id"), Some("42"));
///
/// let put = router.match_route(&Method::PUT, "/widgets/42").unwrap();
/// assert_eq!(put.params.get("widget-id"), Some("42"));
/// ```
///
/// # Route Priority
///
/// 1. **Static segments** (e.g., `/widgets/count`)
/// 2. **Parameter segments** (e.g., `/widgets/{id}`)
/// 3. **Wildcard segments** (e.g., `/files/*path`)
#[derive(Debug, Clone)]
pub struct Router<T> {
    root: Node<T>,
    route_count: usize,
}

impl<T> Default for Router<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Router<T> {
    /// Creates a new empty router.
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: Node::root(),
            route_count: 0,
        }
    }

    /// Routes `method` on `pattern` to `value`.
    ///
    /// Fails on malformed patterns and on a method already routed for an
    /// equivalent pattern.
    pub fn insert(&mut self, method: Method, pattern: &str, value: T) -> Result<(), RouterError> {
        let segments = Segment::parse(pattern)?;
        self.root.insert(pattern, &segments, method, value)?;
        self.route_count += 1;
        Ok(())
    }

    /// Looks up a method and path.
    pub fn lookup(&self, method: &Method, path: &str) -> Lookup<'_, T> {
        let Some((methods, captures)) = self.root.match_path(path) else {
            return Lookup::NotFound;
        };
        let Some(endpoint) = methods.get(method) else {
            return Lookup::MethodNotAllowed(methods.allowed_methods());
        };

        let params = endpoint
            .param_names()
            .iter()
            .cloned()
            .zip(captures)
            .collect();
        Lookup::Matched(RouteMatch {
            value: endpoint.value(),
            params,
        })
    }

    /// Matches a method and path, ignoring why a miss happened.
    #[must_use]
    pub fn match_route(&self, method: &Method, path: &str) -> Option<RouteMatch<'_, T>> {
        match self.lookup(method, path) {
            Lookup::Matched(found) => Some(found),
            _ => None,
        }
    }

    /// Matches a path regardless of method.
    ///
    /// Returns the method table and the positional captures.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<(&MethodRouter<T>, Vec<String>)> {
        self.root
            .match_path(path)
            .map(|(methods, captures)| (methods, captures.into_vec()))
    }

    /// Returns the number of routes registered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.route_count
    }

    /// Returns true if no routes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.route_count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_router_new() {
        let router: Router<u8> = Router::new();
        assert!(router.is_empty());
        assert_eq!(router.len(), 0);
    }

    #[test]
    fn test_router_match_static() {
        let mut router = Router::new();
        router.insert(Method::GET, "/hello", "hello").unwrap();

        let found = router.match_route(&Method::GET, "/hello").unwrap();
        assert_eq!(*found.value, "hello");
        assert!(found.params.is_empty());
        assert!(router.match_route(&Method::GET, "/hello/").is_some());
    }

    #[test]
    fn test_router_sibling_param_names() {
        let mut router = Router::new();
        router.insert(Method::GET, "/widgets/{id}", "by-ids").unwrap();
        router.insert(Method::PUT, "/widgets/{widget-id}", "replace").unwrap();
        router.insert(Method::DELETE, "/widgets/{widget-id}", "delete").unwrap();

        let get = router.match_route(&Method::GET, "/widgets/7").unwrap();
        assert_eq!(get.params.get("id"), Some("7"));
        assert_eq!(get.params.get("widget-id"), None);

        let delete = router.match_route(&Method::DELETE, "/widgets/7").unwrap();
        assert_eq!(*delete.value, "delete");
        assert_eq!(delete.params.get("widget-id"), Some("7"));
    }

    #[test]
    fn test_router_static_beats_param() {
        let mut router = Router::new();
        router.insert(Method::GET, "/widgets/{id}", "one").unwrap();
        router.insert(Method::GET, "/widgets/count", "count").unwrap();

        assert_eq!(*router.match_route(&Method::GET, "/widgets/count").unwrap().value, "count");
        assert_eq!(*router.match_route(&Method::GET, "/widgets/9").unwrap().value, "one");
    }

    #[test]
    fn test_router_wildcard() {
        let mut router = Router::new();
        router.insert(Method::GET, "/files/*path", "files").unwrap();

        let found = router.match_route(&Method::GET, "/files/images/logo.png").unwrap();
        assert_eq!(found.params.get("path"), Some("images/logo.png"));
    }

    #[test]
    fn test_router_method_not_allowed() {
        let mut router = Router::new();
        router.insert(Method::GET, "/widgets", "list").unwrap();
        router.insert(Method::POST, "/widgets", "create").unwrap();

        assert_eq!(
            router.lookup(&Method::DELETE, "/widgets"),
            Lookup::MethodNotAllowed(vec![Method::GET, Method::POST])
        );
        assert_eq!(router.lookup(&Method::GET, "/gadgets"), Lookup::NotFound);
    }

    #[test]
    fn test_router_conflict() {
        let mut router = Router::new();
        router.insert(Method::PUT, "/widgets/{widget-id}", 1).unwrap();
        let err = router.insert(Method::PUT, "/widgets/{id}", 2).unwrap_err();
        assert!(matches!(err, RouterError::Conflict { .. }));
        assert_eq!(router.len(), 1);
    }

    #[test]
    fn test_router_invalid_pattern() {
        let mut router = Router::new();
        let err = router.insert(Method::GET, "widgets", 1).unwrap_err();
        assert!(matches!(err, RouterError::InvalidPattern { .. }));
        assert!(router.is_empty());
    }

    #[test]
    fn test_router_match_path_without_method() {
        let mut router = Router::new();
        router.insert(Method::PATCH, "/widgets/{widget-id}", 1).unwrap();

        let (methods, captures) = router.match_path("/widgets/3").unwrap();
        assert_eq!(methods.allowed_methods(), vec![Method::PATCH]);
        assert_eq!(captures, ["3"]);
    }

    proptest! {
        #[test]
        fn prop_inserted_literal_paths_match(segments in prop::collection::vec("[a-z0-9]{1,8}", 1..5)) {
            let path = format!("/{}", segments.join("/"));
            let mut router = Router::new();
            router.insert(Method::GET, &path, path.clone()).unwrap();

            let found = router.match_route(&Method::GET, &path).unwrap();
            prop_assert_eq!(found.value, &path);
            prop_assert!(found.params.is_empty());
        }
    }
}
