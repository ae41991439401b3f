//! Radix tree node implementation.

use crate::error::RouterError;
use crate::method_router::{Endpoint, MethodRouter};
use http::Method;
use smallvec::SmallVec;

/// Captured segment values, positional.
pub(crate) type Captures = SmallVec<[String; 4]>;

/// One segment of a route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Segment {
    /// Literal text (e.g. `widgets`).
    Static(String),
    /// Named parameter (e.g. `{id}`).
    Param(String),
    /// Catch-all wildcard (e.g. `*path`); last segment only.
    Wildcard(String),
}

impl Segment {
    /// Parses a pattern into segments, validating it.
    pub(crate) fn parse(pattern: &str) -> Result<Vec<Self>, RouterError> {
        if !pattern.starts_with('/') {
            return Err(RouterError::invalid(pattern, "must start with '/'"));
        }

        let raw: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
        let mut segments = Vec::with_capacity(raw.len());
        for (i, s) in raw.iter().enumerate() {
            let segment = if let Some(inner) = s.strip_prefix('{') {
                let name = inner
                    .strip_suffix('}')
                    .ok_or_else(|| RouterError::invalid(pattern, "unbalanced '{'"))?;
                if name.is_empty() {
                    return Err(RouterError::invalid(pattern, "empty parameter name"));
                }
                Self::Param(name.to_string())
            } else if let Some(name) = s.strip_prefix('*') {
                if name.is_empty() {
                    return Err(RouterError::invalid(pattern, "empty wildcard name"));
                }
                if i + 1 != raw.len() {
                    return Err(RouterError::invalid(pattern, "wildcard must be last"));
                }
                Self::Wildcard(name.to_string())
            } else if s.contains(['{', '}']) {
                return Err(RouterError::invalid(pattern, "unbalanced '}'"));
            } else {
                Self::Static((*s).to_string())
            };
            segments.push(segment);
        }
        Ok(segments)
    }
}

/// A node in the radix tree.
///
/// Parameter and wildcard children are unnamed: names live on the
/// endpoints, so differently named parameters at the same position share a
/// node.
#[derive(Debug, Clone)]
pub(crate) struct Node<T> {
    segment: String,
    methods: Option<MethodRouter<T>>,
    /// Static children, sorted by segment for binary search.
    static_children: Vec<Node<T>>,
    param_child: Option<Box<Node<T>>>,
    wildcard_child: Option<Box<Node<T>>>,
}

impl<T> Node<T> {
    fn new(segment: impl Into<String>) -> Self {
        Self {
            segment: segment.into(),
            methods: None,
            static_children: Vec::new(),
            param_child: None,
            wildcard_child: None,
        }
    }

    /// Creates a root node for the tree.
    pub(crate) fn root() -> Self {
        Self::new("")
    }

    /// Inserts an endpoint for `method` at the position described by `segments`.
    pub(crate) fn insert(
        &mut self,
        pattern: &str,
        segments: &[Segment],
        method: Method,
        value: T,
    ) -> Result<(), RouterError> {
        let mut names = SmallVec::new();
        let mut node = self;
        for segment in segments {
            node = match segment {
                Segment::Static(text) => node.static_child_mut(text),
                Segment::Param(name) => {
                    names.push(name.clone());
                    node.param_child
                        .get_or_insert_with(|| Box::new(Node::new("{}")))
                        .as_mut()
                }
                Segment::Wildcard(name) => {
                    names.push(name.clone());
                    node.wildcard_child
                        .get_or_insert_with(|| Box::new(Node::new("*")))
                        .as_mut()
                }
            };
        }

        node.methods
            .get_or_insert_with(MethodRouter::new)
            .insert(method.clone(), Endpoint::new(value, names))
            .map_err(|_| RouterError::Conflict {
                method,
                pattern: pattern.to_string(),
            })
    }

    fn static_child_mut(&mut self, text: &str) -> &mut Self {
        let index = match self
            .static_children
            .binary_search_by(|c| c.segment.as_str().cmp(text))
        {
            Ok(index) => index,
            Err(index) => {
                self.static_children.insert(index, Node::new(text));
                index
            }
        };
        &mut self.static_children[index]
    }

    /// Matches a request path against the tree.
    pub(crate) fn match_path(&self, path: &str) -> Option<(&MethodRouter<T>, Captures)> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let mut captures = Captures::new();
        let methods = self.match_segments(&segments, &mut captures)?;
        Some((methods, captures))
    }

    /// Static beats parameter beats wildcard; a failed branch drops the
    /// values it captured before the next one is tried.
    fn match_segments<'a>(
        &'a self,
        segments: &[&str],
        captures: &mut Captures,
    ) -> Option<&'a MethodRouter<T>> {
        let Some((&segment, remaining)) = segments.split_first() else {
            return self.methods.as_ref();
        };

        if let Some(child) = self.find_static_child(segment) {
            if let Some(found) = child.match_segments(remaining, captures) {
                return Some(found);
            }
        }

        if let Some(child) = &self.param_child {
            let mark = captures.len();
            captures.push(segment.to_string());
            if let Some(found) = child.match_segments(remaining, captures) {
                return Some(found);
            }
            captures.truncate(mark);
        }

        if let Some(child) = &self.wildcard_child {
            if let Some(methods) = &child.methods {
                captures.push(segments.join("/"));
                return Some(methods);
            }
        }

        None
    }

    fn find_static_child(&self, segment: &str) -> Option<&Self> {
        self.static_children
            .binary_search_by(|c| c.segment.as_str().cmp(segment))
            .ok()
            .map(|i| &self.static_children[i])
    }
}
