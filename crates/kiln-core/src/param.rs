//! Parameter declarations and the validated parameter map.

use indexmap::IndexMap;
use serde::Serialize;

/// Where a parameter is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    /// The query string.
    Query,
    /// A path segment.
    Path,
}

impl ParamKind {
    /// Label used in error messages (`Query-Parameter`, `Path-Parameter`).
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Query => "Query",
            Self::Path => "Path",
        }
    }
}

/// A parameter a capability accepts.
///
/// # Example
///
/// ```
/// use kiln_core::{ParamDecl, ParamKind};
///
/// let name = ParamDecl::query("name", "your name").required(true);
/// assert_eq!(name.kind(), ParamKind::Query);
/// assert!(name.is_required());
/// assert_eq!(name.data_type_label(), "string");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParamDecl {
    kind: ParamKind,
    name: String,
    description: String,
    required: bool,
    data_type: String,
}

impl ParamDecl {
    fn new(kind: ParamKind, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            description: description.into(),
            required: false,
            data_type: "string".to_string(),
        }
    }

    /// Declares an optional query parameter.
    #[must_use]
    pub fn query(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(ParamKind::Query, name, description)
    }

    /// Declares an optional path parameter.
    #[must_use]
    pub fn path(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(ParamKind::Path, name, description)
    }

    /// Sets whether the parameter is required.
    #[must_use]
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Sets the documented data type.
    #[must_use]
    pub fn data_type(mut self, data_type: impl Into<String>) -> Self {
        self.data_type = data_type.into();
        self
    }

    /// Returns the parameter kind.
    #[must_use]
    pub const fn kind(&self) -> ParamKind {
        self.kind
    }

    /// Returns the parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns `true` if the parameter must be present.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.required
    }

    /// Returns the documented data type.
    #[must_use]
    pub fn data_type_label(&self) -> &str {
        &self.data_type
    }
}

/// Decoded parameter values keyed by name, in declaration order.
///
/// Parameters that were declared but not sent have no entry at all, so
/// `contains` tells a handler whether a parameter was supplied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamMap {
    values: IndexMap<String, Vec<String>>,
}

impl ParamMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value for `name`.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.entry(name.into()).or_default().push(value.into());
    }

    /// Returns all values for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.values.get(name).map(Vec::as_slice)
    }

    /// Returns the first value for `name`.
    #[must_use]
    pub fn first(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Returns `true` if `name` was supplied.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Returns the number of supplied parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if no parameter was supplied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over parameters in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}
