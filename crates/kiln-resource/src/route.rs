//! Published route metadata.

use http::Method;
use kiln_core::ParamDecl;

/// The capability a route was generated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CapabilityKind {
    /// [`kiln_core::GetOne`].
    GetOne,
    /// [`kiln_core::GetByIds`].
    GetByIds,
    /// [`kiln_core::Create`].
    Create,
    /// [`kiln_core::Replace`].
    Replace,
    /// [`kiln_core::PartialUpdate`].
    PartialUpdate,
    /// [`kiln_core::Delete`].
    Delete,
}

impl CapabilityKind {
    /// Suffix of the operation id (`<Name>.<suffix>`).
    #[must_use]
    pub const fn operation(self) -> &'static str {
        match self {
            Self::GetOne => "getOne",
            Self::GetByIds => "getByIds",
            Self::Create => "create",
            Self::Replace => "replace",
            Self::PartialUpdate => "update",
            Self::Delete => "delete",
        }
    }

    /// The HTTP method the capability is served on.
    #[must_use]
    pub const fn method(self) -> Method {
        match self {
            Self::GetOne | Self::GetByIds => Method::GET,
            Self::Create => Method::POST,
            Self::Replace => Method::PUT,
            Self::PartialUpdate => Method::PATCH,
            Self::Delete => Method::DELETE,
        }
    }
}

/// One registered route: method, path pattern and public contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) operation_id: String,
    pub(crate) capability: CapabilityKind,
    pub(crate) resource: String,
    pub(crate) type_name: String,
    pub(crate) doc: String,
    pub(crate) params: Vec<ParamDecl>,
    pub(crate) auth_required: bool,
    pub(crate) body_expected: bool,
}

impl Route {
    /// Returns the HTTP method.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the path pattern.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the operation id.
    #[must_use]
    pub fn operation_id(&self) -> &str {
        &self.operation_id
    }

    /// Returns the capability behind the route.
    #[must_use]
    pub const fn capability(&self) -> CapabilityKind {
        self.capability
    }

    /// Returns the display name of the owning resource.
    #[must_use]
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Returns the type name of the owning resource.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Returns the route documentation.
    #[must_use]
    pub fn doc(&self) -> &str {
        &self.doc
    }

    /// Returns the documented parameters.
    #[must_use]
    pub fn params(&self) -> &[ParamDecl] {
        &self.params
    }

    /// Returns `true` if the caller must be authenticated.
    #[must_use]
    pub const fn auth_required(&self) -> bool {
        self.auth_required
    }

    /// Returns `true` if the route decodes a request body.
    #[must_use]
    pub const fn body_expected(&self) -> bool {
        self.body_expected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_methods() {
        assert_eq!(CapabilityKind::GetByIds.method(), Method::GET);
        assert_eq!(CapabilityKind::PartialUpdate.method(), Method::PATCH);
        assert_eq!(CapabilityKind::PartialUpdate.operation(), "update");
        assert_eq!(CapabilityKind::GetOne.operation(), "getOne");
    }
}
