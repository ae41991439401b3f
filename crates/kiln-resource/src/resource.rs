//! Resources and their capability sets.

use crate::action::{self, Binding, ByIdsFn, GetOneFn, WriteFn};
use kiln_core::{
    ApiConfig, Create, Delete, GetByIds, GetOne, PartialUpdate, Replace, SharedContextFactory,
};
use std::fmt;
use std::sync::Arc;

/// What a resource is called and where it lives.
///
/// # Example
///
/// ```
/// use kiln_resource::ResourceInfo;
///
/// let info = ResourceInfo::new("WidgetResource", "widget", "widgets")
///     .with_doc("Widgets in stock");
/// assert_eq!(info.id_param(), "widget-id");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceInfo {
    /// Display name, also the prefix of every operation id.
    pub name: String,
    /// Singular type name, used for id path segments and default docs.
    pub type_name: String,
    /// Path segment below the API prefix.
    pub endpoint: String,
    /// Documentation of the endpoint family.
    pub doc: String,
}

impl ResourceInfo {
    /// Creates resource info without documentation.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        type_name: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            endpoint: endpoint.into(),
            doc: String::new(),
        }
    }

    /// Sets the documentation.
    #[must_use]
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }

    /// Name of the path parameter addressing one item (`<type>-id`).
    #[must_use]
    pub fn id_param(&self) -> String {
        format!("{}-id", self.type_name)
    }
}

/// A domain endpoint family.
///
/// # Example
///
/// ```
/// use kiln_core::{async_trait, ApiRequest, HandlerResult, ParamMap, RequestContext};
/// use kiln_resource::{CapabilitySet, Resource, ResponseEnvelope, ResourceInfo};
///
/// struct Hello;
///
/// #[async_trait]
/// impl kiln_core::GetOne for Hello {
///     async fn get(&self, _ctx: &RequestContext, _req: &ApiRequest, _params: ParamMap) -> HandlerResult {
///         ResponseEnvelope::new().with_parent(serde_json::json!({"reply": "Hello"})).send()
///     }
/// }
///
/// impl Resource for Hello {
///     fn info(&self) -> ResourceInfo {
///         ResourceInfo::new("HelloResource", "reply", "hello")
///     }
///
///     fn capabilities(caps: &mut CapabilitySet<Self>) {
///         caps.get_one();
///     }
/// }
/// ```
pub trait Resource: Send + Sync + Sized + 'static {
    /// Identity of the endpoint family.
    fn info(&self) -> ResourceInfo;

    /// Lists the capabilities this resource implements.
    fn capabilities(caps: &mut CapabilitySet<Self>);
}

/// Which capabilities a resource has, as plain flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Capabilities {
    /// [`GetOne`] is implemented.
    pub get_one: bool,
    /// [`GetByIds`] is implemented.
    pub get_by_ids: bool,
    /// [`Create`] is implemented.
    pub create: bool,
    /// [`Replace`] is implemented.
    pub replace: bool,
    /// [`PartialUpdate`] is implemented.
    pub partial_update: bool,
    /// [`Delete`] is implemented.
    pub delete: bool,
}

impl Capabilities {
    /// Number of capabilities set.
    #[must_use]
    pub fn count(&self) -> usize {
        [
            self.get_one,
            self.get_by_ids,
            self.create,
            self.replace,
            self.partial_update,
            self.delete,
        ]
        .into_iter()
        .filter(|set| *set)
        .count()
    }

    /// Returns `true` if no capability is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }
}

type Binder<R, F> = fn(&Arc<R>, &ResourceInfo) -> Binding<F>;

/// The capabilities of one resource type, collected at registration.
///
/// Each method is only callable when the resource implements the matching
/// trait, so listing a capability the type lacks does not compile.
pub struct CapabilitySet<R> {
    flags: Capabilities,
    pub(crate) get_one: Option<Binder<R, GetOneFn>>,
    pub(crate) get_by_ids: Option<Binder<R, ByIdsFn>>,
    pub(crate) create: Option<Binder<R, WriteFn>>,
    pub(crate) replace: Option<Binder<R, WriteFn>>,
    pub(crate) partial_update: Option<Binder<R, WriteFn>>,
    pub(crate) delete: Option<Binder<R, WriteFn>>,
}

impl<R: Resource> CapabilitySet<R> {
    pub(crate) fn collect() -> Self {
        let mut caps = Self {
            flags: Capabilities::default(),
            get_one: None,
            get_by_ids: None,
            create: None,
            replace: None,
            partial_update: None,
            delete: None,
        };
        R::capabilities(&mut caps);
        caps
    }

    /// Returns the collected flags.
    #[must_use]
    pub const fn flags(&self) -> Capabilities {
        self.flags
    }
}

impl<R: Resource + GetOne> CapabilitySet<R> {
    /// Registers `GET /{endpoint}`.
    pub fn get_one(&mut self) -> &mut Self {
        self.flags.get_one = true;
        self.get_one = Some(action::bind_get_one::<R>);
        self
    }
}

impl<R: Resource + GetByIds> CapabilitySet<R> {
    /// Registers `GET /{endpoint}/{id}` and the `ids[]` query form.
    pub fn get_by_ids(&mut self) -> &mut Self {
        self.flags.get_by_ids = true;
        self.get_by_ids = Some(action::bind_get_by_ids::<R>);
        self
    }
}

impl<R: Resource + Create> CapabilitySet<R> {
    /// Registers `POST /{endpoint}`.
    pub fn create(&mut self) -> &mut Self {
        self.flags.create = true;
        self.create = Some(action::bind_create::<R>);
        self
    }
}

impl<R: Resource + Replace> CapabilitySet<R> {
    /// Registers `PUT /{endpoint}/{type-id}`.
    pub fn replace(&mut self) -> &mut Self {
        self.flags.replace = true;
        self.replace = Some(action::bind_replace::<R>);
        self
    }
}

impl<R: Resource + PartialUpdate> CapabilitySet<R> {
    /// Registers `PATCH /{endpoint}/{type-id}`.
    pub fn partial_update(&mut self) -> &mut Self {
        self.flags.partial_update = true;
        self.partial_update = Some(action::bind_partial_update::<R>);
        self
    }
}

impl<R: Resource + Delete> CapabilitySet<R> {
    /// Registers `DELETE /{endpoint}/{type-id}`.
    pub fn delete(&mut self) -> &mut Self {
        self.flags.delete = true;
        self.delete = Some(action::bind_delete::<R>);
        self
    }
}

/// Identity, configuration and capabilities of a registered resource.
///
/// Immutable once registration completes.
pub struct ResourceDescriptor {
    info: ResourceInfo,
    config: ApiConfig,
    context_factory: SharedContextFactory,
    capabilities: Capabilities,
}

impl ResourceDescriptor {
    pub(crate) fn new(
        info: ResourceInfo,
        config: ApiConfig,
        context_factory: SharedContextFactory,
        capabilities: Capabilities,
    ) -> Self {
        Self {
            info,
            config,
            context_factory,
            capabilities,
        }
    }

    /// Returns the resource identity.
    #[must_use]
    pub const fn info(&self) -> &ResourceInfo {
        &self.info
    }

    /// Returns the API configuration the resource was registered with.
    #[must_use]
    pub const fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Returns the context factory.
    #[must_use]
    pub fn context_factory(&self) -> &SharedContextFactory {
        &self.context_factory
    }

    /// Returns the capability flags.
    #[must_use]
    pub const fn capabilities(&self) -> Capabilities {
        self.capabilities
    }
}

impl fmt::Debug for ResourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceDescriptor")
            .field("info", &self.info)
            .field("config", &self.config)
            .field("capabilities", &self.capabilities)
            .finish_non_exhaustive()
    }
}
