//! Turns a resource's capability set into bound routes.

use crate::action::{Binding, RouteAction};
use crate::dispatch::BoundRoute;
use crate::error::RegistrationError;
use crate::resource::{CapabilitySet, Resource, ResourceDescriptor, ResourceInfo};
use crate::route::{CapabilityKind, Route};
use crate::validate::{IDS_PARAM, ID_PARAM};
use kiln_core::{ApiConfig, ParamDecl, SharedContextFactory};
use std::sync::Arc;

/// Name of the documented credential parameter.
pub const ACCESS_TOKEN_PARAM: &str = "accesstoken";

/// Binds every capability of `resource` to a route.
///
/// Routes come out in registration order: by-ids, collection GET, POST,
/// PUT, PATCH, DELETE.
pub(crate) fn bind_resource<R: Resource>(
    config: &ApiConfig,
    context_factory: SharedContextFactory,
    resource: R,
) -> Result<Vec<BoundRoute>, RegistrationError> {
    let info = resource.info();
    check_info(&info)?;

    let caps = CapabilitySet::<R>::collect();
    if caps.flags().is_empty() {
        return Err(RegistrationError::NoCapabilities(info.name));
    }

    let descriptor = Arc::new(ResourceDescriptor::new(
        info.clone(),
        config.clone(),
        context_factory,
        caps.flags(),
    ));
    let resource = Arc::new(resource);
    let routes = RouteBuilder {
        descriptor: &descriptor,
        info: &info,
        collection: config.collection_path(&info.endpoint),
    };

    let mut bound = Vec::new();
    let by_ids = caps.get_by_ids.map(|bind| bind(&resource, &info));

    if let Some(binding) = &by_ids {
        let path = format!("{}/{{{ID_PARAM}}}", routes.collection);
        let id = ParamDecl::path(ID_PARAM, format!("{} id", info.type_name)).required(true);
        bound.push(routes.by_ids(binding, path, id));
    }

    if let Some(bind) = caps.get_one {
        let binding = bind(&resource, &info);
        let mut extra = Vec::new();
        let redirect = by_ids.as_ref().map(|by_ids| {
            extra.push(ids_param(&info, false));
            Arc::new(routes.by_ids(by_ids, routes.collection.clone(), ids_param(&info, true)))
        });
        bound.push(BoundRoute {
            route: routes.route(CapabilityKind::GetOne, routes.collection.clone(), &binding, extra),
            descriptor: Arc::clone(&descriptor),
            action: RouteAction::GetOne {
                handler: binding.handler,
                validate: binding.params,
                redirect,
            },
        });
    } else if let Some(binding) = &by_ids {
        bound.push(routes.by_ids(binding, routes.collection.clone(), ids_param(&info, true)));
    }

    let item = format!("{}/{{{}}}", routes.collection, info.id_param());
    let writes = [
        (CapabilityKind::Create, caps.create, routes.collection.clone()),
        (CapabilityKind::Replace, caps.replace, item.clone()),
        (CapabilityKind::PartialUpdate, caps.partial_update, item.clone()),
    ];
    for (kind, bind, path) in writes {
        if let Some(bind) = bind {
            let binding = bind(&resource, &info);
            let id = (kind != CapabilityKind::Create).then(|| item_param(&info));
            bound.push(BoundRoute {
                route: routes.route(kind, path, &binding, id.into_iter().collect()),
                descriptor: Arc::clone(&descriptor),
                action: RouteAction::Write {
                    verb: kind.method(),
                    handler: binding.handler,
                },
            });
        }
    }

    if let Some(bind) = caps.delete {
        let binding = bind(&resource, &info);
        bound.push(BoundRoute {
            route: routes.route(CapabilityKind::Delete, item, &binding, vec![item_param(&info)]),
            descriptor: Arc::clone(&descriptor),
            action: RouteAction::Delete {
                handler: binding.handler,
            },
        });
    }

    Ok(bound)
}

fn check_info(info: &ResourceInfo) -> Result<(), RegistrationError> {
    let reason = if info.name.is_empty() {
        Some("name is empty")
    } else if info.type_name.is_empty() {
        Some("type name is empty")
    } else if info.endpoint.is_empty() {
        Some("endpoint is empty")
    } else if info.endpoint.contains(['{', '}']) || info.type_name.contains(['{', '}', '/']) {
        Some("endpoint and type name must not contain path syntax")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(RegistrationError::InvalidResource {
            name: info.name.clone(),
            reason,
        }),
        None => Ok(()),
    }
}

fn ids_param(info: &ResourceInfo, required: bool) -> ParamDecl {
    ParamDecl::query(IDS_PARAM, format!("{} ids, repeatable", info.type_name)).required(required)
}

fn item_param(info: &ResourceInfo) -> ParamDecl {
    ParamDecl::path(info.id_param(), format!("{} id", info.type_name)).required(true)
}

struct RouteBuilder<'a> {
    descriptor: &'a Arc<ResourceDescriptor>,
    info: &'a ResourceInfo,
    collection: String,
}

impl RouteBuilder<'_> {
    fn route<F>(
        &self,
        capability: CapabilityKind,
        path: String,
        binding: &Binding<F>,
        extra: Vec<ParamDecl>,
    ) -> Route {
        let mut params = binding.params.clone();
        params.extend(extra);
        if binding.auth_required {
            params.push(ParamDecl::query(ACCESS_TOKEN_PARAM, "credential of the caller"));
        }
        Route {
            method: capability.method(),
            path,
            operation_id: format!("{}.{}", self.info.name, capability.operation()),
            capability,
            resource: self.info.name.clone(),
            type_name: self.info.type_name.clone(),
            doc: binding.doc.clone(),
            params,
            auth_required: binding.auth_required,
            body_expected: binding.body_expected,
        }
    }

    fn by_ids(
        &self,
        binding: &Binding<crate::action::ByIdsFn>,
        path: String,
        id: ParamDecl,
    ) -> BoundRoute {
        BoundRoute {
            route: self.route(CapabilityKind::GetByIds, path, binding, vec![id]),
            descriptor: Arc::clone(self.descriptor),
            action: RouteAction::GetByIds {
                handler: Arc::clone(&binding.handler),
                validate: binding.params.clone(),
            },
        }
    }
}
