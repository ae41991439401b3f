//! An in-memory widget store exercising every capability.

use crate::context::Caller;
use kiln::prelude::*;
use http::StatusCode;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

const MAX_NAME_LEN: usize = 64;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Widget {
    pub id: String,
    pub name: String,
    pub owner: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WidgetInput {
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WidgetPatch {
    pub name: Option<String>,
}

/// A list of widgets; an empty list is answered with an explicit marker.
#[derive(Debug, Serialize)]
struct WidgetList {
    widgets: Vec<Widget>,
}

impl Payload for WidgetList {
    fn empty_response(&self) -> Option<Value> {
        self.widgets
            .is_empty()
            .then(|| json!({ "widgets": [], "empty": true }))
    }
}

#[derive(Default)]
pub struct WidgetResource {
    store: RwLock<BTreeMap<String, Widget>>,
    next_id: AtomicU64,
}

fn check_name(name: &str) -> Result<(), ValidationFailure> {
    if name.trim().is_empty() {
        return Err(ValidationFailure::new("name must not be empty").at("/name"));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(
            ValidationFailure::new(format!("name is longer than {MAX_NAME_LEN} bytes")).at("/name"),
        );
    }
    Ok(())
}

fn owner(ctx: &RequestContext) -> Option<String> {
    ctx.principal_as::<Caller>().map(|caller| caller.token.clone())
}

#[async_trait]
impl GetOne for WidgetResource {
    fn get_doc(&self) -> Option<&str> {
        Some("list widgets, optionally filtered by name")
    }

    fn get_params(&self) -> Vec<ParamDecl> {
        vec![ParamDecl::query("name", "only widgets with one of these names").data_type("string")]
    }

    async fn get(&self, _ctx: &RequestContext, _request: &ApiRequest, params: ParamMap) -> HandlerResult {
        let names = params.get("name");
        let widgets = self
            .store
            .read()
            .values()
            .filter(|w| names.map_or(true, |names| names.iter().any(|n| *n == w.name)))
            .cloned()
            .collect();
        ResponseEnvelope::new().with_parent(WidgetList { widgets }).send()
    }
}

#[async_trait]
impl GetByIds for WidgetResource {
    async fn get_by_ids(&self, _ctx: &RequestContext, _request: &ApiRequest, ids: Vec<String>) -> HandlerResult {
        let store = self.store.read();
        let widgets: Vec<Widget> = ids.iter().filter_map(|id| store.get(id).cloned()).collect();
        if widgets.is_empty() {
            return Err(ErrorResponse::not_found("widget"));
        }
        ResponseEnvelope::new().with_parent(WidgetList { widgets }).send()
    }
}

#[async_trait]
impl Create for WidgetResource {
    type Body = Json<WidgetInput>;

    async fn validate_create(
        &self,
        _ctx: &RequestContext,
        body: &Self::Body,
        _request: &ApiRequest,
    ) -> Result<(), ValidationFailure> {
        check_name(&body.name)
    }

    async fn create(&self, ctx: &RequestContext, body: Self::Body, _request: &ApiRequest) -> HandlerResult {
        let id = (self.next_id.fetch_add(1, Ordering::Relaxed) + 1).to_string();
        let widget = Widget {
            id: id.clone(),
            name: body.into_inner().name,
            owner: owner(ctx),
        };
        self.store.write().insert(id, widget.clone());
        tracing::info!(id = %widget.id, "widget created");
        ResponseEnvelope::new()
            .with_parent(json!(widget))
            .send_with_status(StatusCode::CREATED)
    }
}

#[async_trait]
impl Replace for WidgetResource {
    type Body = Json<WidgetInput>;

    async fn validate_replace(
        &self,
        _ctx: &RequestContext,
        body: &Self::Body,
        _request: &ApiRequest,
    ) -> Result<(), ValidationFailure> {
        check_name(&body.name)
    }

    async fn replace(&self, ctx: &RequestContext, id: String, body: Self::Body, _request: &ApiRequest) -> HandlerResult {
        let mut store = self.store.write();
        let Some(widget) = store.get_mut(&id) else {
            return Err(ErrorResponse::not_found("widget"));
        };
        widget.name = body.into_inner().name;
        widget.owner = owner(ctx);
        ResponseEnvelope::new().with_parent(json!(widget)).send()
    }
}

#[async_trait]
impl PartialUpdate for WidgetResource {
    type Body = Json<WidgetPatch>;

    fn update_doc(&self) -> Option<&str> {
        Some("rename a widget; omitted fields are kept")
    }

    async fn validate_update(
        &self,
        _ctx: &RequestContext,
        body: &Self::Body,
        _request: &ApiRequest,
    ) -> Result<(), ValidationFailure> {
        body.name.as_deref().map_or(Ok(()), check_name)
    }

    async fn update(&self, _ctx: &RequestContext, id: String, body: Self::Body, _request: &ApiRequest) -> HandlerResult {
        let mut store = self.store.write();
        let Some(widget) = store.get_mut(&id) else {
            return Err(ErrorResponse::not_found("widget"));
        };
        if let Some(name) = body.into_inner().name {
            widget.name = name;
        }
        ResponseEnvelope::new().with_parent(json!(widget)).send()
    }
}

#[async_trait]
impl Delete for WidgetResource {
    fn delete_doc(&self) -> Option<&str> {
        Some("delete a widget; only its creator may")
    }

    async fn delete(&self, ctx: &RequestContext, id: String, _request: &ApiRequest) -> HandlerResult {
        let mut store = self.store.write();
        let Some(widget) = store.get(&id) else {
            return Err(ErrorResponse::not_found("widget"));
        };
        if widget.owner.is_some() && widget.owner != owner(ctx) {
            return Err(ErrorResponse::new(
                StatusCode::FORBIDDEN,
                false,
                "not your widget",
                "DELETE",
            ));
        }
        store.remove(&id);
        ResponseEnvelope::new()
            .with_parent(json!({ "deleted": id }))
            .send()
    }
}

impl Resource for WidgetResource {
    fn info(&self) -> ResourceInfo {
        ResourceInfo::new("WidgetResource", "widget", "widgets").with_doc("In-memory widget store")
    }

    fn capabilities(caps: &mut CapabilitySet<Self>) {
        caps.get_one()
            .get_by_ids()
            .create()
            .replace()
            .partial_update()
            .delete();
    }
}
