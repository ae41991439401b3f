//! Resources shared by the integration tests.

#![allow(dead_code)]

use http::StatusCode;
use kiln::core::fixtures::{token_factory, TokenUser};
use kiln::prelude::*;
use kiln::server::ShutdownSignal;
use kiln_test::TestClient;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub const TOKEN: &str = "s3cret";

/// Per-capability handler invocation counts.
#[derive(Debug, Default)]
pub struct Calls {
    pub get_one: AtomicUsize,
    pub get_by_ids: AtomicUsize,
    pub create: AtomicUsize,
    pub replace: AtomicUsize,
    pub update: AtomicUsize,
    pub delete: AtomicUsize,
    /// Principal seen by the create validation hook.
    pub validated_as: RwLock<Option<String>>,
}

impl Calls {
    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Widget {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct NewWidget {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct WidgetPage {
    pub widgets: Vec<Widget>,
}

impl Payload for WidgetPage {
    fn empty_response(&self) -> Option<serde_json::Value> {
        self.widgets
            .is_empty()
            .then(|| json!({ "widgets": [], "empty": true }))
    }
}

/// Every capability over an in-memory map.
pub struct Widgets {
    store: RwLock<BTreeMap<String, Widget>>,
    calls: Arc<Calls>,
}

impl Widgets {
    pub fn new(calls: Arc<Calls>) -> Self {
        Self {
            store: RwLock::new(BTreeMap::new()),
            calls,
        }
    }

    pub fn seeded(calls: Arc<Calls>, names: &[(&str, &str)]) -> Self {
        let this = Self::new(calls);
        {
            let mut store = this.store.write();
            for (id, name) in names {
                store.insert(
                    (*id).to_string(),
                    Widget {
                        id: (*id).to_string(),
                        name: (*name).to_string(),
                    },
                );
            }
        }
        this
    }
}

#[async_trait]
impl GetOne for Widgets {
    fn get_params(&self) -> Vec<ParamDecl> {
        vec![ParamDecl::query("name", "only widgets with this name")]
    }

    async fn get(&self, _ctx: &RequestContext, _req: &ApiRequest, params: ParamMap) -> HandlerResult {
        self.calls.get_one.fetch_add(1, Ordering::SeqCst);
        let filter = params.first("name");
        let widgets = self
            .store
            .read()
            .values()
            .filter(|w| filter.map_or(true, |name| w.name == name))
            .cloned()
            .collect();
        ResponseEnvelope::new().with_parent(WidgetPage { widgets }).send()
    }
}

#[async_trait]
impl GetByIds for Widgets {
    async fn get_by_ids(&self, _ctx: &RequestContext, _req: &ApiRequest, ids: Vec<String>) -> HandlerResult {
        self.calls.get_by_ids.fetch_add(1, Ordering::SeqCst);
        let store = self.store.read();
        let widgets: Vec<Widget> = ids.iter().filter_map(|id| store.get(id).cloned()).collect();
        if widgets.is_empty() {
            return Err(ErrorResponse::not_found("widget"));
        }
        ResponseEnvelope::new()
            .with_parent(json!({ "ids": ids, "widgets": widgets }))
            .send()
    }
}

#[async_trait]
impl Create for Widgets {
    type Body = Json<NewWidget>;

    async fn validate_create(
        &self,
        ctx: &RequestContext,
        body: &Self::Body,
        _request: &ApiRequest,
    ) -> Result<(), ValidationFailure> {
        *self.calls.validated_as.write() = ctx.principal_as::<TokenUser>().map(|u| u.token.clone());
        if body.name.trim().is_empty() {
            return Err(ValidationFailure::new("name must not be empty").at("/name"));
        }
        Ok(())
    }

    async fn create(&self, _ctx: &RequestContext, body: Self::Body, _req: &ApiRequest) -> HandlerResult {
        self.calls.create.fetch_add(1, Ordering::SeqCst);
        let mut store = self.store.write();
        let id = (store.len() + 1).to_string();
        let widget = Widget {
            id: id.clone(),
            name: body.into_inner().name,
        };
        store.insert(id, widget.clone());
        ResponseEnvelope::new()
            .with_parent(json!(widget))
            .send_with_status(StatusCode::CREATED)
    }
}

#[async_trait]
impl Replace for Widgets {
    type Body = Json<NewWidget>;

    async fn replace(&self, _ctx: &RequestContext, id: String, body: Self::Body, _req: &ApiRequest) -> HandlerResult {
        self.calls.replace.fetch_add(1, Ordering::SeqCst);
        let widget = Widget {
            id: id.clone(),
            name: body.into_inner().name,
        };
        self.store.write().insert(id, widget.clone());
        ResponseEnvelope::new().with_parent(json!(widget)).send()
    }
}

#[async_trait]
impl PartialUpdate for Widgets {
    type Body = NoBody;

    async fn update(&self, _ctx: &RequestContext, id: String, _body: NoBody, _req: &ApiRequest) -> HandlerResult {
        self.calls.update.fetch_add(1, Ordering::SeqCst);
        match self.store.write().get_mut(&id) {
            Some(widget) => {
                widget.name = widget.name.to_uppercase();
                ResponseEnvelope::new().with_parent(json!(widget)).send()
            }
            None => Err(ErrorResponse::not_found("widget")),
        }
    }
}

#[async_trait]
impl Delete for Widgets {
    async fn delete(&self, _ctx: &RequestContext, id: String, _req: &ApiRequest) -> HandlerResult {
        self.calls.delete.fetch_add(1, Ordering::SeqCst);
        match self.store.write().remove(&id) {
            Some(_) => ResponseEnvelope::<serde_json::Value>::new()
                .send_with_status(StatusCode::OK),
            None => Err(ErrorResponse::not_found("widget")),
        }
    }
}

impl Resource for Widgets {
    fn info(&self) -> ResourceInfo {
        ResourceInfo::new("WidgetResource", "widget", "widgets").with_doc("Widgets in stock")
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

/// GetByIds only.
pub struct Parts {
    pub calls: Arc<Calls>,
}

#[async_trait]
impl GetByIds for Parts {
    async fn get_by_ids(&self, _ctx: &RequestContext, _req: &ApiRequest, ids: Vec<String>) -> HandlerResult {
        self.calls.get_by_ids.fetch_add(1, Ordering::SeqCst);
        ResponseEnvelope::new().with_parent(json!({ "ids": ids })).send()
    }
}

impl Resource for Parts {
    fn info(&self) -> ResourceInfo {
        ResourceInfo::new("PartResource", "part", "parts")
    }

    fn capabilities(caps: &mut CapabilitySet<Self>) {
        caps.get_by_ids();
    }
}

/// GetOne only, with a required parameter.
pub struct Hello {
    pub calls: Arc<Calls>,
}

#[async_trait]
impl GetOne for Hello {
    fn get_params(&self) -> Vec<ParamDecl> {
        vec![ParamDecl::query("name", "who to greet").required(true)]
    }

    async fn get(&self, _ctx: &RequestContext, _req: &ApiRequest, params: ParamMap) -> HandlerResult {
        self.calls.get_one.fetch_add(1, Ordering::SeqCst);
        let name = params.first("name").unwrap_or_default();
        ResponseEnvelope::new()
            .with_parent(json!({ "reply": format!("Hello {name}") }))
            .send()
    }
}

impl Resource for Hello {
    fn info(&self) -> ResourceInfo {
        ResourceInfo::new("HelloResource", "reply", "hello")
    }

    fn capabilities(caps: &mut CapabilitySet<Self>) {
        caps.get_one();
    }
}

pub fn api_config() -> ApiConfig {
    ApiConfig::new("http://localhost:8080").with_docs_path("apidocs.json")
}

/// A container with `widgets`, `parts` and `hello`, each reporting to its
/// own call counter.
pub struct Fixture {
    pub widgets: Arc<Calls>,
    pub parts: Arc<Calls>,
    pub hello: Arc<Calls>,
    pub shutdown: ShutdownSignal,
    pub client: TestClient,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_widgets(&[])
    }

    pub fn with_widgets(seed: &[(&str, &str)]) -> Self {
        let widgets = Arc::new(Calls::default());
        let parts = Arc::new(Calls::default());
        let hello = Arc::new(Calls::default());

        let config = api_config();
        let mut container = ApiContainer::new(config.clone()).with_title("kiln tests", "0.1.0");
        container
            .register(&config, token_factory(TOKEN), Widgets::seeded(Arc::clone(&widgets), seed))
            .unwrap();
        container
            .register(&config, token_factory(TOKEN), Parts { calls: Arc::clone(&parts) })
            .unwrap();
        container
            .register(&config, token_factory(TOKEN), Hello { calls: Arc::clone(&hello) })
            .unwrap();

        let shutdown = ShutdownSignal::new();
        let service = ApiService::with_shutdown(container, shutdown.clone());

        Self {
            widgets,
            parts,
            hello,
            shutdown,
            client: TestClient::new(service),
        }
    }
}
