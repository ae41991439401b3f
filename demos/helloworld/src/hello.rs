//! `GET /hello?name=<name>` answers `{"reply": "Hello <name>"}`.

use kiln::prelude::*;
use serde::Serialize;

pub struct HelloResource;

#[derive(Debug, Serialize)]
struct HelloResponse {
    reply: String,
}

impl Payload for HelloResponse {}

#[async_trait]
impl GetOne for HelloResource {
    fn get_doc(&self) -> Option<&str> {
        Some("request a hello")
    }

    fn get_params(&self) -> Vec<ParamDecl> {
        vec![ParamDecl::query("name", "your name")
            .data_type("string")
            .required(true)]
    }

    async fn get(&self, _ctx: &RequestContext, _request: &ApiRequest, params: ParamMap) -> HandlerResult {
        let reply = params
            .first("name")
            .map(|name| format!("Hello {name}"))
            .unwrap_or_default();
        ResponseEnvelope::new()
            .with_parent(HelloResponse { reply })
            .send()
    }
}

impl Resource for HelloResource {
    fn info(&self) -> ResourceInfo {
        ResourceInfo::new("HelloResource", "reply", "hello").with_doc("Our very own API endpoint")
    }

    fn capabilities(caps: &mut CapabilitySet<Self>) {
        caps.get_one();
    }
}
