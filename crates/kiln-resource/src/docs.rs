//! API description document (OpenAPI 3.1).
//!
//! The document is derived from the registered routes. Every operation
//! lists its declared parameters, the shared error envelope for 4xx/5xx
//! responses, and an `accesstoken` security requirement when the route
//! requires authentication.

use crate::route::Route;
use http::Method;
use indexmap::IndexMap;
use kiln_core::{ApiConfig, ParamDecl, ParamKind};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// OpenAPI version emitted.
pub const OPENAPI_VERSION: &str = "3.1.0";

const ERROR_SCHEMA: &str = "ErrorEnvelope";
const ACCESS_TOKEN_SCHEME: &str = "accesstoken";

/// OpenAPI document root object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenApi {
    /// OpenAPI version.
    pub openapi: String,
    /// API metadata.
    pub info: Info,
    /// Available servers.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<Server>,
    /// Paths and their operations.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub paths: IndexMap<String, PathItem>,
    /// Shared schemas and security schemes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Components>,
}

/// API metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Info {
    /// API title.
    pub title: String,
    /// API version.
    pub version: String,
}

/// Server information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    /// Server URL.
    pub url: String,
}

/// Operations of a single path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathItem {
    /// GET operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    /// PUT operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    /// POST operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    /// DELETE operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    /// PATCH operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
}

impl PathItem {
    fn slot(&mut self, method: &Method) -> Option<&mut Option<Operation>> {
        match *method {
            Method::GET => Some(&mut self.get),
            Method::PUT => Some(&mut self.put),
            Method::POST => Some(&mut self.post),
            Method::DELETE => Some(&mut self.delete),
            Method::PATCH => Some(&mut self.patch),
            _ => None,
        }
    }
}

/// One API operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operation {
    /// Unique operation identifier.
    #[serde(rename = "operationId")]
    pub operation_id: String,
    /// Short summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Tags for grouping, one per resource.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Parameters.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    /// Request body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "requestBody")]
    pub request_body: Option<RequestBody>,
    /// Responses keyed by status code.
    pub responses: IndexMap<String, Response>,
    /// Security requirements.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub security: Vec<IndexMap<String, Vec<String>>>,
}

/// Parameter location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterIn {
    /// Query string parameter.
    Query,
    /// URL path parameter.
    Path,
}

/// An operation parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name.
    pub name: String,
    /// Location.
    #[serde(rename = "in")]
    pub location: ParameterIn,
    /// Description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Whether the parameter must be sent.
    #[serde(default)]
    pub required: bool,
    /// Value schema.
    pub schema: Value,
}

/// A request body description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestBody {
    /// Whether the body is required.
    pub required: bool,
    /// Body schema by media type.
    pub content: IndexMap<String, MediaType>,
}

/// Schema of one media type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaType {
    /// The schema.
    pub schema: Value,
}

/// A response description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    /// Description.
    pub description: String,
    /// Body schema by media type.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub content: IndexMap<String, MediaType>,
}

/// Shared components.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Components {
    /// Named schemas.
    pub schemas: IndexMap<String, Value>,
    /// Security schemes.
    #[serde(rename = "securitySchemes")]
    pub security_schemes: IndexMap<String, Value>,
}

/// Builds the API description of `routes`.
#[must_use]
pub fn describe(title: &str, version: &str, config: &ApiConfig, routes: &[&Route]) -> OpenApi {
    let mut paths: IndexMap<String, PathItem> = IndexMap::new();
    for route in routes {
        let item = paths.entry(route.path().to_string()).or_default();
        if let Some(slot) = item.slot(route.method()) {
            slot.get_or_insert_with(|| operation(route));
        }
    }

    OpenApi {
        openapi: OPENAPI_VERSION.to_string(),
        info: Info {
            title: title.to_string(),
            version: version.to_string(),
        },
        servers: if config.base_url.is_empty() {
            Vec::new()
        } else {
            vec![Server {
                url: config.base_url.clone(),
            }]
        },
        paths,
        components: Some(components()),
    }
}

fn operation(route: &Route) -> Operation {
    let parameters = route.params().iter().map(parameter).collect();
    let request_body = route.body_expected().then(|| RequestBody {
        required: true,
        content: json_content(json!({ "type": "object" })),
    });
    let mut responses = IndexMap::new();
    responses.insert(
        "200".to_string(),
        Response {
            description: format!("{} result", route.type_name()),
            content: json_content(json!({ "type": "object" })),
        },
    );
    responses.insert("default".to_string(), error_response());

    let security = if route.auth_required() {
        let mut requirement = IndexMap::new();
        requirement.insert(ACCESS_TOKEN_SCHEME.to_string(), Vec::new());
        vec![requirement]
    } else {
        Vec::new()
    };

    Operation {
        operation_id: route.operation_id().to_string(),
        summary: (!route.doc().is_empty()).then(|| route.doc().to_string()),
        tags: vec![route.resource().to_string()],
        parameters,
        request_body,
        responses,
        security,
    }
}

fn parameter(decl: &ParamDecl) -> Parameter {
    let location = match decl.kind() {
        ParamKind::Query => ParameterIn::Query,
        ParamKind::Path => ParameterIn::Path,
    };
    Parameter {
        name: decl.name().to_string(),
        location,
        description: decl.description().to_string(),
        required: decl.is_required() || location == ParameterIn::Path,
        schema: json!({ "type": decl.data_type_label() }),
    }
}

fn json_content(schema: Value) -> IndexMap<String, MediaType> {
    let mut content = IndexMap::new();
    content.insert("application/json".to_string(), MediaType { schema });
    content
}

fn error_response() -> Response {
    Response {
        description: "error envelope".to_string(),
        content: json_content(json!({ "$ref": format!("#/components/schemas/{ERROR_SCHEMA}") })),
    }
}

fn components() -> Components {
    let mut schemas = IndexMap::new();
    schemas.insert(
        ERROR_SCHEMA.to_string(),
        json!({
            "type": "object",
            "required": ["errors"],
            "properties": {
                "errors": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "required": ["statusCode", "description"],
                        "properties": {
                            "statusCode": { "type": "integer" },
                            "internalerror": { "type": "boolean" },
                            "description": { "type": "string" },
                            "source": {
                                "type": "object",
                                "properties": {
                                    "parameter": { "type": "string" },
                                    "pointer": { "type": "string" }
                                }
                            },
                            "context": { "type": "string" }
                        }
                    }
                }
            }
        }),
    );
    let mut security_schemes = IndexMap::new();
    security_schemes.insert(
        ACCESS_TOKEN_SCHEME.to_string(),
        json!({ "type": "apiKey", "in": "query", "name": ACCESS_TOKEN_SCHEME }),
    );
    Components {
        schemas,
        security_schemes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::CapabilityKind;

    fn route(capability: CapabilityKind, path: &str, auth_required: bool) -> Route {
        Route {
            method: capability.method(),
            path: path.to_string(),
            operation_id: format!("Widgets.{}", capability.operation()),
            capability,
            resource: "Widgets".to_string(),
            type_name: "widget".to_string(),
            doc: String::new(),
            params: vec![ParamDecl::query("q", "search")],
            auth_required,
            body_expected: capability == CapabilityKind::Create,
        }
    }

    #[test]
    fn test_describe_groups_methods_by_path() {
        let get = route(CapabilityKind::GetOne, "/widgets", false);
        let post = route(CapabilityKind::Create, "/widgets", true);
        let doc = describe("Shop", "1.0", &ApiConfig::new("http://shop"), &[&get, &post]);

        assert_eq!(doc.openapi, OPENAPI_VERSION);
        assert_eq!(doc.servers[0].url, "http://shop");
        let item = &doc.paths["/widgets"];
        assert_eq!(item.get.as_ref().unwrap().operation_id, "Widgets.getOne");
        let post = item.post.as_ref().unwrap();
        assert!(post.request_body.is_some());
        assert_eq!(post.security.len(), 1);
        assert!(item.get.as_ref().unwrap().security.is_empty());
    }

    #[test]
    fn test_document_serializes_error_schema() {
        let get = route(CapabilityKind::GetOne, "/widgets", false);
        let doc = serde_json::to_value(describe("Shop", "1.0", &ApiConfig::default(), &[&get])).unwrap();
        assert!(doc.get("servers").is_none());
        assert_eq!(
            doc["paths"]["/widgets"]["get"]["parameters"][0]["in"],
            "query"
        );
        assert!(doc["components"]["schemas"][ERROR_SCHEMA].is_object());
    }
}
