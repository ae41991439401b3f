//! End-to-end dispatch behaviour through the full service.

mod common;

use common::{Calls, Fixture, TOKEN};
use http::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn test_get_one_without_ids_calls_get_one() {
    let fx = Fixture::with_widgets(&[("1", "gear"), ("2", "cog")]);

    let response = fx.client.get("/widgets").send().await;

    response.assert_status(StatusCode::OK);
    let body: Value = response.json().unwrap();
    assert_eq!(body["widgets"].as_array().unwrap().len(), 2);
    assert_eq!(Calls::count(&fx.widgets.get_one), 1);
    assert_eq!(Calls::count(&fx.widgets.get_by_ids), 0);
}

#[tokio::test]
async fn test_ids_query_redirects_to_get_by_ids() {
    let fx = Fixture::with_widgets(&[("1", "gear"), ("2", "cog")]);

    let response = fx
        .client
        .get("/widgets")
        .query("ids[]", "2")
        .query("ids[]", "1")
        .send()
        .await;

    response.assert_status(StatusCode::OK);
    let body: Value = response.json().unwrap();
    assert_eq!(body["ids"], json!(["2", "1"]));
    assert_eq!(Calls::count(&fx.widgets.get_one), 0);
    assert_eq!(Calls::count(&fx.widgets.get_by_ids), 1);
}

#[tokio::test]
async fn test_empty_ids_key_still_redirects() {
    let fx = Fixture::new();

    let response = fx.client.get("/widgets?ids[]=").send().await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let error = response.first_error().unwrap();
    assert_eq!(error["description"], "No item-id(s) specified");
    assert_eq!(error["context"], "validate");
    assert_eq!(Calls::count(&fx.widgets.get_one), 0);
    assert_eq!(Calls::count(&fx.widgets.get_by_ids), 0);
}

#[tokio::test]
async fn test_ids_only_query_order_preserved() {
    let fx = Fixture::new();

    let response = fx
        .client
        .get("/parts")
        .query("ids[]", "1")
        .query("ids[]", "2")
        .send()
        .await;

    response.assert_status(StatusCode::OK);
    let body: Value = response.json().unwrap();
    assert_eq!(body["ids"], json!(["1", "2"]));
}

#[tokio::test]
async fn test_ids_only_path_segment() {
    let fx = Fixture::new();

    let response = fx.client.get("/parts/42").send().await;

    response.assert_status(StatusCode::OK);
    let body: Value = response.json().unwrap();
    assert_eq!(body["ids"], json!(["42"]));
}

#[tokio::test]
async fn test_ids_union_of_query_and_path() {
    let fx = Fixture::new();

    let response = fx
        .client
        .get("/parts/7")
        .query("ids[]", "3")
        .query("ids[]", "7")
        .send()
        .await;

    let body: Value = response.json().unwrap();
    assert_eq!(body["ids"], json!(["3", "7"]));
}

#[tokio::test]
async fn test_ids_only_without_ids_is_bad_request() {
    let fx = Fixture::new();

    let response = fx.client.get("/parts").send().await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let error = response.first_error().unwrap();
    assert_eq!(error["statusCode"], 400);
    assert_eq!(error["context"], "validate");
    assert_eq!(error["source"]["parameter"], "ids[]");
    assert_eq!(Calls::count(&fx.parts.get_by_ids), 0);
}

#[tokio::test]
async fn test_missing_required_parameter() {
    let fx = Fixture::new();

    let response = fx.client.get("/hello").send().await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let error = response.first_error().unwrap();
    assert_eq!(error["context"], "validate");
    assert_eq!(error["source"]["parameter"], "name");
    assert!(error.get("internalerror").is_none());
    assert_eq!(Calls::count(&fx.hello.get_one), 0);
}

#[tokio::test]
async fn test_plus_decodes_to_space() {
    let fx = Fixture::new();

    let response = fx.client.get("/hello?name=big+world").send().await;

    response.assert_status(StatusCode::OK);
    let body: Value = response.json().unwrap();
    assert_eq!(body["reply"], "Hello big world");
}

#[tokio::test]
async fn test_create_without_token_is_unauthorized() {
    let fx = Fixture::new();

    // Body is not even JSON: authentication fails before decoding.
    let response = fx.client.post("/widgets").body("not json").send().await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let error = response.first_error().unwrap();
    assert_eq!(error["context"], "POST");
    assert_eq!(error["description"], "Invalid accesstoken");
    assert_eq!(Calls::count(&fx.widgets.create), 0);
    assert!(fx.widgets.validated_as.read().is_none());
}

#[tokio::test]
async fn test_every_auth_required_write_rejects_bad_token() {
    let fx = Fixture::with_widgets(&[("1", "gear")]);
    let body = json!({ "name": "cog" });

    let cases = [
        (fx.client.post("/widgets"), "POST"),
        (fx.client.put("/widgets/1"), "PUT"),
        (fx.client.patch("/widgets/1"), "PATCH"),
        (fx.client.delete("/widgets/1"), "DELETE"),
    ];

    for (request, verb) in cases {
        let response = request
            .query("accesstoken", "wrong")
            .json(&body)
            .send()
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(response.first_error().unwrap()["context"], verb);
    }

    assert_eq!(Calls::count(&fx.widgets.create), 0);
    assert_eq!(Calls::count(&fx.widgets.replace), 0);
    assert_eq!(Calls::count(&fx.widgets.update), 0);
    assert_eq!(Calls::count(&fx.widgets.delete), 0);
}

#[tokio::test]
async fn test_principal_stored_before_validation() {
    let fx = Fixture::new();

    let response = fx
        .client
        .post("/widgets")
        .query("accesstoken", TOKEN)
        .json(&json!({ "name": "sprocket" }))
        .send()
        .await;

    response.assert_status(StatusCode::CREATED);
    assert_eq!(fx.widgets.validated_as.read().as_deref(), Some(TOKEN));
    assert_eq!(Calls::count(&fx.widgets.create), 1);
}

#[tokio::test]
async fn test_create_with_bearer_header() {
    let fx = Fixture::new();

    let response = fx
        .client
        .post("/widgets")
        .bearer_token(TOKEN)
        .json(&json!({ "name": "sprocket" }))
        .send()
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json().unwrap();
    assert_eq!(body["name"], "sprocket");
}

#[tokio::test]
async fn test_unparsable_body() {
    let fx = Fixture::new();

    let response = fx
        .client
        .post("/widgets")
        .query("accesstoken", TOKEN)
        .body("{\"name\":")
        .send()
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let error = response.first_error().unwrap();
    assert_eq!(error["context"], "POST Data Validation");
    assert_eq!(error["description"], "can't parse request data");
    assert_eq!(Calls::count(&fx.widgets.create), 0);
}

#[tokio::test]
async fn test_domain_validation_failure() {
    let fx = Fixture::new();

    let response = fx
        .client
        .post("/widgets")
        .query("accesstoken", TOKEN)
        .json(&json!({ "name": "  " }))
        .send()
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let error = response.first_error().unwrap();
    assert_eq!(error["context"], "POST Data Validation");
    assert_eq!(error["description"], "name must not be empty");
    assert_eq!(error["source"]["pointer"], "/name");
    assert_eq!(Calls::count(&fx.widgets.create), 0);
}

#[tokio::test]
async fn test_replace_update_delete_address_item() {
    let fx = Fixture::with_widgets(&[("1", "gear")]);

    let replaced = fx
        .client
        .put("/widgets/1")
        .query("accesstoken", TOKEN)
        .json(&json!({ "name": "cog" }))
        .send()
        .await;
    replaced.assert_status(StatusCode::OK);
    assert_eq!(replaced.json::<Value>().unwrap()["name"], "cog");

    // NoBody: anything in the body is ignored.
    let updated = fx
        .client
        .patch("/widgets/1")
        .query("accesstoken", TOKEN)
        .body("ignored")
        .send()
        .await;
    updated.assert_status(StatusCode::OK);
    assert_eq!(updated.json::<Value>().unwrap()["name"], "COG");

    fx.client
        .delete("/widgets/1")
        .query("accesstoken", TOKEN)
        .send()
        .await
        .assert_status(StatusCode::OK);

    let gone = fx.client.get("/widgets/1").send().await;
    gone.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(gone.first_error().unwrap()["description"], "This widget does not exist.");
}

#[tokio::test]
async fn test_empty_result_uses_substitute() {
    let fx = Fixture::new();

    let response = fx.client.get("/widgets").query("name", "nothing").send().await;

    response.assert_status(StatusCode::OK);
    let body: Value = response.json().unwrap();
    assert_eq!(body, json!({ "widgets": [], "empty": true }));
}

#[tokio::test]
async fn test_unknown_route_and_wrong_method() {
    let fx = Fixture::new();

    let missing = fx.client.get("/gadgets").send().await;
    missing.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(missing.first_error().unwrap()["context"], "route");

    let wrong = fx.client.post("/hello").send().await;
    wrong.assert_status(StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(wrong.header("allow"), Some("GET"));
}

#[tokio::test]
async fn test_request_id_header_on_dispatched_routes() {
    let fx = Fixture::new();

    let first = fx.client.get("/hello?name=a").send().await;
    let second = fx.client.get("/hello?name=b").send().await;

    let a = first.header("x-request-id").unwrap().to_string();
    let b = second.header("x-request-id").unwrap();
    assert_ne!(a, b);
}
