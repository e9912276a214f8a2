use actix_web::http::StatusCode;
use actix_web::{test, App};
use pretty_assertions::assert_eq;
use s2r_core::{parse_document, CustomResponses, DocumentSource, MockDispatcher};
use s2r_web::{configure, MockServerOptions, MockState};
use serde_json::{json, Value};
use std::io::Write;
use std::sync::Arc;

const STORE_V2: &str = r#"
swagger: "2.0"
info:
  title: Store
  version: "1.0"
host: api.example.com
basePath: /v2
produces:
  - application/json
paths:
  /orders/{orderId}:
    get:
      parameters:
        - name: orderId
          in: path
          type: integer
      responses:
        '200':
          description: ok
          schema:
            $ref: '#/definitions/Order'
        '404':
          description: missing
definitions:
  Order:
    type: object
    required: [id, status]
    properties:
      id:
        type: integer
        minimum: 1
        maximum: 10
      status:
        type: string
        enum: [placed, delivered]
      children:
        type: array
        items:
          $ref: '#/definitions/Order'
"#;

fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn store_state(custom: CustomResponses) -> MockState {
    let spec = write_temp(".yaml", STORE_V2);
    let doc = parse_document(&DocumentSource::Path(spec.path().to_path_buf())).unwrap();
    MockState::new(
        MockDispatcher::new(Arc::new(doc))
            .with_custom_responses(custom)
            .with_seed(Some(7)),
        MockServerOptions::default(),
    )
}

#[actix_web::test]
async fn test_swagger2_document_is_mocked() {
    let state = store_state(CustomResponses::new());
    let app = test::init_service(App::new().configure(|cfg| configure(cfg, &state))).await;

    let req = test::TestRequest::get().uri("/orders/3").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let order: Value = test::read_body_json(resp).await;
    let id = order["id"].as_i64().unwrap();
    assert!((1..=10).contains(&id));
    assert!(["placed", "delivered"].contains(&order["status"].as_str().unwrap()));

    let req = test::TestRequest::get().uri("/api-info").to_request();
    let info: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(info["servers"][0]["url"], json!("https://api.example.com/v2"));
    assert_eq!(info["endpointCount"], json!(1));
    assert_eq!(info["schemaCount"], json!(1));
}

#[actix_web::test]
async fn test_swagger2_openapi_json_is_served_unchanged() {
    let state = store_state(CustomResponses::new());
    let app = test::init_service(App::new().configure(|cfg| configure(cfg, &state))).await;

    let req = test::TestRequest::get().uri("/openapi.json").to_request();
    let raw: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(raw["swagger"], json!("2.0"));
    assert!(raw.get("servers").is_none());
    assert_eq!(raw["host"], json!("api.example.com"));
}

#[actix_web::test]
async fn test_custom_responses_file_overrides_generation() {
    let file = write_temp(
        ".json",
        r#"{
            "GET /orders/999": { "status": 404, "data": { "message": "Order not found" } },
            "delete /orders/1": { "body": { "deleted": true } }
        }"#,
    );
    let custom = CustomResponses::from_file(file.path()).unwrap();
    assert_eq!(custom.len(), 2);

    let state = store_state(custom);
    let app = test::init_service(App::new().configure(|cfg| configure(cfg, &state))).await;

    let req = test::TestRequest::get().uri("/orders/999").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "message": "Order not found" }));

    // Not declared by the document, answered from the custom set.
    let req = test::TestRequest::delete().uri("/orders/1").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "deleted": true }));
}
