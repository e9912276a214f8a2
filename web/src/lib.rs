#![deny(missing_docs)]

//! # S2R Web Library
//!
//! Hosts a [`MockDispatcher`] on actix-web: one resource per path template,
//! health and info endpoints, the documentation UI, CORS headers and an
//! optional response delay.

use actix_web::dev::Server;
use actix_web::middleware::{Condition, DefaultHeaders, Logger};
use actix_web::{web, App, HttpServer};
use s2r_core::MockDispatcher;
use std::net::TcpListener;
use std::sync::Arc;

/// Documentation UI routes.
pub mod docs;

/// Request handlers.
pub mod handlers;

/// Runtime switches of the mock server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockServerOptions {
    /// Serve `/docs`, `/openapi.json` and the `/` redirect.
    pub ui: bool,
    /// Add `Access-Control-Allow-*` headers and answer stray `OPTIONS`.
    pub cors: bool,
    /// Milliseconds to wait before each mocked response.
    pub delay_ms: u64,
    /// Prefix under which endpoint routes are mounted (e.g. `/v2`).
    pub base_path: Option<String>,
}

impl Default for MockServerOptions {
    fn default() -> Self {
        Self {
            ui: true,
            cors: true,
            delay_ms: 0,
            base_path: None,
        }
    }
}

impl MockServerOptions {
    /// Normalized mount prefix: empty, or `/segment` without a trailing slash.
    pub fn mount_prefix(&self) -> String {
        let trimmed = self
            .base_path
            .as_deref()
            .unwrap_or_default()
            .trim()
            .trim_matches('/');
        if trimmed.is_empty() {
            String::new()
        } else {
            format!("/{}", trimmed)
        }
    }
}

/// Shared application state.
#[derive(Debug, Clone)]
pub struct MockState {
    /// Request dispatcher (document, registry, custom responses).
    pub dispatcher: Arc<MockDispatcher>,
    /// Server switches.
    pub options: Arc<MockServerOptions>,
}

impl MockState {
    /// Wraps a dispatcher and options for sharing across workers.
    pub fn new(dispatcher: MockDispatcher, options: MockServerOptions) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
            options: Arc::new(options),
        }
    }
}

/// CORS headers added to every response when enabled.
pub fn cors_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add(("Access-Control-Allow-Origin", "*"))
        .add((
            "Access-Control-Allow-Methods",
            "GET, POST, PUT, DELETE, PATCH, OPTIONS, HEAD",
        ))
        .add((
            "Access-Control-Allow-Headers",
            "Content-Type, Authorization, X-Requested-With",
        ))
}

/// Registers built-in routes, one resource per endpoint template and the
/// catch-all service.
///
/// Built-in routes are registered first so they win over document paths.
/// Templates with fewer parameters are registered before templated siblings.
/// Methods a resource does not declare fall through to the catch-all.
pub fn configure(cfg: &mut web::ServiceConfig, state: &MockState) {
    cfg.app_data(web::Data::new(state.clone()))
        .route("/health", web::get().to(handlers::health))
        .route("/api-info", web::get().to(handlers::api_info));

    if state.options.ui {
        docs::configure(cfg);
    }

    let prefix = state.options.mount_prefix();
    let registry = state.dispatcher.registry();
    for group in registry.templates() {
        let mut resource = web::resource(format!("{}{}", prefix, group.router_path))
            .default_service(web::to(handlers::fallback));
        for endpoint in group.endpoints {
            let method = endpoint.method;
            let template = endpoint.path.clone();
            resource = resource.route(web::method(handlers::actix_method(method)).to(
                move |req: actix_web::HttpRequest, state: web::Data<MockState>| {
                    let template = template.clone();
                    async move { handlers::mock_endpoint(req, state, method, template).await }
                },
            ));
        }
        cfg.service(resource);
    }

    cfg.default_service(web::to(handlers::fallback));
}

/// Builds the HTTP server on an already bound listener.
pub fn build_server(state: MockState, listener: TcpListener) -> std::io::Result<Server> {
    let cors = state.options.cors;
    Ok(HttpServer::new(move || {
        let state = state.clone();
        App::new()
            .wrap(Condition::new(cors, cors_headers()))
            .wrap(Logger::default())
            .configure(move |cfg| configure(cfg, &state))
    })
    .listen(listener)?
    .run())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use s2r_core::normalize_value;
    use serde_json::{json, Value};

    pub(crate) const PETSTORE: &str = r##"{
        "openapi": "3.0.0",
        "info": { "title": "Petstore", "version": "1.0.0" },
        "servers": [ { "url": "https://petstore.example.com/v1" } ],
        "paths": {
            "/pets": {
                "get": {
                    "tags": ["pets"],
                    "responses": { "200": { "description": "ok", "content": { "application/json": {
                        "schema": { "type": "array", "items": { "$ref": "#/components/schemas/Pet" } }
                    } } } }
                },
                "post": { "responses": { "201": { "description": "created" } } }
            },
            "/pets/findByStatus": {
                "get": { "responses": { "200": { "description": "ok", "content": { "application/json": {
                    "schema": { "type": "string", "enum": ["literal"] }
                } } } } }
            },
            "/pets/{pet-id}": {
                "get": { "responses": { "200": { "description": "ok", "content": { "application/json": {
                    "schema": { "$ref": "#/components/schemas/Pet" }
                } } } } }
            }
        },
        "components": { "schemas": { "Pet": {
            "type": "object",
            "required": ["id", "name"],
            "properties": {
                "id": { "type": "integer", "format": "int64" },
                "name": { "type": "string" },
                "secret": { "type": "string", "writeOnly": true }
            }
        } } }
    }"##;

    pub(crate) fn state(options: MockServerOptions) -> MockState {
        let raw: Value = serde_json::from_str(PETSTORE).unwrap();
        let doc = normalize_value(raw).unwrap();
        MockState::new(MockDispatcher::new(Arc::new(doc)), options)
    }

    #[actix_web::test]
    async fn test_health_check() {
        let state = state(MockServerOptions::default());
        let app = test::init_service(App::new().configure(|cfg| configure(cfg, &state))).await;
        let req = test::TestRequest::get().uri("/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], json!("ok"));
        assert_eq!(body["service"], json!("s2r-mock"));
        assert_eq!(body["version"], json!("1.0.0"));
        assert_eq!(body["endpoints"], json!(4));
        assert_eq!(body["schemas"], json!(1));
    }

    #[actix_web::test]
    async fn test_generated_bodies_and_route_priority() {
        let state = state(MockServerOptions::default());
        let app = test::init_service(App::new().configure(|cfg| configure(cfg, &state))).await;

        let req = test::TestRequest::get().uri("/pets/findByStatus").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!("literal"));

        let req = test::TestRequest::get().uri("/pets/12").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let pet: Value = test::read_body_json(resp).await;
        assert!(pet["id"].is_i64());
        assert!(pet.get("secret").is_none());

        let req = test::TestRequest::post().uri("/pets").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created: Value = test::read_body_json(resp).await;
        assert_eq!(created["message"], json!("Success"));
        assert!(created["id"].is_i64());
    }

    #[actix_web::test]
    async fn test_unknown_route_is_json_404() {
        let state = state(MockServerOptions::default());
        let app = test::init_service(App::new().configure(|cfg| configure(cfg, &state))).await;
        let req = test::TestRequest::delete().uri("/owners/1").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], json!("Not Found"));
    }

    #[actix_web::test]
    async fn test_cors_headers_and_preflight() {
        let state = state(MockServerOptions::default());
        let app = test::init_service(
            App::new()
                .wrap(Condition::new(true, cors_headers()))
                .configure(|cfg| configure(cfg, &state)),
        )
        .await;
        let req = test::TestRequest::default()
            .method(actix_web::http::Method::OPTIONS)
            .uri("/pets")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get("Access-Control-Allow-Origin").unwrap(),
            "*"
        );
    }

    #[actix_web::test]
    async fn test_base_path_mounting() {
        let state = state(MockServerOptions {
            base_path: Some("v1/".into()),
            ..MockServerOptions::default()
        });
        let app = test::init_service(App::new().configure(|cfg| configure(cfg, &state))).await;

        let req = test::TestRequest::get().uri("/v1/pets").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let req = test::TestRequest::get().uri("/pets").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[std::prelude::v1::test]
    fn test_mount_prefix() {
        let opts = |p: Option<&str>| MockServerOptions {
            base_path: p.map(str::to_string),
            ..MockServerOptions::default()
        };
        assert_eq!(opts(None).mount_prefix(), "");
        assert_eq!(opts(Some("/")).mount_prefix(), "");
        assert_eq!(opts(Some("/v2/")).mount_prefix(), "/v2");
        assert_eq!(opts(Some("api")).mount_prefix(), "/api");
    }

    #[actix_web::test]
    async fn test_build_server_start_stop() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let server = build_server(state(MockServerOptions::default()), listener).unwrap();
        let handle = server.handle();
        actix_web::rt::spawn(server);
        handle.stop(true).await;
    }
}
