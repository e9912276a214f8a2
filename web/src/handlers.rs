//! Health, info and mock endpoint handlers.

use crate::MockState;
use actix_web::http::{Method, StatusCode};
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use chrono::{SecondsFormat, Utc};
use s2r_core::{HttpMethod, MockResponse};
use serde_json::json;
use std::time::Duration;

/// Maps a document method onto the router's method type.
pub fn actix_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Post => Method::POST,
        HttpMethod::Delete => Method::DELETE,
        HttpMethod::Options => Method::OPTIONS,
        HttpMethod::Head => Method::HEAD,
        HttpMethod::Patch => Method::PATCH,
    }
}

/// `GET /health`
pub async fn health(state: web::Data<MockState>) -> impl Responder {
    let doc = state.dispatcher.document();
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        "service": "s2r-mock",
        "version": doc.info.version,
        "endpoints": doc.endpoints.len(),
        "schemas": doc.schemas.len(),
    }))
}

/// `GET /api-info`
pub async fn api_info(state: web::Data<MockState>) -> impl Responder {
    let doc = state.dispatcher.document();
    HttpResponse::Ok().json(json!({
        "info": doc.info,
        "servers": doc.servers,
        "endpointCount": doc.endpoints.len(),
        "schemaCount": doc.schemas.len(),
    }))
}

/// Route registered for one `(method, template)` pair.
pub async fn mock_endpoint(
    req: HttpRequest,
    state: web::Data<MockState>,
    method: HttpMethod,
    template: String,
) -> HttpResponse {
    delay(&state).await;

    let prefix = state.options.mount_prefix();
    let request_path = strip_prefix(req.path(), &prefix);
    let reply = match state.dispatcher.registry().lookup(method, &template) {
        Some(endpoint) => state.dispatcher.respond(endpoint, request_path),
        None => MockResponse::not_found(method, request_path),
    };
    log::debug!("{} {} -> {}", method, req.path(), reply.status);
    into_http(reply)
}

/// Catch-all: CORS preflight, then concrete-path matching, then 404.
pub async fn fallback(req: HttpRequest, state: web::Data<MockState>) -> HttpResponse {
    if state.options.cors && req.method() == Method::OPTIONS {
        return HttpResponse::Ok().finish();
    }

    let Ok(method) = req.method().as_str().parse::<HttpMethod>() else {
        return into_http(MockResponse {
            status: 404,
            body: json!({
                "error": "Not Found",
                "message": format!("Unsupported method {}", req.method()),
            }),
        });
    };

    let prefix = state.options.mount_prefix();
    if !prefix.is_empty() && !req.path().starts_with(&prefix) {
        return into_http(MockResponse::not_found(method, req.path()));
    }

    delay(&state).await;
    into_http(
        state
            .dispatcher
            .dispatch(method, strip_prefix(req.path(), &prefix)),
    )
}

async fn delay(state: &MockState) {
    if state.options.delay_ms > 0 {
        actix_web::rt::time::sleep(Duration::from_millis(state.options.delay_ms)).await;
    }
}

fn strip_prefix<'a>(path: &'a str, prefix: &str) -> &'a str {
    match path.strip_prefix(prefix) {
        Some("") => "/",
        Some(rest) if !prefix.is_empty() => rest,
        _ => path,
    }
}

fn into_http(reply: MockResponse) -> HttpResponse {
    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    HttpResponse::build(status).json(reply.body)
}
