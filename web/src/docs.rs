//! Swagger UI page and the raw document it renders.

use crate::MockState;
use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use serde_json::{json, Value};

const SWAGGER_UI_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <title>{title} - Mock API</title>
  <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css" />
</head>
<body>
  <div id="swagger-ui"></div>
  <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js" crossorigin></script>
  <script>
    window.onload = () => {
      window.ui = SwaggerUIBundle({ url: "/openapi.json", dom_id: "#swagger-ui" });
    };
  </script>
</body>
</html>
"##;

/// Registers `/`, `/docs` and `/openapi.json`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/docs", web::get().to(swagger_ui))
        .route("/openapi.json", web::get().to(openapi_json));
}

async fn index() -> impl Responder {
    HttpResponse::Found()
        .insert_header((header::LOCATION, "/docs"))
        .finish()
}

async fn swagger_ui(state: web::Data<MockState>) -> impl Responder {
    let title = html_escape(&state.dispatcher.document().info.title);
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(SWAGGER_UI_HTML.replace("{title}", &title))
}

async fn openapi_json(req: HttpRequest, state: web::Data<MockState>) -> impl Responder {
    let doc = state.dispatcher.document();
    let mut raw = doc.raw.clone();
    if doc.version.is_oas3() {
        let url = format!(
            "{}://{}{}",
            req.connection_info().scheme(),
            req.connection_info().host(),
            state.options.mount_prefix()
        );
        prepend_server(&mut raw, &url);
    }
    HttpResponse::Ok().json(raw)
}

/// Puts the mock server first in an OAS3 `servers` list.
fn prepend_server(raw: &mut Value, url: &str) {
    let Some(root) = raw.as_object_mut() else {
        return;
    };
    let entry = json!({ "url": url, "description": "Mock server" });
    match root.get_mut("servers").and_then(Value::as_array_mut) {
        Some(servers) => servers.insert(0, entry),
        None => {
            root.insert("servers".into(), Value::Array(vec![entry]));
        }
    }
}

fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
