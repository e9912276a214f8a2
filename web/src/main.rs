#![deny(missing_docs)]

//! # S2R Web Binary
//!
//! Serves mocks for the document named by `S2R_SOURCE` (path or URL).

use s2r_core::{parse_document, DocumentSource, MockDispatcher};
use s2r_web::{build_server, MockServerOptions, MockState};
use std::io;
use std::net::TcpListener;
use std::sync::Arc;

fn resolve_bind_addr() -> String {
    std::env::var("S2R_WEB_BIND").unwrap_or_else(|_| "127.0.0.1:3001".to_string())
}

fn load_state() -> io::Result<MockState> {
    let source = std::env::var("S2R_SOURCE")
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "S2R_SOURCE is not set"))?;
    let doc = parse_document(&DocumentSource::from_arg(&source))
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;
    log::info!(
        "Loaded '{}' ({} endpoints, {} schemas)",
        doc.info.title,
        doc.endpoints.len(),
        doc.schemas.len()
    );
    Ok(MockState::new(
        MockDispatcher::new(Arc::new(doc)),
        MockServerOptions::default(),
    ))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let state = load_state()?;
    let listener = TcpListener::bind(resolve_bind_addr())?;
    log::info!("Mock server listening on http://{}", listener.local_addr()?);
    let server = build_server(state, listener)?;

    if std::env::var("S2R_WEB_ONESHOT").is_ok() {
        server.handle().stop(true).await;
    }

    server.await
}
