#![deny(missing_docs)]

//! # Mock Command
//!
//! Loads a document and serves generated responses for every endpoint it
//! declares.

use crate::config::S2rConfig;
use crate::error::{CliError, CliResult};
use s2r_core::{parse_document, CustomResponses, DocumentSource, MockDispatcher};
use s2r_web::{build_server, MockServerOptions, MockState};
use std::net::TcpListener;
use std::path::PathBuf;
use std::sync::Arc;

/// Default listening port.
pub const DEFAULT_PORT: u16 = 3001;

/// Arguments for the mock command.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct MockArgs {
    /// Path or URL of the OpenAPI / Swagger document.
    #[clap(env = "S2R_SOURCE")]
    pub source: Option<String>,

    /// Listening port [default: 3001].
    #[clap(long, short, env = "S2R_PORT")]
    pub port: Option<u16>,

    /// Interface to bind.
    #[clap(long, env = "S2R_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Delay every mocked response by this many milliseconds.
    #[clap(long, env = "S2R_DELAY")]
    pub delay: Option<u64>,

    /// Do not serve `/docs` and `/openapi.json`.
    #[clap(long)]
    pub no_ui: bool,

    /// Do not add CORS headers.
    #[clap(long)]
    pub no_cors: bool,

    /// Mount endpoint routes under this prefix (e.g. `/v1`).
    #[clap(long, env = "S2R_BASE_PATH")]
    pub base_path: Option<String>,

    /// JSON file of `"METHOD /path": {status, data}` overrides.
    #[clap(long, env = "S2R_CUSTOM_RESPONSES")]
    pub custom_responses: Option<PathBuf>,

    /// Seed the random source for reproducible responses.
    #[clap(long, env = "S2R_SEED")]
    pub seed: Option<u64>,

    /// Config file [default: ./.s2r.json when present].
    #[clap(long, env = "S2R_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Effective settings after merging flags, config file and defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct MockSettings {
    /// Document source.
    pub source: String,
    /// Bind address.
    pub host: String,
    /// Listening port.
    pub port: u16,
    /// Custom responses file.
    pub custom_responses: Option<PathBuf>,
    /// Random seed.
    pub seed: Option<u64>,
    /// Server switches.
    pub server: MockServerOptions,
}

/// Merges flags over the config file over defaults.
pub fn resolve_settings(args: &MockArgs, config: Option<S2rConfig>) -> CliResult<MockSettings> {
    let config = config.unwrap_or_default();
    let mock = config.mock;

    let source = args
        .source
        .clone()
        .or(config.swagger.source)
        .ok_or_else(|| {
            CliError::Config(
                "No document source: pass SOURCE or set swagger.source in .s2r.json".into(),
            )
        })?;

    Ok(MockSettings {
        source,
        host: args.host.clone(),
        port: args.port.or(mock.port).unwrap_or(DEFAULT_PORT),
        custom_responses: args.custom_responses.clone().or(mock.custom_responses),
        seed: args.seed.or(mock.seed),
        server: MockServerOptions {
            ui: !args.no_ui && mock.ui.unwrap_or(true),
            cors: !args.no_cors && mock.cors.unwrap_or(true),
            delay_ms: args.delay.or(mock.delay).unwrap_or(0),
            base_path: args.base_path.clone().or(mock.base_path),
        },
    })
}

/// Builds the shared server state for `settings`.
pub fn load_state(settings: &MockSettings) -> CliResult<MockState> {
    let doc = parse_document(&DocumentSource::from_arg(&settings.source))?;
    log::info!(
        "Loaded '{}' {} ({} endpoints, {} schemas)",
        doc.info.title,
        doc.info.version,
        doc.endpoints.len(),
        doc.schemas.len()
    );

    let custom = match &settings.custom_responses {
        Some(path) => {
            let custom = CustomResponses::from_file(path)?;
            log::info!("Loaded {} custom responses from {}", custom.len(), path.display());
            custom
        }
        None => CustomResponses::new(),
    };

    let dispatcher = MockDispatcher::new(Arc::new(doc))
        .with_custom_responses(custom)
        .with_seed(settings.seed);
    Ok(MockState::new(dispatcher, settings.server.clone()))
}

/// Executes the mock command; blocks until the server stops.
pub fn execute(args: &MockArgs) -> CliResult<()> {
    let cwd = std::env::current_dir()?;
    let config = S2rConfig::discover(args.config.as_deref(), &cwd)?;
    let settings = resolve_settings(args, config)?;
    let state = load_state(&settings)?;

    let listener = TcpListener::bind((settings.host.as_str(), settings.port))?;
    let addr = listener.local_addr()?;
    log::info!("Mock server listening on http://{}", addr);
    if settings.server.ui {
        log::info!("Documentation at http://{}/docs", addr);
    }

    actix_rt::System::new().block_on(async move { build_server(state, listener)?.await })?;
    Ok(())
}
