#![deny(missing_docs)]

//! # Mock Dispatcher
//!
//! Framework-agnostic request handling for the mock server:
//!
//! 1. a custom response registered for `"METHOD /path"` wins;
//! 2. otherwise the success response of the endpoint is selected and its
//!    schema fed to the generator;
//! 3. endpoints without a usable schema get a generic success payload.
//!
//! A panic raised while generating is caught and reported as a 500 body.

use crate::error::{AppError, AppResult};
use crate::mock::context::MockOptions;
use crate::mock::generator::MockGenerator;
use crate::oas::models::{Endpoint, HttpMethod, MediaType, ParsedDocument, ResponseDef};
use crate::oas::registry::EndpointRegistry;
use chrono::{SecondsFormat, Utc};
use indexmap::IndexMap;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;

/// A canned response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomResponse {
    /// HTTP status, 200 when omitted.
    #[serde(default = "default_status")]
    pub status: u16,
    /// Response body (`body` is accepted as an alias).
    #[serde(default, alias = "body")]
    pub data: Value,
}

fn default_status() -> u16 {
    200
}

/// Canned responses keyed by `"METHOD /path"`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomResponses(IndexMap<String, CustomResponse>);

impl CustomResponses {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON object of `"METHOD /path": {status, data}` entries.
    pub fn from_json_str(text: &str) -> AppResult<Self> {
        let raw: IndexMap<String, CustomResponse> = serde_json::from_str(text)
            .map_err(|e| AppError::Parse(format!("Invalid custom responses: {}", e)))?;
        let mut out = Self::new();
        for (key, response) in raw {
            match key.trim().split_once(char::is_whitespace) {
                Some((method, path)) => out.insert(method, path.trim(), response),
                None => log::warn!("Ignoring custom response with malformed key '{}'", key),
            }
        }
        Ok(out)
    }

    /// Reads a custom responses file.
    pub fn from_file(path: &Path) -> AppResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            AppError::Fetch(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&text)
    }

    /// Registers a response; the method is matched case-insensitively.
    pub fn insert(&mut self, method: &str, path: &str, response: CustomResponse) {
        self.0.insert(
            format!("{} {}", method.to_ascii_uppercase(), path),
            response,
        );
    }

    /// Exact lookup.
    pub fn get(&self, method: HttpMethod, path: &str) -> Option<&CustomResponse> {
        self.0.get(&format!("{} {}", method, path))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Status and JSON body of a mocked reply.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MockResponse {
    /// HTTP status.
    pub status: u16,
    /// JSON body.
    pub body: Value,
}

impl MockResponse {
    /// 404 for a request no endpoint declares.
    pub fn not_found(method: HttpMethod, path: &str) -> Self {
        Self {
            status: 404,
            body: json!({
                "error": "Not Found",
                "message": format!("No mock endpoint for {} {}", method, path),
            }),
        }
    }
}

/// Answers requests for one document.
#[derive(Debug, Clone)]
pub struct MockDispatcher {
    document: Arc<ParsedDocument>,
    registry: EndpointRegistry,
    custom: CustomResponses,
    options: MockOptions,
    seed: Option<u64>,
}

impl MockDispatcher {
    /// Builds the dispatcher and its endpoint registry.
    pub fn new(document: Arc<ParsedDocument>) -> Self {
        let registry = EndpointRegistry::new(document.endpoints.clone());
        Self {
            document,
            registry,
            custom: CustomResponses::new(),
            options: MockOptions::default(),
            seed: None,
        }
    }

    /// Sets the canned responses.
    pub fn with_custom_responses(mut self, custom: CustomResponses) -> Self {
        self.custom = custom;
        self
    }

    /// Sets generator options.
    pub fn with_options(mut self, options: MockOptions) -> Self {
        self.options = options;
        self
    }

    /// Seeds every request's random source with `seed`.
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// The normalized document.
    pub fn document(&self) -> &ParsedDocument {
        &self.document
    }

    /// The endpoint registry.
    pub fn registry(&self) -> &EndpointRegistry {
        &self.registry
    }

    /// Matches a concrete request path and answers it; 404 when no endpoint fits.
    pub fn dispatch(&self, method: HttpMethod, path: &str) -> MockResponse {
        match self.registry.match_request(method, path) {
            Some(matched) => self.respond(matched.endpoint, path),
            None => match self.custom.get(method, path) {
                Some(custom) => custom_reply(custom),
                None => MockResponse::not_found(method, path),
            },
        }
    }

    /// Answers a request already routed to `endpoint`.
    ///
    /// The custom response key is tried with the literal request path first,
    /// then with the endpoint's template.
    pub fn respond(&self, endpoint: &Endpoint, request_path: &str) -> MockResponse {
        let custom = self
            .custom
            .get(endpoint.method, request_path)
            .or_else(|| self.custom.get(endpoint.method, &endpoint.path));
        if let Some(custom) = custom {
            log::debug!("{} {}: custom response", endpoint.method, request_path);
            return custom_reply(custom);
        }

        guard_generation(endpoint, || self.generate(endpoint))
    }

    /// Generates a reply from the endpoint's success response.
    pub fn generate(&self, endpoint: &Endpoint) -> MockResponse {
        let mut rng = self.rng();
        let success = select_success(endpoint);
        let status = success.and_then(ResponseDef::status).unwrap_or(200);

        let media = success.and_then(|resp| select_media(&resp.content));
        let body = match media {
            Some(MediaType {
                schema: Some(schema),
                ..
            }) => MockGenerator::with_options(&self.document.schemas, self.options.clone())
                .generate(schema, &mut rng),
            Some(MediaType {
                example: Some(example),
                ..
            }) => example.clone(),
            _ => fallback_body(endpoint.method, &mut rng),
        };

        MockResponse { status, body }
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

/// Runs `generate`, turning a panic into a 500 reply.
fn guard_generation<F>(endpoint: &Endpoint, generate: F) -> MockResponse
where
    F: FnOnce() -> MockResponse,
{
    match catch_unwind(AssertUnwindSafe(generate)) {
        Ok(response) => response,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            log::error!("Mock generation for {} panicked: {}", endpoint.key(), message);
            MockResponse {
                status: 500,
                body: json!({ "error": "Mock generation failed", "message": message }),
            }
        }
    }
}

fn custom_reply(custom: &CustomResponse) -> MockResponse {
    MockResponse {
        status: custom.status,
        body: custom.data.clone(),
    }
}

/// `201`, else `200`, else the first 2xx (explicit or range).
pub fn select_success(endpoint: &Endpoint) -> Option<&ResponseDef> {
    endpoint
        .response("201")
        .or_else(|| endpoint.response("200"))
        .or_else(|| endpoint.responses.iter().find(|r| r.is_success()))
}

/// Prefers JSON-compatible media types, then the first declared one.
pub fn select_media(content: &IndexMap<String, MediaType>) -> Option<&MediaType> {
    let rank = |media_type: &str| -> u8 {
        let essence = media_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            "application/json" => 0,
            "*/*" => 1,
            "application/*" => 2,
            _ if essence.ends_with("+json") => 3,
            _ => 4,
        }
    };
    content
        .iter()
        .enumerate()
        .min_by_key(|(idx, (media_type, _))| (rank(media_type.as_str()), *idx))
        .map(|(_, (_, media))| media)
}

fn fallback_body<R: Rng + ?Sized>(method: HttpMethod, rng: &mut R) -> Value {
    let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    if method.is_write() {
        json!({
            "id": rng.gen_range(1..=1000),
            "message": "Success",
            "timestamp": timestamp,
        })
    } else {
        json!({ "message": "Success", "timestamp": timestamp })
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
