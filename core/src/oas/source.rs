#![deny(missing_docs)]

//! # Document Acquisition
//!
//! Turns a file path, an HTTP(S) URL or an in-memory value into a raw JSON
//! document plus the URI it was retrieved from (used as the base for relative
//! cross-document `$ref`s).
//!
//! A single fetch attempt is made; there is no retry or backoff.

use crate::error::{AppError, AppResult};
use serde_json::Value;
use std::path::{Path, PathBuf};
use url::Url;

/// Where a document comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentSource {
    /// Local JSON or YAML file.
    Path(PathBuf),
    /// HTTP(S) URL.
    Url(String),
    /// An already-parsed document.
    Value(Value),
}

impl DocumentSource {
    /// Interprets a CLI/config argument: `http://` and `https://` prefixes are
    /// URLs, everything else is a file path.
    pub fn from_arg(arg: &str) -> Self {
        let lower = arg.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            DocumentSource::Url(arg.to_string())
        } else {
            DocumentSource::Path(PathBuf::from(arg))
        }
    }

    /// Human readable description for logs.
    pub fn describe(&self) -> String {
        match self {
            DocumentSource::Path(path) => path.display().to_string(),
            DocumentSource::Url(url) => url.clone(),
            DocumentSource::Value(_) => "<in-memory document>".to_string(),
        }
    }
}

/// Retrieves document text by URI.
///
/// The seam exists so cross-document resolution can be exercised without a
/// network; production code uses [`DefaultFetcher`].
pub trait DocumentFetcher {
    /// Returns the document body at `url`.
    fn fetch(&self, url: &Url) -> AppResult<String>;
}

/// Reads `file://` URIs from disk and `http(s)://` URIs over the network.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFetcher;

impl DocumentFetcher for DefaultFetcher {
    fn fetch(&self, url: &Url) -> AppResult<String> {
        match url.scheme() {
            "file" => {
                let path = url
                    .to_file_path()
                    .map_err(|_| AppError::Fetch(format!("Invalid file URI: {}", url)))?;
                read_file(&path)
            }
            "http" | "https" => fetch_http(url),
            other => Err(AppError::Fetch(format!(
                "Unsupported URI scheme '{}' in {}",
                other, url
            ))),
        }
    }
}

#[cfg(feature = "client")]
fn fetch_http(url: &Url) -> AppResult<String> {
    log::debug!("Fetching {}", url);
    let mut response = ureq::get(url.as_str())
        .call()
        .map_err(|e| AppError::Fetch(format!("Failed to fetch {}: {}", url, e)))?;
    response
        .body_mut()
        .read_to_string()
        .map_err(|e| AppError::Fetch(format!("Failed to read response from {}: {}", url, e)))
}

#[cfg(not(feature = "client"))]
fn fetch_http(url: &Url) -> AppResult<String> {
    Err(AppError::Fetch(format!(
        "Cannot fetch {}: built without the 'client' feature",
        url
    )))
}

fn read_file(path: &Path) -> AppResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| AppError::Fetch(format!("Failed to read {}: {}", path.display(), e)))
}

/// A raw document and its retrieval URI.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedDocument {
    /// Retrieval URI (`None` for in-memory values).
    pub uri: Option<Url>,
    /// Parsed content.
    pub root: Value,
}

/// Loads a document from any source.
pub fn load_document(
    source: &DocumentSource,
    fetcher: &dyn DocumentFetcher,
) -> AppResult<LoadedDocument> {
    match source {
        DocumentSource::Value(value) => Ok(LoadedDocument {
            uri: None,
            root: value.clone(),
        }),
        DocumentSource::Path(path) => {
            let uri = file_uri(path)?;
            let text = fetcher.fetch(&uri)?;
            Ok(LoadedDocument {
                root: parse_content(&text)?,
                uri: Some(uri),
            })
        }
        DocumentSource::Url(raw) => {
            let uri = Url::parse(raw)
                .map_err(|e| AppError::Fetch(format!("Invalid URL '{}': {}", raw, e)))?;
            let text = fetcher.fetch(&uri)?;
            Ok(LoadedDocument {
                root: parse_content(&text)?,
                uri: Some(uri),
            })
        }
    }
}

/// Parses JSON or YAML text into a JSON value.
///
/// Text starting with `{` or `[` is parsed strictly as JSON so JSON syntax
/// errors are not masked by the more permissive YAML parser.
pub fn parse_content(text: &str) -> AppResult<Value> {
    let trimmed = text.trim_start_matches('\u{feff}').trim_start();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        serde_json::from_str(trimmed)
            .map_err(|e| AppError::Parse(format!("Invalid JSON document: {}", e)))
    } else {
        serde_yaml::from_str(trimmed)
            .map_err(|e| AppError::Parse(format!("Invalid YAML document: {}", e)))
    }
}

fn file_uri(path: &Path) -> AppResult<Url> {
    let absolute = std::fs::canonicalize(path)
        .map_err(|e| AppError::Fetch(format!("Failed to read {}: {}", path.display(), e)))?;
    Url::from_file_path(&absolute)
        .map_err(|_| AppError::Fetch(format!("Invalid file path: {}", absolute.display())))
}
