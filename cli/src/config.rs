#![deny(missing_docs)]

//! # Config File
//!
//! Optional `.s2r.json` settings. Every field may be omitted; command line
//! flags and environment variables take precedence over the file.
//!
//! ```json
//! {
//!   "swagger": { "source": "./openapi.yaml" },
//!   "mock": { "port": 3001, "delay": 0, "ui": true, "cors": true,
//!             "basePath": "/v1", "customResponses": "./mocks.json", "seed": 42 }
//! }
//! ```

use crate::error::{CliError, CliResult};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// File name looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".s2r.json";

/// Parsed config file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct S2rConfig {
    /// Document settings.
    pub swagger: SwaggerSection,
    /// Mock server settings.
    pub mock: MockSection,
}

/// `swagger` section.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SwaggerSection {
    /// Path or URL of the document.
    pub source: Option<String>,
}

/// `mock` section.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MockSection {
    /// Listening port.
    pub port: Option<u16>,
    /// Response delay in milliseconds.
    pub delay: Option<u64>,
    /// Serve the documentation UI.
    pub ui: Option<bool>,
    /// Add CORS headers.
    pub cors: Option<bool>,
    /// Mount prefix for endpoint routes.
    pub base_path: Option<String>,
    /// Custom responses file.
    pub custom_responses: Option<PathBuf>,
    /// Random seed.
    pub seed: Option<u64>,
}

impl S2rConfig {
    /// Parses a config file. Relative paths inside it are resolved against
    /// the file's directory.
    pub fn from_file(path: &Path) -> CliResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let mut config: S2rConfig = serde_json::from_str(&text).map_err(|e| {
            CliError::Config(format!("Invalid config {}: {}", path.display(), e))
        })?;

        if let Some(dir) = path.parent() {
            config.rebase(dir);
        }
        Ok(config)
    }

    /// Loads `explicit` when given (it must exist), otherwise `.s2r.json`
    /// from `dir` if present.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> CliResult<Option<Self>> {
        if let Some(path) = explicit {
            return Self::from_file(path).map(Some);
        }
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            log::debug!("Using config file {}", candidate.display());
            Self::from_file(&candidate).map(Some)
        } else {
            Ok(None)
        }
    }

    fn rebase(&mut self, dir: &Path) {
        if let Some(file) = self.mock.custom_responses.as_mut() {
            if file.is_relative() {
                *file = dir.join(&*file);
            }
        }
        if let Some(source) = self.swagger.source.as_mut() {
            let is_url = source.contains("://");
            if !is_url && Path::new(source.as_str()).is_relative() {
                *source = dir.join(source.as_str()).to_string_lossy().into_owned();
            }
        }
    }
}
