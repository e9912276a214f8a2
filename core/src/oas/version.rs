#![deny(missing_docs)]

//! # Version Detection
//!
//! Maps the declared `openapi` / `swagger` field onto a resolver strategy
//! through a prefix lookup table.

use crate::error::{AppError, AppResult};
use serde::Serialize;
use serde_json::Value;

/// Supported document families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SpecVersion {
    /// Swagger 2.0 (`definitions`, inline parameter types).
    #[serde(rename = "2.0")]
    Swagger2,
    /// OpenAPI 3.0.x.
    #[serde(rename = "3.0")]
    OpenApi30,
    /// OpenAPI 3.1.x.
    #[serde(rename = "3.1")]
    OpenApi31,
}

/// `(field, major.minor prefix, strategy)`.
const VERSION_TABLE: &[(&str, &str, SpecVersion)] = &[
    ("swagger", "2.0", SpecVersion::Swagger2),
    ("openapi", "3.0", SpecVersion::OpenApi30),
    ("openapi", "3.1", SpecVersion::OpenApi31),
];

impl SpecVersion {
    /// True for the OpenAPI 3.x families.
    pub fn is_oas3(&self) -> bool {
        !matches!(self, SpecVersion::Swagger2)
    }
}

/// Detects the document version.
///
/// Fails with `UnsupportedVersion` when no version field is present or the
/// declared version is outside the table.
pub fn detect_version(raw: &Value) -> AppResult<SpecVersion> {
    let declared = ["openapi", "swagger"]
        .into_iter()
        .find_map(|field| version_field(raw, field).map(|v| (field, v)));

    let Some((field, declared)) = declared else {
        return Err(AppError::UnsupportedVersion(
            "missing 'openapi' or 'swagger' version field".into(),
        ));
    };

    let prefix = major_minor(&declared);
    VERSION_TABLE
        .iter()
        .find(|(table_field, table_prefix, _)| *table_field == field && *table_prefix == prefix)
        .map(|(_, _, version)| *version)
        .ok_or_else(|| AppError::UnsupportedVersion(format!("{} {}", field, declared)))
}

/// Reads a version field as a string; YAML may hand over `2.0` as a number.
fn version_field(raw: &Value, field: &str) -> Option<String> {
    match raw.get(field)? {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn major_minor(version: &str) -> String {
    version.split('.').take(2).collect::<Vec<_>>().join(".")
}
