#![deny(missing_docs)]

//! # Validate Command
//!
//! Acquires and normalizes a document, then prints what was found.

use crate::error::CliResult;
use s2r_core::{parse_document, DocumentSource, ParsedDocument, SpecVersion};
use std::fmt::Write as _;

/// Arguments for the validate command.
#[derive(clap::Args, Debug, Clone)]
pub struct ValidateArgs {
    /// Path or URL of the OpenAPI / Swagger document.
    pub source: String,
}

/// Executes the validate command.
pub fn execute(args: &ValidateArgs) -> CliResult<()> {
    let doc = parse_document(&DocumentSource::from_arg(&args.source))?;
    print!("{}", summary(&doc));
    Ok(())
}

fn version_label(version: SpecVersion) -> &'static str {
    match version {
        SpecVersion::Swagger2 => "Swagger 2.0",
        SpecVersion::OpenApi30 => "OpenAPI 3.0",
        SpecVersion::OpenApi31 => "OpenAPI 3.1",
    }
}

/// Human readable report for a normalized document.
pub fn summary(doc: &ParsedDocument) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} {} ({})", doc.info.title, doc.info.version, version_label(doc.version));
    for server in &doc.servers {
        let _ = writeln!(out, "  server   {}", server.url);
    }
    let _ = writeln!(out, "  endpoints {}", doc.endpoints.len());
    let _ = writeln!(out, "  schemas   {}", doc.schemas.len());

    let deprecated = doc.endpoints.iter().filter(|ep| ep.deprecated).count();
    if deprecated > 0 {
        let _ = writeln!(out, "  deprecated {}", deprecated);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_summary_of_swagger2_document() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("swagger.yaml");
        fs::write(
            &path,
            r#"
swagger: "2.0"
info: {title: Legacy, version: "0.9"}
host: legacy.example.com
paths:
  /items:
    get:
      deprecated: true
      responses:
        '200': {description: ok}
definitions:
  Item: {type: object}
"#,
        )
        .unwrap();

        let doc = parse_document(&DocumentSource::Path(path)).unwrap();
        let text = summary(&doc);
        assert!(text.starts_with("Legacy 0.9 (Swagger 2.0)"));
        assert!(text.contains("https://legacy.example.com"));
        assert!(text.contains("endpoints 1"));
        assert!(text.contains("schemas   1"));
        assert!(text.contains("deprecated 1"));
    }

    #[test]
    fn test_unsupported_version_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("old.json");
        fs::write(&path, r#"{ "swagger": "1.2", "info": {}, "paths": {} }"#).unwrap();
        let args = ValidateArgs {
            source: path.to_string_lossy().into_owned(),
        };
        let err = execute(&args).unwrap_err();
        assert!(matches!(
            err,
            CliError::App(s2r_core::AppError::UnsupportedVersion(_))
        ));
    }
}
