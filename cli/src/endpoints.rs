#![deny(missing_docs)]

//! # Endpoints Command
//!
//! Lists, filters and searches the operations of a document.

use crate::error::{CliError, CliResult};
use s2r_core::{parse_document, DocumentSource, Endpoint, EndpointRegistry};
use std::fmt::Write as _;

/// Arguments for the endpoints command.
#[derive(clap::Args, Debug, Clone)]
pub struct EndpointsArgs {
    /// Path or URL of the OpenAPI / Swagger document.
    pub source: String,

    /// Only endpoints carrying this tag.
    #[clap(long)]
    pub tag: Option<String>,

    /// Keyword search over paths, operation ids, summaries and tags.
    #[clap(long)]
    pub search: Option<String>,

    /// Print the normalized endpoints as JSON.
    #[clap(long)]
    pub json: bool,
}

/// Executes the endpoints command.
pub fn execute(args: &EndpointsArgs) -> CliResult<()> {
    let doc = parse_document(&DocumentSource::from_arg(&args.source))?;
    let registry = EndpointRegistry::new(doc.endpoints);
    let selected = select(&registry, args.tag.as_deref(), args.search.as_deref());

    if args.json {
        let text = serde_json::to_string_pretty(&selected)
            .map_err(|e| CliError::General(format!("Failed to serialize endpoints: {}", e)))?;
        println!("{}", text);
    } else {
        print!("{}", render_table(&selected));
    }
    Ok(())
}

/// Applies the search query, then the tag filter.
pub fn select<'a>(
    registry: &'a EndpointRegistry,
    tag: Option<&str>,
    search: Option<&str>,
) -> Vec<&'a Endpoint> {
    let candidates = match search {
        Some(query) => registry.search(query),
        None => registry.endpoints().iter().collect(),
    };
    match tag {
        Some(tag) => candidates
            .into_iter()
            .filter(|ep| ep.tags.iter().any(|t| t.eq_ignore_ascii_case(tag)))
            .collect(),
        None => candidates,
    }
}

fn render_table(endpoints: &[&Endpoint]) -> String {
    let width = endpoints.iter().map(|ep| ep.path.len()).max().unwrap_or(0);
    let mut out = String::new();
    for ep in endpoints {
        let _ = write!(out, "{:<7} {:<width$}", ep.method.as_str(), ep.path, width = width);
        if let Some(summary) = &ep.summary {
            let _ = write!(out, "  {}", summary);
        }
        if !ep.tags.is_empty() {
            let _ = write!(out, "  [{}]", ep.tags.join(", "));
        }
        out.push('\n');
    }
    out
}
