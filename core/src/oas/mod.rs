#![deny(missing_docs)]

//! # OpenAPI Normalization Module
//!
//! - **source**: Document acquisition (file, URL, in-memory value).
//! - **version**: Version detection.
//! - **normalization**: Raw rewrites of version-specific keyword spellings.
//! - **refs** / **resolver**: `$ref` parsing and cross-document resolution.
//! - **schema**: The `SchemaNode` tagged union.
//! - **params**: Swagger 2.0 / OpenAPI 3.x parameter adapters.
//! - **normalizer**: The pipeline producing a `ParsedDocument`.
//! - **registry**: Endpoint lookup, request matching and search.

pub mod models;
pub mod normalizer;
pub mod registry;
pub mod schema;
pub mod source;
pub mod version;

pub(crate) mod normalization;
mod params;
mod refs;
mod resolver;

pub use models::{
    ApiInfo, Endpoint, HttpMethod, MediaType, ParamLocation, Parameter, ParsedDocument,
    RequestBody, ResponseDef, ServerInfo,
};
pub use normalizer::{normalize_value, parse_document, parse_document_with_fetcher};
pub use registry::{to_router_path, EndpointRegistry, RouteGroup, RouteMatch};
pub use schema::{
    ArraySchema, CompositionMode, NumericSchema, ObjectSchema, SchemaKind, SchemaMeta, SchemaNode,
    StringSchema,
};
pub use source::{
    load_document, parse_content, DefaultFetcher, DocumentFetcher, DocumentSource, LoadedDocument,
};
pub use version::{detect_version, SpecVersion};
