#![deny(missing_docs)]

//! # S2R Core
//!
//! OpenAPI / Swagger normalization and schema-driven mock generation.

/// Shared error types.
pub mod error;

/// OpenAPI (OAS) acquisition, normalization and endpoint lookup.
pub mod oas;

/// Mock data generation and request dispatch.
pub mod mock;

pub use error::{AppError, AppResult};
pub use mock::{
    CustomResponse, CustomResponses, MockDispatcher, MockGenerationContext, MockGenerator,
    MockOptions, MockResponse,
};
pub use oas::{
    normalize_value, parse_document, parse_document_with_fetcher, DocumentFetcher,
    DocumentSource, Endpoint, EndpointRegistry, HttpMethod, ParsedDocument, SchemaKind,
    SchemaNode, SpecVersion,
};
