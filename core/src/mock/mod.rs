//! # Mock Module
//!
//! - **generator**: Schema-driven value synthesis with cycle detection.
//! - **context**: Generation options and per-call recursion state.
//! - **dispatcher**: Endpoint-to-response mapping used by the mock server.

pub mod context;
pub mod dispatcher;
pub mod generator;

mod strings;

pub use context::{MockGenerationContext, MockOptions};
pub use dispatcher::{
    select_media, select_success, CustomResponse, CustomResponses, MockDispatcher, MockResponse,
};
pub use generator::{generate_value, MockGenerator};
