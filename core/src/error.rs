//! # Error Handling
//!
//! Provides the unified `AppError` enum used across the workspace.

use derive_more::{Display, From};

/// The Global Error Enum.
///
/// Acquisition failures are split by cause so callers can report them
/// precisely. String errors default to `General`.
#[derive(Debug, Display, From)]
pub enum AppError {
    /// Wrapper for standard IO errors.
    #[display("IO Error: {_0}")]
    Io(std::io::Error),

    /// A document could not be retrieved (unreachable URL, unreadable file).
    #[from(ignore)]
    #[display("Fetch Error: {_0}")]
    Fetch(String),

    /// Content is not valid JSON/YAML or is not an OpenAPI-shaped object.
    #[from(ignore)]
    #[display("Parse Error: {_0}")]
    Parse(String),

    /// The declared `openapi` / `swagger` version is not 2.0, 3.0.x or 3.1.x.
    #[from(ignore)]
    #[display("Unsupported Version: {_0}")]
    UnsupportedVersion(String),

    /// Generic errors.
    #[display("General Error: {_0}")]
    General(String),
}

/// Manual implementation of the standard Error trait.
impl std::error::Error for AppError {}

/// Helper type alias for Result using AppError.
pub type AppResult<T> = Result<T, AppError>;
