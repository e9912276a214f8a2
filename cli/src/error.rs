#![deny(missing_docs)]

//! # CLI Errors
//!
//! Error types for the CLI crate.

use derive_more::{Display, From};
use s2r_core::AppError;

/// Main error enum for CLI operations.
#[derive(Debug, Display, From)]
pub enum CliError {
    /// IO Error wrapper (binding the port, reading files).
    #[display("IO Error: {}", _0)]
    Io(std::io::Error),

    /// Document acquisition or normalization failure.
    #[display("{}", _0)]
    App(AppError),

    /// Invalid or missing configuration.
    #[from(ignore)]
    #[display("Config Error: {}", _0)]
    Config(String),

    /// General failure message.
    #[display("Operation failed: {}", _0)]
    General(String),
}

impl std::error::Error for CliError {}

/// Result type alias.
pub type CliResult<T> = Result<T, CliError>;
