#![deny(missing_docs)]

//! # S2R CLI
//!
//! Command line interface for the OpenAPI mock toolchain.
//!
//! Supported Commands:
//! - `mock`: Serves generated responses for a document.
//! - `validate`: Loads and normalizes a document, prints a summary.
//! - `endpoints`: Lists or searches the operations of a document.

use clap::{Parser, Subcommand};

use crate::error::CliResult;

mod config;
mod endpoints;
mod error;
#[cfg(feature = "server")]
mod mock;
mod validate;

#[derive(Parser, Debug)]
#[clap(author, version, about = "OpenAPI / Swagger mock server toolchain")]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG).
    #[clap(short, long, global = true)]
    verbose: bool,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start a mock server for a document.
    #[cfg(feature = "server")]
    Mock(mock::MockArgs),
    /// Check that a document loads and normalizes.
    Validate(validate::ValidateArgs),
    /// List or search the endpoints of a document.
    Endpoints(endpoints::EndpointsArgs),
}

fn init_logger(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_millis()
        .init();
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    match &cli.command {
        #[cfg(feature = "server")]
        Commands::Mock(args) => mock::execute(args)?,
        Commands::Validate(args) => validate::execute(args)?,
        Commands::Endpoints(args) => endpoints::execute(args)?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli_structure() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_endpoints_flags() {
        let cli = Cli::try_parse_from([
            "s2r", "-v", "endpoints", "api.yaml", "--tag", "pets", "--json",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Endpoints(args) => {
                assert_eq!(args.source, "api.yaml");
                assert_eq!(args.tag.as_deref(), Some("pets"));
                assert!(args.json);
                assert!(args.search.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[cfg(feature = "server")]
    #[test]
    fn test_parse_mock_flags() {
        let cli = Cli::try_parse_from([
            "s2r",
            "mock",
            "api.yaml",
            "--port",
            "4010",
            "--no-ui",
            "--base-path",
            "/v1",
            "--seed",
            "7",
        ])
        .unwrap();
        match cli.command {
            Commands::Mock(args) => {
                assert_eq!(args.source.as_deref(), Some("api.yaml"));
                assert_eq!(args.port, Some(4010));
                assert!(args.no_ui);
                assert!(!args.no_cors);
                assert_eq!(args.base_path.as_deref(), Some("/v1"));
                assert_eq!(args.seed, Some(7));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
