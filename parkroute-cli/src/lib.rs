//! Command-line interface for the Parkroute optimizer.
//!
//! `optimize` feeds a request file through the [`gateway`] and prints the
//! JSON body it produces; `resolve` maps ride names to catalogue ids.
#![forbid(unsafe_code)]

use std::process::ExitCode;

use camino::Utf8Path;
use clap::{Parser, Subcommand};
use parkroute_core::ErrorClass;

mod error;
mod fs;
pub mod gateway;
mod optimize;
mod resolve;

pub use error::CliError;

use optimize::{OptimizeArgs, run_optimize};
use resolve::{ResolveArgs, run_resolve};

pub(crate) const ARG_OPTIMIZE_REQUEST: &str = "request-path";
pub(crate) const ARG_CATALOGUE: &str = "catalogue";
pub(crate) const ENV_OPTIMIZE_REQUEST: &str = "PARKROUTE_CMDS_OPTIMIZE_REQUEST_PATH";
pub(crate) const ENV_OPTIMIZE_CATALOGUE: &str = "PARKROUTE_CMDS_OPTIMIZE_CATALOGUE";
pub(crate) const ENV_RESOLVE_CATALOGUE: &str = "PARKROUTE_CMDS_RESOLVE_CATALOGUE";

/// Exit status for client-class failures (bad input, unknown rides).
pub const EXIT_CLIENT_ERROR: u8 = 2;
/// Exit status for server-class failures (unreachable route, routing outage).
pub const EXIT_SERVER_ERROR: u8 = 3;

/// Run the Parkroute CLI with the current process arguments and environment.
///
/// Returns the exit code the process should terminate with.
///
/// # Errors
///
/// Returns [`CliError`] when arguments, configuration or input files are
/// unusable, before any request is solved.
pub fn run() -> Result<ExitCode, CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Optimize(args) => {
            let response = run_optimize(args)?;
            Ok(ExitCode::from(exit_code(response.class())))
        }
        Command::Resolve(args) => {
            run_resolve(args)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Map a gateway outcome onto the process exit status.
const fn exit_code(class: Option<ErrorClass>) -> u8 {
    match class {
        None => 0,
        Some(ErrorClass::Client) => EXIT_CLIENT_ERROR,
        Some(ErrorClass::Server) => EXIT_SERVER_ERROR,
    }
}

fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match fs::file_is_file(path) {
        Ok(true) => Ok(()),
        Ok(false) => Err(CliError::SourcePathNotFile {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
            Err(CliError::MissingSourceFile {
                field,
                path: path.to_path_buf(),
            })
        }
        Err(source) => Err(CliError::InspectSourcePath {
            field,
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "parkroute",
    about = "Plan the quickest walk through a set of theme-park rides",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Order the requested rides to minimise walking plus queueing time.
    Optimize(OptimizeArgs),
    /// Look up ride ids by display name.
    Resolve(ResolveArgs),
}

#[cfg(test)]
mod tests;
