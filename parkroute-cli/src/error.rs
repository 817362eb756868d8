//! Error types emitted by the Parkroute CLI.
//!
//! Solver outcomes are not errors here: the gateway turns them into a status
//! and a JSON body. `CliError` covers everything that stops the command
//! before or after the gateway runs.

use std::sync::Arc;

use camino::Utf8PathBuf;
use parkroute_data::CatalogueError;
use parkroute_data::routing::ProviderBuildError;
use thiserror::Error;

/// Errors emitted by the Parkroute CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Reading the optimize request file failed.
    #[error("failed to read request at {path:?}: {source}")]
    ReadRequest {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Loading the ride catalogue failed.
    #[error("failed to load ride catalogue {path:?}: {source}")]
    LoadCatalogue {
        path: Utf8PathBuf,
        #[source]
        source: CatalogueError,
    },
    /// Constructing the travel time provider failed.
    #[error("failed to build travel time provider for {base_url:?}: {source}")]
    BuildTravelTimeProvider {
        base_url: String,
        #[source]
        source: ProviderBuildError,
    },
    /// Serialising command output failed.
    #[error("failed to serialise output: {0}")]
    SerialiseOutput(#[source] serde_json::Error),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
