//! `resolve` command: map ride names to catalogue ids.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use parkroute_core::{NameResolution, resolve_ride_names};
use serde::{Deserialize, Serialize};

use crate::optimize::load_catalogue;
use crate::{ARG_CATALOGUE, CliError, ENV_RESOLVE_CATALOGUE, require_existing};

/// CLI arguments for the `resolve` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "resolve",
    about = "Look up ride ids by display name",
    long_about = "Print the catalogue ids matching the given ride names, plus \
                 any names that matched nothing, as JSON."
)]
#[ortho_config(prefix = "PARKROUTE")]
pub(crate) struct ResolveArgs {
    /// Path to the JSON ride catalogue.
    #[arg(long = ARG_CATALOGUE, value_name = "path")]
    #[serde(default)]
    pub(crate) catalogue: Option<Utf8PathBuf>,
    /// Ride names to resolve, matched exactly.
    #[arg(value_name = "name")]
    #[serde(default)]
    pub(crate) names: Vec<String>,
}

pub(crate) fn run_resolve(args: ResolveArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_resolve_with(args, &mut stdout).map(|_| ())
}

pub(crate) fn run_resolve_with(
    args: ResolveArgs,
    writer: &mut dyn Write,
) -> Result<NameResolution, CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let catalogue_path = merged.catalogue.ok_or(CliError::MissingArgument {
        field: ARG_CATALOGUE,
        env: ENV_RESOLVE_CATALOGUE,
    })?;
    require_existing(&catalogue_path, ARG_CATALOGUE)?;
    let catalogue = load_catalogue(&catalogue_path)?;

    let resolution = resolve_ride_names(&catalogue, &merged.names);
    let payload = serde_json::to_string_pretty(&resolution).map_err(CliError::SerialiseOutput)?;
    writeln!(writer, "{payload}").map_err(CliError::WriteOutput)?;
    Ok(resolution)
}
