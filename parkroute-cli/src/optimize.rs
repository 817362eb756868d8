//! `optimize` command: run the gateway over a request file.

use std::io::Write;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use parkroute_core::Solver;
use parkroute_data::RideCatalogue;
use parkroute_data::routing::{
    DEFAULT_PROFILE, HttpTravelTimeProvider, HttpTravelTimeProviderConfig,
};
use parkroute_solver_exact::{DEFAULT_MAX_RIDES, ExactRouteSolver, ExactSolverConfig};
use serde::{Deserialize, Serialize};

use crate::gateway::{GatewayResponse, handle_request};
use crate::{
    ARG_CATALOGUE, ARG_OPTIMIZE_REQUEST, CliError, ENV_OPTIMIZE_CATALOGUE, ENV_OPTIMIZE_REQUEST,
    require_existing,
};

/// Default routing timeout in seconds.
pub(crate) const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// CLI arguments for the `optimize` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "optimize",
    long_about = "Find the quickest order to visit the requested rides. The \
                 request is a JSON object with latitude, longitude and \
                 rideIds (optionally wrapped in an API-gateway envelope); \
                 rides come from a JSON catalogue and walking times from an \
                 OSRM instance. Prints the response body and exits with 0 on \
                 success, 2 for client errors and 3 for server errors.",
    about = "Optimize a ride route"
)]
#[ortho_config(prefix = "PARKROUTE")]
pub(crate) struct OptimizeArgs {
    /// Path to a JSON file containing the request.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) request_path: Option<Utf8PathBuf>,
    /// Path to the JSON ride catalogue.
    #[arg(long = ARG_CATALOGUE, value_name = "path")]
    #[serde(default)]
    pub(crate) catalogue: Option<Utf8PathBuf>,
    /// Base URL for the OSRM server (e.g. "http://localhost:5000").
    #[arg(long, value_name = "url")]
    #[serde(default)]
    pub(crate) osrm_base_url: Option<String>,
    /// OSRM profile used for walking times.
    #[arg(long, value_name = "profile")]
    #[serde(default)]
    pub(crate) osrm_profile: Option<String>,
    /// Routing request timeout in seconds.
    #[arg(long, value_name = "secs")]
    #[serde(default)]
    pub(crate) timeout_secs: Option<u64>,
    /// Largest number of distinct rides accepted per request.
    #[arg(long, value_name = "count")]
    #[serde(default)]
    pub(crate) max_rides: Option<usize>,
}

impl OptimizeArgs {
    pub(crate) fn into_config(self) -> Result<OptimizeConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        OptimizeConfig::try_from(merged)
    }
}

/// Resolved `optimize` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct OptimizeConfig {
    pub(crate) request_path: Utf8PathBuf,
    pub(crate) catalogue: Utf8PathBuf,
    pub(crate) osrm_base_url: String,
    pub(crate) osrm_profile: String,
    pub(crate) timeout: Duration,
    pub(crate) max_rides: usize,
}

impl OptimizeConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        require_existing(&self.request_path, ARG_OPTIMIZE_REQUEST)?;
        require_existing(&self.catalogue, ARG_CATALOGUE)?;
        Ok(())
    }
}

impl TryFrom<OptimizeArgs> for OptimizeConfig {
    type Error = CliError;

    fn try_from(args: OptimizeArgs) -> Result<Self, Self::Error> {
        let request_path = args.request_path.ok_or(CliError::MissingArgument {
            field: ARG_OPTIMIZE_REQUEST,
            env: ENV_OPTIMIZE_REQUEST,
        })?;
        let catalogue = args.catalogue.ok_or(CliError::MissingArgument {
            field: ARG_CATALOGUE,
            env: ENV_OPTIMIZE_CATALOGUE,
        })?;

        let osrm_base_url = args
            .osrm_base_url
            .unwrap_or_else(|| HttpTravelTimeProviderConfig::default().base_url);
        let osrm_profile = args
            .osrm_profile
            .unwrap_or_else(|| DEFAULT_PROFILE.to_owned());
        let timeout = Duration::from_secs(args.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS));

        Ok(Self {
            request_path,
            catalogue,
            osrm_base_url,
            osrm_profile,
            timeout,
            max_rides: args.max_rides.unwrap_or(DEFAULT_MAX_RIDES),
        })
    }
}

/// Builds a solver instance for the current optimize invocation.
pub(crate) trait OptimizeSolverBuilder {
    fn build(&self, config: &OptimizeConfig) -> Result<Box<dyn Solver>, CliError>;
}

pub(crate) struct DefaultOptimizeSolverBuilder;

impl OptimizeSolverBuilder for DefaultOptimizeSolverBuilder {
    fn build(&self, config: &OptimizeConfig) -> Result<Box<dyn Solver>, CliError> {
        let store = load_catalogue(&config.catalogue)?;
        let provider_config = HttpTravelTimeProviderConfig::new(config.osrm_base_url.clone())
            .with_profile(config.osrm_profile.clone())
            .with_timeout(config.timeout);
        let provider = HttpTravelTimeProvider::with_config(provider_config).map_err(|source| {
            CliError::BuildTravelTimeProvider {
                base_url: config.osrm_base_url.clone(),
                source,
            }
        })?;
        Ok(Box::new(ExactRouteSolver::with_config(
            store,
            provider,
            ExactSolverConfig::with_max_rides(config.max_rides),
        )))
    }
}

pub(crate) fn load_catalogue(path: &Utf8Path) -> Result<RideCatalogue, CliError> {
    RideCatalogue::load(path).map_err(|source| CliError::LoadCatalogue {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn run_optimize(args: OptimizeArgs) -> Result<GatewayResponse, CliError> {
    let mut stdout = std::io::stdout().lock();
    run_optimize_with(args, &DefaultOptimizeSolverBuilder, &mut stdout)
}

/// Run the gateway and write its body, whatever the status.
pub(crate) fn run_optimize_with(
    args: OptimizeArgs,
    builder: &dyn OptimizeSolverBuilder,
    writer: &mut dyn Write,
) -> Result<GatewayResponse, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    let payload = load_request(&config.request_path)?;
    let solver = builder.build(&config)?;
    let response = handle_request(solver.as_ref(), &payload);
    log::debug!("gateway answered with status {}", response.status);
    writeln!(writer, "{}", response.body).map_err(CliError::WriteOutput)?;
    Ok(response)
}

/// Read the raw request text; decoding is left to the gateway.
pub(crate) fn load_request(path: &Utf8Path) -> Result<String, CliError> {
    crate::fs::read_to_string(path).map_err(|source| CliError::ReadRequest {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<OptimizeConfig, CliError> {
    let merged = OptimizeArgs::merge_from_layers(layers).map_err(CliError::from)?;
    OptimizeConfig::try_from(merged)
}
