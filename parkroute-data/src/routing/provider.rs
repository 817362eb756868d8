//! HTTP-based `TravelTimeProvider` using OSRM's Table API.
//!
//! This module provides [`HttpTravelTimeProvider`], an implementation of the
//! [`TravelTimeProvider`] trait that fetches walking-time blocks from an OSRM
//! routing service via HTTP.
//!
//! # Architecture
//!
//! The [`TravelTimeProvider`] trait is synchronous to keep the solver
//! embeddable in synchronous contexts. This provider bridges the async HTTP
//! calls to the sync interface by blocking on a Tokio runtime internally.
//! When the matrix builder asks for several blocks at once they are
//! dispatched concurrently, bounded by
//! [`HttpTravelTimeProviderConfig::max_concurrent_requests`].
//!
//! # Example
//!
//! ```no_run
//! use parkroute_data::routing::HttpTravelTimeProvider;
//! use parkroute_core::TravelTimeProvider;
//! use geo::Coord;
//!
//! let provider = HttpTravelTimeProvider::new("http://localhost:5000")?;
//! let locations = [
//!     Coord { x: -117.9190, y: 33.8121 },
//!     Coord { x: -117.9185, y: 33.8125 },
//! ];
//!
//! let matrix = provider.get_travel_time_matrix(&locations)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::future::Future;
use std::num::NonZeroUsize;
use std::time::Duration;

use futures_util::stream::{self, StreamExt, TryStreamExt};
use geo::Coord;
use parkroute_core::{
    MatrixBlock, TableLimits, TravelTimeError, TravelTimeMatrix, TravelTimeProvider,
};
use reqwest::Client;
use thiserror::Error;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};
use url::Url;

use super::osrm::TableResponse;

/// Error type for [`HttpTravelTimeProvider`] construction failures.
#[derive(Debug, Error)]
pub enum ProviderBuildError {
    /// The base URL is not an absolute `http` or `https` URL.
    #[error("invalid OSRM base URL {url:?}: {message}")]
    InvalidBaseUrl {
        /// URL as configured.
        url: String,
        /// Why the URL was rejected.
        message: String,
    },
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    /// Failed to build the Tokio runtime.
    #[error("failed to build Tokio runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

/// Default user agent for OSRM requests.
pub const DEFAULT_USER_AGENT: &str = "parkroute-routing/0.1";

/// Default OSRM routing profile.
pub const DEFAULT_PROFILE: &str = "walking";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

const DEFAULT_MAX_CONCURRENT_REQUESTS: NonZeroUsize = NonZeroUsize::MIN.saturating_add(3);

/// Configuration for [`HttpTravelTimeProvider`].
#[derive(Debug, Clone)]
pub struct HttpTravelTimeProviderConfig {
    /// Base URL for the OSRM service (e.g., `"http://localhost:5000"`).
    pub base_url: String,
    /// OSRM profile segment of the table URL.
    pub profile: String,
    /// Request timeout duration.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
    /// Largest table the service accepts per call.
    pub limits: TableLimits,
    /// Upper bound on blocks in flight at once.
    pub max_concurrent_requests: NonZeroUsize,
}

impl Default for HttpTravelTimeProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_owned(),
            profile: DEFAULT_PROFILE.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            limits: TableLimits::default(),
            max_concurrent_requests: DEFAULT_MAX_CONCURRENT_REQUESTS,
        }
    }
}

impl HttpTravelTimeProviderConfig {
    /// Create a new configuration with the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the OSRM profile, e.g. `"foot"`.
    #[must_use]
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the per-call table limits advertised to the matrix builder.
    ///
    /// OSRM's `max-table-size` option applies to the coordinate count, so a
    /// rectangular block sends `rows + cols` coordinates.
    #[must_use]
    pub const fn with_limits(mut self, limits: TableLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Bound the number of blocks requested concurrently.
    #[must_use]
    pub const fn with_max_concurrent_requests(mut self, max: NonZeroUsize) -> Self {
        self.max_concurrent_requests = max;
        self
    }
}

/// HTTP-based travel time provider using OSRM Table API.
///
/// This provider implements the synchronous [`TravelTimeProvider`] trait
/// by internally blocking on asynchronous HTTP requests. It owns a Tokio
/// runtime that is reused across calls, avoiding the overhead of creating
/// a new runtime per request.
///
/// # Runtime behaviour
///
/// When called from outside any Tokio runtime, the provider uses its own
/// stored runtime. When called from within an existing multi-threaded Tokio
/// runtime (detected via [`Handle::try_current()`] and
/// [`RuntimeFlavor::MultiThread`]), it uses that runtime's handle with
/// [`tokio::task::block_in_place`] to avoid nested runtime panics.
///
/// When called from within a `current_thread` Tokio runtime, the provider
/// falls back to using its own internal runtime. This avoids the panic that
/// `block_in_place` would cause, but may lead to deadlocks if the caller's
/// runtime is driving IO or timers that this request depends on.
pub struct HttpTravelTimeProvider {
    client: Client,
    config: HttpTravelTimeProviderConfig,
    base_url: String,
    runtime: Runtime,
}

impl std::fmt::Debug for HttpTravelTimeProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTravelTimeProvider")
            .field("client", &self.client)
            .field("config", &self.config)
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish_non_exhaustive()
    }
}

impl HttpTravelTimeProvider {
    /// Create a new provider with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client or
    /// Tokio runtime fails to build.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ProviderBuildError> {
        Self::with_config(HttpTravelTimeProviderConfig::new(base_url))
    }

    /// Create a new provider with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client or
    /// Tokio runtime fails to build.
    pub fn with_config(config: HttpTravelTimeProviderConfig) -> Result<Self, ProviderBuildError> {
        let base_url = validate_base_url(&config.base_url)?;
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(ProviderBuildError::HttpClient)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(ProviderBuildError::Runtime)?;
        Ok(Self {
            client,
            config,
            base_url,
            runtime,
        })
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &HttpTravelTimeProviderConfig {
        &self.config
    }

    /// Build the OSRM Table API URL for one block.
    ///
    /// The URL format is `{base_url}/table/v1/{profile}/{coordinates}` where
    /// coordinates are semicolon-separated `lon,lat` pairs. A block whose
    /// sources and destinations are the same range sends those coordinates
    /// once; any other block sends the sources followed by the destinations
    /// and names them with `sources` and `destinations` index lists.
    fn build_table_url(
        &self,
        locations: &[Coord<f64>],
        block: &MatrixBlock,
    ) -> Result<String, TravelTimeError> {
        let (sources, destinations) = block.select(locations)?;
        let prefix = format!("{}/table/v1/{}", self.base_url, self.config.profile);
        if block.sources == block.destinations {
            return Ok(format!("{prefix}/{}", format_coordinates(sources)));
        }

        let coords = format_coordinates(sources.iter().chain(destinations));
        let rows = sources.len();
        let source_indices = format_indices(0..rows);
        let destination_indices = format_indices(rows..rows + destinations.len());
        Ok(format!(
            "{prefix}/{coords}?sources={source_indices}&destinations={destination_indices}"
        ))
    }

    /// Fetch one block asynchronously.
    async fn fetch_block_async(
        &self,
        locations: &[Coord<f64>],
        block: &MatrixBlock,
    ) -> Result<TravelTimeMatrix, TravelTimeError> {
        let url = self.build_table_url(locations, block)?;
        log::debug!(
            "requesting {}x{} table block from {url}",
            block.rows(),
            block.cols()
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, &url))?
            .error_for_status()
            .map_err(|err| self.convert_reqwest_error(&err, &url))?;

        let table_response: TableResponse =
            response
                .json()
                .await
                .map_err(|err| TravelTimeError::ParseError {
                    message: err.to_string(),
                })?;

        let table = Self::convert_response(table_response)?;
        block.check_shape(&table)?;
        Ok(table)
    }

    /// Convert a reqwest error to a `TravelTimeError`.
    fn convert_reqwest_error(&self, error: &reqwest::Error, url: &str) -> TravelTimeError {
        if error.is_timeout() {
            return TravelTimeError::Timeout {
                url: url.to_owned(),
                timeout_secs: self.config.timeout.as_secs(),
            };
        }

        if let Some(status) = error.status() {
            return TravelTimeError::HttpError {
                url: url.to_owned(),
                status: status.as_u16(),
                message: error.to_string(),
            };
        }

        TravelTimeError::NetworkError {
            url: url.to_owned(),
            message: error.to_string(),
        }
    }

    /// Convert an OSRM response to a `TravelTimeMatrix`.
    fn convert_response(response: TableResponse) -> Result<TravelTimeMatrix, TravelTimeError> {
        if !response.is_ok() {
            return Err(TravelTimeError::ServiceError {
                code: response.code,
                message: response.message.unwrap_or_default(),
            });
        }

        let durations = response
            .durations
            .ok_or_else(|| TravelTimeError::ParseError {
                message: "OSRM response missing durations array".to_owned(),
            })?;

        // Only `null` marks an unroutable pair; any other non-duration is
        // malformed upstream data.
        let matrix = durations
            .into_iter()
            .enumerate()
            .map(|(row_idx, row)| {
                row.into_iter()
                    .enumerate()
                    .map(|(col_idx, cell)| match cell {
                        None => Ok(Duration::MAX),
                        Some(secs) => Duration::try_from_secs_f64(secs).map_err(|err| {
                            TravelTimeError::ParseError {
                                message: format!(
                                    "duration {secs} at ({row_idx}, {col_idx}) is invalid: {err}"
                                ),
                            }
                        }),
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<TravelTimeMatrix, _>>()?;

        Ok(matrix)
    }

    /// Drive `future` to completion from synchronous code.
    ///
    /// `block_in_place` requires a multi-threaded runtime; for
    /// `current_thread` runtimes we fall back to our own stored runtime.
    fn block_on<F: Future>(&self, future: F) -> F::Output {
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            _ => self.runtime.block_on(future),
        }
    }
}

impl TravelTimeProvider for HttpTravelTimeProvider {
    fn limits(&self) -> TableLimits {
        self.config.limits
    }

    /// Fetch one block of the travel-time table.
    ///
    /// # Runtime requirements
    ///
    /// When called from within an existing Tokio runtime, the runtime must be
    /// multi-threaded (`flavor = "multi_thread"`). If called from within a
    /// `current_thread` runtime, the method falls back to using its own
    /// internal runtime, which may block the caller's runtime and cause
    /// deadlocks if the caller's runtime is driving IO or timers needed by
    /// this request.
    fn get_travel_time_block(
        &self,
        locations: &[Coord<f64>],
        block: &MatrixBlock,
    ) -> Result<TravelTimeMatrix, TravelTimeError> {
        if locations.is_empty() {
            return Err(TravelTimeError::EmptyInput);
        }
        self.block_on(self.fetch_block_async(locations, block))
    }

    /// Fetch several blocks, keeping at most
    /// [`HttpTravelTimeProviderConfig::max_concurrent_requests`] in flight.
    ///
    /// Results come back in the order of `blocks`. The first failure aborts
    /// the remaining requests.
    fn get_travel_time_blocks(
        &self,
        locations: &[Coord<f64>],
        blocks: &[MatrixBlock],
    ) -> Result<Vec<TravelTimeMatrix>, TravelTimeError> {
        if locations.is_empty() {
            return Err(TravelTimeError::EmptyInput);
        }
        let in_flight = self.config.max_concurrent_requests.get();
        log::debug!(
            "fetching {} table blocks, {in_flight} at a time",
            blocks.len()
        );
        self.block_on(
            stream::iter(
                blocks
                    .iter()
                    .map(|block| self.fetch_block_async(locations, block)),
            )
            .buffered(in_flight)
            .try_collect(),
        )
    }
}

/// Trim trailing slashes and reject anything that is not an absolute
/// `http(s)` URL.
fn validate_base_url(raw: &str) -> Result<String, ProviderBuildError> {
    let invalid = |message: String| ProviderBuildError::InvalidBaseUrl {
        url: raw.to_owned(),
        message,
    };
    let parsed = Url::parse(raw).map_err(|err| invalid(err.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme {}", parsed.scheme())));
    }
    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err(invalid("query strings and fragments are not allowed".to_owned()));
    }
    Ok(raw.trim_end_matches('/').to_owned())
}

fn format_coordinates<'a>(coords: impl IntoIterator<Item = &'a Coord<f64>>) -> String {
    coords
        .into_iter()
        .map(|coord| format!("{},{}", coord.x, coord.y))
        .collect::<Vec<_>>()
        .join(";")
}

fn format_indices(indices: std::ops::Range<usize>) -> String {
    indices
        .map(|idx| idx.to_string())
        .collect::<Vec<_>>()
        .join(";")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn sample_locations() -> Vec<Coord<f64>> {
        vec![
            Coord {
                x: -117.919,
                y: 33.8121,
            },
            Coord {
                x: -117.9185,
                y: 33.8125,
            },
            Coord { x: -117.918, y: 33.813 },
        ]
    }

    #[fixture]
    fn provider() -> HttpTravelTimeProvider {
        HttpTravelTimeProvider::new("http://osrm.example.com").expect("provider should build")
    }

    #[rstest]
    fn build_table_url_formats_square_blocks(
        provider: HttpTravelTimeProvider,
        sample_locations: Vec<Coord<f64>>,
    ) {
        let url = provider
            .build_table_url(&sample_locations, &MatrixBlock::full(2))
            .expect("block in range");

        assert_eq!(
            url,
            "http://osrm.example.com/table/v1/walking/-117.919,33.8121;-117.9185,33.8125"
        );
    }

    #[rstest]
    fn build_table_url_names_sources_and_destinations(
        provider: HttpTravelTimeProvider,
        sample_locations: Vec<Coord<f64>>,
    ) {
        let block = MatrixBlock {
            sources: 0..1,
            destinations: 1..3,
        };

        let url = provider
            .build_table_url(&sample_locations, &block)
            .expect("block in range");

        assert_eq!(
            url,
            "http://osrm.example.com/table/v1/walking/\
             -117.919,33.8121;-117.9185,33.8125;-117.918,33.813\
             ?sources=0&destinations=1;2"
        );
    }

    #[rstest]
    fn build_table_url_uses_configured_profile(sample_locations: Vec<Coord<f64>>) {
        let provider = HttpTravelTimeProvider::with_config(
            HttpTravelTimeProviderConfig::new("http://osrm.example.com/").with_profile("foot"),
        )
        .expect("provider should build");

        let url = provider
            .build_table_url(&sample_locations, &MatrixBlock::full(1))
            .expect("block in range");

        assert!(url.starts_with("http://osrm.example.com/table/v1/foot/"));
        assert!(!url.contains("//table"));
    }

    #[rstest]
    fn build_table_url_rejects_out_of_range_blocks(
        provider: HttpTravelTimeProvider,
        sample_locations: Vec<Coord<f64>>,
    ) {
        let err = provider
            .build_table_url(&sample_locations, &MatrixBlock::full(4))
            .expect_err("block exceeds locations");
        assert!(matches!(err, TravelTimeError::BlockOutOfRange { .. }));
    }

    #[rstest]
    #[case("osrm.example.com")]
    #[case("ftp://osrm.example.com")]
    #[case("http://osrm.example.com/?token=1")]
    fn rejects_invalid_base_urls(#[case] base_url: &str) {
        let err = HttpTravelTimeProvider::new(base_url).expect_err("invalid base url");
        assert!(matches!(err, ProviderBuildError::InvalidBaseUrl { .. }));
    }

    #[rstest]
    fn convert_response_handles_success() {
        let response = TableResponse {
            code: "Ok".to_owned(),
            message: None,
            durations: Some(vec![
                vec![Some(0.0), Some(120.5)],
                vec![Some(120.5), Some(0.0)],
            ]),
        };

        let matrix = HttpTravelTimeProvider::convert_response(response).expect("should parse");

        assert_eq!(matrix.len(), 2);
        assert_eq!(matrix[0][0], Duration::ZERO);
        assert_eq!(matrix[0][1], Duration::from_secs_f64(120.5));
        assert_eq!(matrix[1][0], Duration::from_secs_f64(120.5));
        assert_eq!(matrix[1][1], Duration::ZERO);
    }

    #[rstest]
    fn convert_response_handles_null_durations() {
        let response = TableResponse {
            code: "Ok".to_owned(),
            message: None,
            durations: Some(vec![vec![Some(0.0), None], vec![None, Some(0.0)]]),
        };

        let matrix = HttpTravelTimeProvider::convert_response(response).expect("should parse");

        assert_eq!(matrix[0][1], Duration::MAX);
        assert_eq!(matrix[1][0], Duration::MAX);
    }

    #[rstest]
    #[case::negative(-5.0)]
    #[case::not_a_number(f64::NAN)]
    #[case::infinite(f64::INFINITY)]
    #[case::overflowing(1e20)]
    fn convert_response_rejects_invalid_durations(#[case] secs: f64) {
        let response = TableResponse {
            code: "Ok".to_owned(),
            message: None,
            durations: Some(vec![
                vec![Some(0.0), Some(60.0)],
                vec![Some(secs), Some(0.0)],
            ]),
        };

        let err = HttpTravelTimeProvider::convert_response(response)
            .expect_err("malformed duration should fail");

        match err {
            TravelTimeError::ParseError { message } => {
                assert!(message.contains("(1, 0)"), "unexpected message: {message}");
            }
            other => panic!("expected ParseError, got {other:?}"),
        }
    }

    #[rstest]
    fn convert_response_handles_service_error() {
        let response = TableResponse {
            code: "InvalidQuery".to_owned(),
            message: Some("Too many coordinates".to_owned()),
            durations: None,
        };

        let err = HttpTravelTimeProvider::convert_response(response).expect_err("should fail");

        match err {
            TravelTimeError::ServiceError { code, message } => {
                assert_eq!(code, "InvalidQuery");
                assert_eq!(message, "Too many coordinates");
            }
            other => panic!("expected ServiceError, got {other:?}"),
        }
    }

    #[rstest]
    fn convert_response_handles_missing_durations() {
        let response = TableResponse {
            code: "Ok".to_owned(),
            message: None,
            durations: None,
        };

        let err = HttpTravelTimeProvider::convert_response(response).expect_err("should fail");

        assert!(matches!(err, TravelTimeError::ParseError { .. }));
    }

    #[rstest]
    fn empty_input_returns_error(provider: HttpTravelTimeProvider) {
        let err = provider
            .get_travel_time_matrix(&[])
            .expect_err("should fail");
        assert_eq!(err, TravelTimeError::EmptyInput);

        let err = provider
            .get_travel_time_blocks(&[], &[MatrixBlock::full(1)])
            .expect_err("should fail");
        assert_eq!(err, TravelTimeError::EmptyInput);
    }

    #[rstest]
    fn unreachable_service_is_a_network_error(sample_locations: Vec<Coord<f64>>) {
        // Port 9 (discard) on loopback is closed on test hosts.
        let provider = HttpTravelTimeProvider::with_config(
            HttpTravelTimeProviderConfig::new("http://127.0.0.1:9")
                .with_timeout(Duration::from_secs(2)),
        )
        .expect("provider should build");

        let err = provider
            .get_travel_time_matrix(&sample_locations)
            .expect_err("nothing listens on the discard port");
        assert!(
            matches!(
                err,
                TravelTimeError::NetworkError { .. } | TravelTimeError::Timeout { .. }
            ),
            "unexpected error {err:?}"
        );
    }

    #[rstest]
    fn config_builder_pattern() {
        let limits = TableLimits::square(NonZeroUsize::new(25).expect("non-zero"));
        let config = HttpTravelTimeProviderConfig::new("http://example.com")
            .with_profile("foot")
            .with_timeout(Duration::from_secs(60))
            .with_user_agent("test-agent/1.0")
            .with_limits(limits)
            .with_max_concurrent_requests(NonZeroUsize::new(2).expect("non-zero"));

        assert_eq!(config.base_url, "http://example.com");
        assert_eq!(config.profile, "foot");
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.user_agent, "test-agent/1.0");
        assert_eq!(config.limits, limits);
        assert_eq!(config.max_concurrent_requests.get(), 2);
    }

    #[rstest]
    fn defaults_match_osrm_walking_profile() {
        let config = HttpTravelTimeProviderConfig::default();
        assert_eq!(config.profile, DEFAULT_PROFILE);
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
        assert_eq!(config.limits, TableLimits::default());
        assert_eq!(config.max_concurrent_requests.get(), 4);
    }
}
