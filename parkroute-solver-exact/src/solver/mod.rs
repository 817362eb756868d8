//! `ExactRouteSolver` implementation backed by the Held–Karp table.

use std::time::Instant;

use parkroute_core::{
    Diagnostics, DistanceMatrixBuilder, RequestValidationError, RideStore, Route, SolveError,
    SolveRequest, SolveResponse, Solver, TravelTimeProvider,
};

use crate::held_karp::{MAX_RIDES, solve_path};

/// Default cap on distinct rides per request.
pub const DEFAULT_MAX_RIDES: usize = 16;

/// Configuration for [`ExactRouteSolver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExactSolverConfig {
    max_rides: usize,
}

impl ExactSolverConfig {
    /// Accept at most `max_rides` distinct rides per request.
    ///
    /// The value is clamped to `1..=MAX_RIDES`.
    ///
    /// # Examples
    /// ```
    /// use parkroute_solver_exact::{ExactSolverConfig, MAX_RIDES};
    ///
    /// assert_eq!(ExactSolverConfig::default().max_rides(), 16);
    /// assert_eq!(ExactSolverConfig::with_max_rides(100).max_rides(), MAX_RIDES);
    /// assert_eq!(ExactSolverConfig::with_max_rides(0).max_rides(), 1);
    /// ```
    #[must_use]
    pub fn with_max_rides(max_rides: usize) -> Self {
        Self {
            max_rides: max_rides.clamp(1, MAX_RIDES),
        }
    }

    /// Largest number of distinct rides accepted.
    #[must_use]
    pub const fn max_rides(&self) -> usize {
        self.max_rides
    }
}

impl Default for ExactSolverConfig {
    fn default() -> Self {
        Self {
            max_rides: DEFAULT_MAX_RIDES,
        }
    }
}

/// Exact solver returning the minimum-time order through the requested rides.
///
/// The solver is generic over the engine boundaries: a read-only ride store
/// and a travel-time provider. Each solve resolves the requested ids, builds
/// the walking-time matrix, runs the dynamic program and maps the order back
/// onto the rides.
///
/// # Examples
/// ```
/// use parkroute_core::test_support::{FixedTravelTimeProvider, MemoryRideStore, ride};
/// use parkroute_core::{SolveRequest, Solver};
/// use parkroute_solver_exact::ExactRouteSolver;
///
/// let store = MemoryRideStore::with_rides([ride("a", 33.812, -117.918, 4)]);
/// let provider = FixedTravelTimeProvider::from_seconds(vec![vec![0, 720], vec![720, 0]]);
/// let solver = ExactRouteSolver::new(store, provider);
///
/// let response = solver.solve(&SolveRequest::new(33.811, -117.919, ["a"]))?;
/// assert_eq!(response.route.total_minutes, 16.0);
/// # Ok::<(), parkroute_core::SolveError>(())
/// ```
#[derive(Debug)]
pub struct ExactRouteSolver<S, T>
where
    S: RideStore,
    T: TravelTimeProvider,
{
    store: S,
    travel_time_provider: T,
    config: ExactSolverConfig,
}

impl<S, T> ExactRouteSolver<S, T>
where
    S: RideStore,
    T: TravelTimeProvider,
{
    /// Construct a solver using default configuration.
    #[must_use]
    pub fn new(store: S, travel_time_provider: T) -> Self {
        Self::with_config(store, travel_time_provider, ExactSolverConfig::default())
    }

    /// Construct a solver with explicit configuration.
    #[must_use]
    pub const fn with_config(store: S, travel_time_provider: T, config: ExactSolverConfig) -> Self {
        Self {
            store,
            travel_time_provider,
            config,
        }
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> ExactSolverConfig {
        self.config
    }
}

impl<S, T> Solver for ExactRouteSolver<S, T>
where
    S: RideStore + Send + Sync,
    T: TravelTimeProvider + Send + Sync,
{
    fn solve(&self, request: &SolveRequest) -> Result<SolveResponse, SolveError> {
        request.validate()?;
        let started_at = Instant::now();

        let ids = request.distinct_ride_ids();
        let lookup = self.store.lookup(&ids);
        if !lookup.is_complete() {
            log::debug!("{} of {} ride ids did not resolve", lookup.missing.len(), ids.len());
            return Err(SolveError::DataNotFound {
                missing: lookup.missing,
            });
        }
        let rides = lookup.found;
        let max = self.config.max_rides();
        if rides.len() > max {
            return Err(RequestValidationError::TooManyRides {
                requested: rides.len(),
                max,
            }
            .into());
        }

        let builder = DistanceMatrixBuilder::new(&self.travel_time_provider);
        let matrix_requests = builder.plan(rides.len()).len();
        let matrix = builder.build(request.start(), &rides)?;

        let waits: Vec<u32> = rides.iter().map(|ride| ride.wait_minutes).collect();
        let path = solve_path(&matrix, &waits)?;
        let route = Route::assemble(&rides, &path.order, path.total_minutes);

        let diagnostics = Diagnostics {
            solve_time: started_at.elapsed(),
            rides_considered: rides.len(),
            states_evaluated: path.states_evaluated,
            matrix_requests,
        };
        log::info!(
            "routed {} rides in {:?} ({} states, {} matrix blocks)",
            diagnostics.rides_considered,
            diagnostics.solve_time,
            diagnostics.states_evaluated,
            diagnostics.matrix_requests
        );

        Ok(SolveResponse { route, diagnostics })
    }
}
