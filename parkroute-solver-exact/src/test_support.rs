//! Test-only utilities for `parkroute-solver-exact`.
//!
//! The helpers in this module are available to unit tests and behavioural
//! tests. They are gated behind the `test-support` feature (and `cfg(test)`).

use geo::Coord;
use parkroute_core::test_support::{FixedTravelTimeProvider, MemoryRideStore};
use parkroute_core::{DistanceMatrix, DistanceMatrixBuilder, Ride, SolveRequest, TravelTimeError};

use crate::ExactRouteSolver;

/// Guest latitude shared by fixtures.
pub const GUEST_LATITUDE: f64 = 33.8121;
/// Guest longitude shared by fixtures.
pub const GUEST_LONGITUDE: f64 = -117.9190;

/// Rides plus a fixed walking table in seconds, guest first.
///
/// Row and column 0 of `seconds` are the guest; row `i + 1` belongs to
/// `rides[i]`. Requests built from the fixture list the rides in that order so
/// the table lines up with the matrix the solver builds.
///
/// # Examples
/// ```rust
/// use parkroute_core::Solver;
/// use parkroute_core::test_support::ride;
/// use parkroute_solver_exact::test_support::RouteFixture;
///
/// let fixture = RouteFixture::new(
///     vec![ride("a", 33.812, -117.918, 4)],
///     vec![vec![0, 720], vec![720, 0]],
/// );
/// let response = fixture.solver().solve(&fixture.request())?;
/// assert_eq!(response.route.stops.len(), 1);
/// # Ok::<(), parkroute_core::SolveError>(())
/// ```
#[derive(Debug, Clone)]
pub struct RouteFixture {
    /// Rides in matrix order.
    pub rides: Vec<Ride>,
    /// Walking seconds; `u64::MAX` marks an unroutable pair.
    pub seconds: Vec<Vec<u64>>,
}

impl RouteFixture {
    /// Bundle rides with their walking table.
    #[must_use]
    pub const fn new(rides: Vec<Ride>, seconds: Vec<Vec<u64>>) -> Self {
        Self { rides, seconds }
    }

    /// Guest position used by [`Self::request`].
    #[must_use]
    pub const fn start() -> Coord<f64> {
        Coord {
            x: GUEST_LONGITUDE,
            y: GUEST_LATITUDE,
        }
    }

    /// Request every ride in matrix order.
    #[must_use]
    pub fn request(&self) -> SolveRequest {
        SolveRequest::new(
            GUEST_LATITUDE,
            GUEST_LONGITUDE,
            self.rides.iter().map(|ride| ride.id.clone()),
        )
    }

    /// Store holding the fixture rides.
    #[must_use]
    pub fn store(&self) -> MemoryRideStore {
        MemoryRideStore::with_rides(self.rides.iter().cloned())
    }

    /// Provider answering from the fixture table.
    #[must_use]
    pub fn provider(&self) -> FixedTravelTimeProvider {
        FixedTravelTimeProvider::from_seconds(self.seconds.clone())
    }

    /// Solver wired to the fixture store and provider.
    #[must_use]
    pub fn solver(&self) -> ExactRouteSolver<MemoryRideStore, FixedTravelTimeProvider> {
        ExactRouteSolver::new(self.store(), self.provider())
    }

    /// Minute matrix the solver will see.
    ///
    /// # Errors
    ///
    /// Returns the provider error when the table does not cover every ride.
    pub fn matrix(&self) -> Result<DistanceMatrix, TravelTimeError> {
        DistanceMatrixBuilder::new(&self.provider()).build(Self::start(), &self.rides)
    }

    /// Queue waits in matrix order.
    #[must_use]
    pub fn waits(&self) -> Vec<u32> {
        self.rides.iter().map(|ride| ride.wait_minutes).collect()
    }
}

/// Walking plus queueing minutes for visiting rides in `order`.
///
/// Returns `f64::INFINITY` when any leg is unroutable or out of range.
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "route costs are sums of walking and queueing minutes"
)]
pub fn route_cost(matrix: &DistanceMatrix, waits: &[u32], order: &[usize]) -> f64 {
    let mut total = 0.0;
    let mut previous = 0;
    for &ride in order {
        let leg = matrix.get(previous, ride + 1).unwrap_or(f64::INFINITY);
        let wait = waits.get(ride).copied().map_or(f64::INFINITY, f64::from);
        total += leg + wait;
        previous = ride + 1;
    }
    total
}

/// Cheapest cost over every permutation of the rides, by exhaustive search.
///
/// Only practical for a handful of rides. Returns `None` when every order is
/// unroutable.
#[must_use]
pub fn brute_force_cost(matrix: &DistanceMatrix, waits: &[u32]) -> Option<f64> {
    let mut order: Vec<usize> = (0..waits.len()).collect();
    let mut best = f64::INFINITY;
    permute(&mut order, 0, &mut |candidate| {
        let cost = route_cost(matrix, waits, candidate);
        if cost < best {
            best = cost;
        }
    });
    best.is_finite().then_some(best)
}

/// Heap-free recursive permutation generator.
fn permute(items: &mut [usize], start: usize, visit: &mut impl FnMut(&[usize])) {
    if start >= items.len() {
        visit(items);
        return;
    }
    for idx in start..items.len() {
        items.swap(start, idx);
        permute(items, start + 1, visit);
        items.swap(start, idx);
    }
}

#[cfg(test)]
#[expect(
    clippy::float_arithmetic,
    reason = "tests compare costs within a tolerance"
)]
mod tests {
    use super::*;
    use parkroute_core::test_support::ride;
    use rstest::rstest;

    #[rstest]
    fn route_cost_sums_legs_and_waits() {
        let matrix = DistanceMatrix::from_minutes(vec![
            vec![0.0, 5.0, 20.0],
            vec![5.0, 0.0, 5.0],
            vec![20.0, 5.0, 0.0],
        ])
        .expect("valid matrix");
        assert!((route_cost(&matrix, &[5, 10], &[0, 1]) - 25.0).abs() < 1e-9);
        assert!((route_cost(&matrix, &[5, 10], &[1, 0]) - 40.0).abs() < 1e-9);
        let best = brute_force_cost(&matrix, &[5, 10]).expect("finite");
        assert!((best - 25.0).abs() < 1e-9);
    }

    #[rstest]
    fn fixture_matrix_converts_seconds() {
        let fixture = RouteFixture::new(
            vec![ride("a", 33.812, -117.918, 4)],
            vec![vec![0, 720], vec![660, 0]],
        );
        let matrix = fixture.matrix().expect("matrix");
        assert_eq!(matrix.get(0, 1), Some(12.0));
        assert_eq!(matrix.get(1, 0), Some(11.0));
    }
}
