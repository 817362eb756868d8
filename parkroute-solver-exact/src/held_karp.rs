//! Held–Karp dynamic program over ride subsets.
//!
//! `cost[mask][j]` is the least walking plus queueing time needed to visit
//! exactly the rides in `mask`, finishing at ride `j`. Subsets are processed
//! in waves of equal population count, so each transition only reads
//! finished smaller subsets. The walk never returns to the guest.
//!
//! Ties go to the lowest ride index. Predecessors and the final terminal are
//! scanned in ascending order and only a strictly smaller cost replaces the
//! incumbent.

use parkroute_core::{DistanceMatrix, RequestValidationError, SolveError};

/// Largest ride count the table layout supports.
///
/// `cost` holds `n * 2^n` entries, so 24 rides already need several
/// gigabytes.
pub const MAX_RIDES: usize = 24;

const NO_PARENT: u8 = u8::MAX;

/// An optimal visiting order.
#[derive(Debug, Clone, PartialEq)]
pub struct PathSolution {
    /// Ride indices (0-based, excluding the guest) in visiting order.
    pub order: Vec<usize>,
    /// Total walking plus queueing minutes.
    pub total_minutes: f64,
    /// Number of `(subset, terminal, predecessor)` relaxations performed.
    pub states_evaluated: u64,
}

/// Flat `[mask][terminal]` tables.
struct Tables {
    rides: usize,
    cost: Vec<f64>,
    parent: Vec<u8>,
}

impl Tables {
    fn new(rides: usize) -> Self {
        let len = rides << rides;
        Self {
            rides,
            cost: vec![f64::INFINITY; len],
            parent: vec![NO_PARENT; len],
        }
    }

    const fn slot(&self, mask: usize, terminal: usize) -> usize {
        mask * self.rides + terminal
    }

    fn cost(&self, mask: usize, terminal: usize) -> f64 {
        self.cost
            .get(self.slot(mask, terminal))
            .copied()
            .unwrap_or(f64::INFINITY)
    }

    fn parent(&self, mask: usize, terminal: usize) -> Option<usize> {
        self.parent
            .get(self.slot(mask, terminal))
            .copied()
            .filter(|&parent| parent != NO_PARENT)
            .map(usize::from)
    }

    fn set(&mut self, mask: usize, terminal: usize, cost: f64, parent: Option<usize>) {
        let slot = self.slot(mask, terminal);
        if let Some(cell) = self.cost.get_mut(slot) {
            *cell = cost;
        }
        if let Some(cell) = self.parent.get_mut(slot) {
            *cell = parent
                .and_then(|index| u8::try_from(index).ok())
                .unwrap_or(NO_PARENT);
        }
    }
}

/// Iterate set bits of `mask` in ascending order.
fn members(mask: usize, rides: usize) -> impl Iterator<Item = usize> {
    (0..rides).filter(move |&bit| mask & (1 << bit) != 0)
}

/// Next integer with the same population count (Gosper's hack).
const fn next_subset(mask: usize) -> usize {
    let lowest = mask & mask.wrapping_neg();
    let ripple = mask + lowest;
    (((ripple ^ mask) >> 2) >> lowest.trailing_zeros()) | ripple
}

/// Every `rides`-bit mask with exactly `size` bits set, in ascending order.
fn subsets_of_size(rides: usize, size: usize) -> impl Iterator<Item = usize> {
    let limit = 1_usize << rides;
    let first = (1_usize << size) - 1;
    std::iter::successors(Some(first), |&mask| Some(next_subset(mask)))
        .take_while(move |&mask| mask < limit)
}

/// Find the quickest order visiting every ride once, starting at the guest.
///
/// `matrix` row and column 0 are the guest; `1..=n` are the rides whose
/// queue waits are given by `waits`. Each wait is charged on arrival.
///
/// # Errors
///
/// - [`SolveError::InvalidInput`] for zero rides or more than [`MAX_RIDES`].
/// - [`SolveError::Unreachable`] when no finite order exists.
///
/// # Examples
/// ```
/// use parkroute_core::DistanceMatrix;
/// use parkroute_solver_exact::solve_path;
///
/// let matrix = DistanceMatrix::from_minutes(vec![
///     vec![0.0, 12.0],
///     vec![12.0, 0.0],
/// ])?;
/// let solution = solve_path(&matrix, &[4]).expect("single ride is reachable");
/// assert_eq!(solution.order, vec![0]);
/// assert_eq!(solution.total_minutes, 16.0);
/// # Ok::<(), parkroute_core::DistanceMatrixError>(())
/// ```
#[expect(
    clippy::float_arithmetic,
    reason = "route costs are sums of walking and queueing minutes"
)]
pub fn solve_path(matrix: &DistanceMatrix, waits: &[u32]) -> Result<PathSolution, SolveError> {
    let rides = waits.len();
    if rides == 0 {
        return Err(RequestValidationError::EmptyRideList.into());
    }
    if rides > MAX_RIDES {
        return Err(RequestValidationError::TooManyRides {
            requested: rides,
            max: MAX_RIDES,
        }
        .into());
    }
    debug_assert_eq!(
        matrix.ride_count(),
        rides,
        "matrix and wait list describe different ride counts"
    );

    let edge = |from: usize, to: usize| matrix.get(from, to).unwrap_or(f64::INFINITY);
    let wait = |ride: usize| waits.get(ride).copied().map_or(f64::INFINITY, f64::from);

    let mut tables = Tables::new(rides);
    let mut states_evaluated = 0_u64;

    for ride in 0..rides {
        tables.set(1 << ride, ride, edge(0, ride + 1) + wait(ride), None);
    }

    for size in 2..=rides {
        for mask in subsets_of_size(rides, size) {
            for terminal in members(mask, rides) {
                let previous = mask ^ (1 << terminal);
                let arrival = wait(terminal);
                let mut best = f64::INFINITY;
                let mut best_parent = None;
                for predecessor in members(previous, rides) {
                    states_evaluated += 1;
                    let candidate = tables.cost(previous, predecessor)
                        + edge(predecessor + 1, terminal + 1)
                        + arrival;
                    if candidate < best {
                        best = candidate;
                        best_parent = Some(predecessor);
                    }
                }
                tables.set(mask, terminal, best, best_parent);
            }
        }
    }

    let full = (1_usize << rides) - 1;
    let mut best = f64::INFINITY;
    let mut best_terminal = None;
    for terminal in 0..rides {
        let candidate = tables.cost(full, terminal);
        if candidate < best {
            best = candidate;
            best_terminal = Some(terminal);
        }
    }
    let Some(terminal) = best_terminal.filter(|_| best.is_finite()) else {
        log::warn!("no finite order visits all {rides} rides");
        return Err(SolveError::Unreachable);
    };

    let order = reconstruct(&tables, full, terminal);
    debug_assert_eq!(order.len(), rides, "reconstructed order skips rides");
    Ok(PathSolution {
        order,
        total_minutes: best,
        states_evaluated,
    })
}

/// Walk parent links back from `terminal` and return the forward order.
fn reconstruct(tables: &Tables, full: usize, terminal: usize) -> Vec<usize> {
    let mut order = Vec::with_capacity(tables.rides);
    let mut mask = full;
    let mut current = Some(terminal);
    while let Some(ride) = current {
        order.push(ride);
        current = tables.parent(mask, ride);
        mask ^= 1 << ride;
    }
    order.reverse();
    order
}

#[cfg(test)]
#[expect(
    clippy::float_arithmetic,
    reason = "tests compare costs within a tolerance"
)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn matrix(rows: Vec<Vec<f64>>) -> DistanceMatrix {
        DistanceMatrix::from_minutes(rows).expect("valid test matrix")
    }

    #[rstest]
    #[case(3, 1, &[0b001, 0b010, 0b100])]
    #[case(3, 2, &[0b011, 0b101, 0b110])]
    #[case(4, 3, &[0b0111, 0b1011, 0b1101, 0b1110])]
    #[case(3, 3, &[0b111])]
    fn subsets_enumerate_one_wave(
        #[case] rides: usize,
        #[case] size: usize,
        #[case] expected: &[usize],
    ) {
        let subsets: Vec<_> = subsets_of_size(rides, size).collect();
        assert_eq!(subsets, expected);
    }

    #[rstest]
    fn single_ride_charges_walk_and_wait() {
        let solution =
            solve_path(&matrix(vec![vec![0.0, 12.0], vec![12.0, 0.0]]), &[4]).expect("solvable");
        assert_eq!(solution.order, vec![0]);
        assert!((solution.total_minutes - 16.0).abs() < 1e-9);
        assert_eq!(solution.states_evaluated, 0);
    }

    #[rstest]
    fn two_rides_pick_the_cheaper_order() {
        // [A, B] = 10 + 5 + 8 + 2 = 25; [B, A] = 20 + 2 + 8 + 5 = 35.
        let table = matrix(vec![
            vec![0.0, 10.0, 20.0],
            vec![10.0, 0.0, 8.0],
            vec![20.0, 8.0, 0.0],
        ]);
        let solution = solve_path(&table, &[5, 2]).expect("solvable");
        assert_eq!(solution.order, vec![0, 1]);
        assert!((solution.total_minutes - 25.0).abs() < 1e-9);
    }

    #[rstest]
    fn ties_go_to_the_lowest_index() {
        let table = matrix(vec![
            vec![0.0, 1.0, 1.0, 1.0],
            vec![1.0, 0.0, 1.0, 1.0],
            vec![1.0, 1.0, 0.0, 1.0],
            vec![1.0, 1.0, 1.0, 0.0],
        ]);
        let solution = solve_path(&table, &[0, 0, 0]).expect("solvable");
        // Lowest terminal first, then the lowest predecessor at each step back.
        assert_eq!(solution.order, vec![2, 1, 0]);
    }

    #[rstest]
    fn asymmetric_edges_are_respected() {
        let table = matrix(vec![
            vec![0.0, 1.0, 1.0],
            vec![1.0, 0.0, 50.0],
            vec![1.0, 2.0, 0.0],
        ]);
        let solution = solve_path(&table, &[0, 0]).expect("solvable");
        assert_eq!(solution.order, vec![1, 0]);
        assert!((solution.total_minutes - 3.0).abs() < 1e-9);
    }

    #[rstest]
    fn unreachable_start_is_reported() {
        let table = matrix(vec![
            vec![0.0, f64::INFINITY, f64::INFINITY],
            vec![1.0, 0.0, 1.0],
            vec![1.0, 1.0, 0.0],
        ]);
        assert_eq!(solve_path(&table, &[1, 1]), Err(SolveError::Unreachable));
    }

    #[rstest]
    fn infinite_edges_are_routed_around() {
        let table = matrix(vec![
            vec![0.0, 2.0, f64::INFINITY],
            vec![2.0, 0.0, 3.0],
            vec![f64::INFINITY, f64::INFINITY, 0.0],
        ]);
        let solution = solve_path(&table, &[0, 0]).expect("one finite order exists");
        assert_eq!(solution.order, vec![0, 1]);
        assert!((solution.total_minutes - 5.0).abs() < 1e-9);
    }

    #[rstest]
    fn rejects_empty_and_oversized_inputs() {
        let table = matrix(vec![vec![0.0]]);
        assert_eq!(
            solve_path(&table, &[]),
            Err(SolveError::InvalidInput(RequestValidationError::EmptyRideList))
        );
        let waits = vec![0; MAX_RIDES + 1];
        assert!(matches!(
            solve_path(&table, &waits),
            Err(SolveError::InvalidInput(
                RequestValidationError::TooManyRides { requested: 25, max: 24 }
            ))
        ));
    }
}
