//! Walking-time matrix between the guest and the requested rides.
//!
//! [`DistanceMatrix`] stores minutes in a flat row-major buffer. Index 0 is the
//! guest's position; indices `1..=n` follow the order of the rides handed to
//! [`DistanceMatrixBuilder::build`]. Unreachable cells hold `f64::INFINITY`.

use std::time::Duration;

use geo::Coord;
use thiserror::Error;

use crate::{
    MatrixBlock, Ride, TravelTimeError, TravelTimeMatrix, TravelTimeProvider, plan_blocks,
};

/// Seconds in one minute; the fixed scale applied to provider durations.
pub const SECONDS_PER_MINUTE: f64 = 60.0;

/// Convert a provider duration to minutes.
///
/// [`Duration::MAX`] is the provider's unroutable marker and maps to
/// `f64::INFINITY`.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use parkroute_core::duration_to_minutes;
///
/// assert_eq!(duration_to_minutes(Duration::from_secs(90)), 1.5);
/// assert!(duration_to_minutes(Duration::MAX).is_infinite());
/// ```
#[must_use]
pub fn duration_to_minutes(duration: Duration) -> f64 {
    if duration == Duration::MAX {
        f64::INFINITY
    } else {
        duration.as_secs_f64() / SECONDS_PER_MINUTE
    }
}

/// Errors returned by [`DistanceMatrix::from_minutes`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DistanceMatrixError {
    /// No rows were supplied.
    #[error("distance matrix must have at least one row")]
    Empty,
    /// A row length differed from the row count.
    #[error("row {row} has {len} columns but the matrix has {size} rows")]
    NotSquare {
        /// Offending row.
        row: usize,
        /// Its length.
        len: usize,
        /// Expected length.
        size: usize,
    },
    /// A cell was negative or NaN.
    #[error("cell ({from}, {to}) holds {minutes}; expected a non-negative time")]
    InvalidCell {
        /// Row index.
        from: usize,
        /// Column index.
        to: usize,
        /// Offending value.
        minutes: f64,
    },
}

/// Square matrix of walking minutes.
///
/// # Examples
/// ```
/// use parkroute_core::DistanceMatrix;
///
/// let matrix = DistanceMatrix::from_minutes(vec![
///     vec![0.0, 12.0],
///     vec![12.0, 0.0],
/// ])?;
/// assert_eq!(matrix.ride_count(), 1);
/// assert_eq!(matrix.get(0, 1), Some(12.0));
/// assert_eq!(matrix.get(2, 0), None);
/// # Ok::<(), parkroute_core::DistanceMatrixError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    size: usize,
    minutes: Vec<f64>,
}

impl DistanceMatrix {
    /// Build a matrix from rows of minutes.
    ///
    /// `f64::INFINITY` marks an unreachable pair.
    ///
    /// # Errors
    ///
    /// Rejects empty input, non-square input and negative or NaN cells.
    pub fn from_minutes(rows: Vec<Vec<f64>>) -> Result<Self, DistanceMatrixError> {
        let size = rows.len();
        if size == 0 {
            return Err(DistanceMatrixError::Empty);
        }
        let mut minutes = Vec::with_capacity(size.saturating_mul(size));
        for (from, row) in rows.into_iter().enumerate() {
            if row.len() != size {
                return Err(DistanceMatrixError::NotSquare {
                    row: from,
                    len: row.len(),
                    size,
                });
            }
            for (to, cell) in row.into_iter().enumerate() {
                if cell.is_nan() || cell < 0.0 {
                    return Err(DistanceMatrixError::InvalidCell {
                        from,
                        to,
                        minutes: cell,
                    });
                }
                minutes.push(cell);
            }
        }
        Ok(Self { size, minutes })
    }

    /// A `size`×`size` matrix with every cell unreachable.
    fn unreachable(size: usize) -> Self {
        Self {
            size,
            minutes: vec![f64::INFINITY; size.saturating_mul(size)],
        }
    }

    /// Number of rows (guest plus rides).
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Number of rides, excluding the guest row.
    #[must_use]
    pub const fn ride_count(&self) -> usize {
        self.size.saturating_sub(1)
    }

    /// Minutes from `from` to `to`, or `None` outside the matrix.
    #[must_use]
    pub fn get(&self, from: usize, to: usize) -> Option<f64> {
        self.offset(from, to)
            .and_then(|offset| self.minutes.get(offset))
            .copied()
    }

    /// Whether a finite path exists from `from` to `to`.
    #[must_use]
    pub fn is_reachable(&self, from: usize, to: usize) -> bool {
        self.get(from, to).is_some_and(f64::is_finite)
    }

    /// Borrow the minutes out of row `from`.
    #[must_use]
    pub fn row(&self, from: usize) -> Option<&[f64]> {
        let start = from.checked_mul(self.size)?;
        self.minutes.get(start..start.checked_add(self.size)?)
    }

    fn offset(&self, from: usize, to: usize) -> Option<usize> {
        if from >= self.size || to >= self.size {
            return None;
        }
        from.checked_mul(self.size)?.checked_add(to)
    }

    /// Copy one provider block into the matrix by coordinate index.
    fn merge_block(&mut self, block: &MatrixBlock, table: &TravelTimeMatrix) {
        for (from, row) in block.sources.clone().zip(table) {
            for (to, duration) in block.destinations.clone().zip(row) {
                let Some(cell) = self
                    .offset(from, to)
                    .and_then(|offset| self.minutes.get_mut(offset))
                else {
                    log::warn!("block cell ({from}, {to}) lies outside a {0}x{0} matrix", self.size);
                    debug_assert!(false, "block cell ({from}, {to}) outside matrix");
                    continue;
                };
                *cell = duration_to_minutes(*duration);
            }
        }
    }
}

/// Builds [`DistanceMatrix`] values from a [`TravelTimeProvider`].
///
/// The builder tiles the `(n+1)`×`(n+1)` table into blocks within the
/// provider's [`TableLimits`](crate::TableLimits) and merges the answers by
/// index, so the result does not depend on how the table was split.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use parkroute_core::{DistanceMatrixBuilder, Ride, RideId};
/// use parkroute_core::{MatrixBlock, TravelTimeError, TravelTimeMatrix, TravelTimeProvider};
/// use std::time::Duration;
///
/// struct Minute;
///
/// impl TravelTimeProvider for Minute {
///     fn get_travel_time_block(
///         &self,
///         locations: &[Coord<f64>],
///         block: &MatrixBlock,
///     ) -> Result<TravelTimeMatrix, TravelTimeError> {
///         block.select(locations)?;
///         Ok(vec![vec![Duration::from_secs(60); block.cols()]; block.rows()])
///     }
/// }
///
/// let ride = Ride::from_lat_lon(RideId::from("a"), "Alpha", 33.81, -117.92, 5)?;
/// let matrix = DistanceMatrixBuilder::new(&Minute)
///     .build(Coord { x: -117.91, y: 33.80 }, &[ride])?;
/// assert_eq!(matrix.get(0, 1), Some(1.0));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct DistanceMatrixBuilder<'a, T: ?Sized> {
    provider: &'a T,
}

impl<'a, T> DistanceMatrixBuilder<'a, T>
where
    T: TravelTimeProvider + ?Sized,
{
    /// Wrap a provider.
    pub const fn new(provider: &'a T) -> Self {
        Self { provider }
    }

    /// Blocks that [`Self::build`] will request for `ride_count` rides.
    #[must_use]
    pub fn plan(&self, ride_count: usize) -> Vec<MatrixBlock> {
        plan_blocks(ride_count.saturating_add(1), self.provider.limits())
    }

    /// Build the matrix for `start` followed by `rides` in order.
    ///
    /// # Errors
    ///
    /// Propagates provider failures. Blocks whose shape differs from the
    /// request fail with [`TravelTimeError::DimensionMismatch`].
    pub fn build(
        &self,
        start: Coord<f64>,
        rides: &[Ride],
    ) -> Result<DistanceMatrix, TravelTimeError> {
        let locations: Vec<Coord<f64>> = std::iter::once(start)
            .chain(rides.iter().map(|ride| ride.location))
            .collect();
        let blocks = self.plan(rides.len());
        log::debug!(
            "requesting {} travel-time block(s) for {} locations",
            blocks.len(),
            locations.len()
        );

        let tables = self.provider.get_travel_time_blocks(&locations, &blocks)?;
        if tables.len() != blocks.len() {
            return Err(TravelTimeError::ParseError {
                message: format!(
                    "requested {} blocks but received {}",
                    blocks.len(),
                    tables.len()
                ),
            });
        }

        let mut matrix = DistanceMatrix::unreachable(locations.len());
        for (block, table) in blocks.iter().zip(&tables) {
            block.check_shape(table)?;
            matrix.merge_block(block, table);
        }
        Ok(matrix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::num::NonZeroUsize;

    use rstest::{fixture, rstest};

    use crate::test_support::{FixedTravelTimeProvider, ride};
    use crate::TableLimits;

    #[fixture]
    fn rides() -> Vec<Ride> {
        vec![
            ride("a", 33.811, -117.918, 5),
            ride("b", 33.812, -117.917, 10),
            ride("c", 33.813, -117.916, 15),
        ]
    }

    fn seconds() -> Vec<Vec<u64>> {
        vec![
            vec![0, 60, 120, 180],
            vec![90, 0, 30, 300],
            vec![150, 45, 0, 600],
            vec![240, 360, 720, 0],
        ]
    }

    #[rstest]
    fn converts_seconds_to_minutes(rides: Vec<Ride>) {
        let provider = FixedTravelTimeProvider::from_seconds(seconds());
        let matrix = DistanceMatrixBuilder::new(&provider)
            .build(Coord { x: -117.919, y: 33.810 }, &rides)
            .expect("matrix should build");

        assert_eq!(matrix.size(), 4);
        assert_eq!(matrix.get(0, 1), Some(1.0));
        assert_eq!(matrix.get(1, 0), Some(1.5));
        assert_eq!(matrix.get(2, 1), Some(0.75));
        assert_eq!(matrix.get(3, 2), Some(12.0));
    }

    #[rstest]
    #[case(1)]
    #[case(2)]
    #[case(3)]
    fn batching_matches_single_call(rides: Vec<Ride>, #[case] limit: usize) {
        let start = Coord { x: -117.919, y: 33.810 };
        let single = FixedTravelTimeProvider::from_seconds(seconds());
        let limits = TableLimits::square(NonZeroUsize::new(limit).expect("non-zero"));
        let batched = FixedTravelTimeProvider::from_seconds(seconds()).with_limits(limits);

        let expected = DistanceMatrixBuilder::new(&single)
            .build(start, &rides)
            .expect("single call");
        let merged = DistanceMatrixBuilder::new(&batched)
            .build(start, &rides)
            .expect("batched calls");

        assert_eq!(merged, expected);
        assert!(batched.calls() > 1, "expected several provider calls");
    }

    #[rstest]
    fn unroutable_cells_become_infinite(rides: Vec<Ride>) {
        let mut table = seconds();
        table[0][2] = u64::MAX;
        let provider = FixedTravelTimeProvider::from_seconds(table);
        let matrix = DistanceMatrixBuilder::new(&provider)
            .build(Coord { x: -117.919, y: 33.810 }, &rides)
            .expect("matrix should build");

        assert_eq!(matrix.get(0, 2), Some(f64::INFINITY));
        assert!(!matrix.is_reachable(0, 2));
        assert!(matrix.is_reachable(0, 1));
    }

    #[rstest]
    fn provider_errors_propagate(rides: Vec<Ride>) {
        let provider = FixedTravelTimeProvider::failing(TravelTimeError::ServiceError {
            code: "NoTable".to_owned(),
            message: "no table".to_owned(),
        });
        let err = DistanceMatrixBuilder::new(&provider)
            .build(Coord { x: 0.0, y: 0.0 }, &rides)
            .expect_err("provider failure");
        assert!(matches!(err, TravelTimeError::ServiceError { .. }));
    }

    #[rstest]
    fn short_tables_are_rejected() {
        let provider = FixedTravelTimeProvider::from_seconds(vec![vec![0, 60], vec![60, 0]]);
        let rides = vec![
            ride("a", 33.811, -117.918, 5),
            ride("b", 33.812, -117.917, 10),
        ];
        let err = DistanceMatrixBuilder::new(&provider)
            .build(Coord { x: 0.0, y: 0.0 }, &rides)
            .expect_err("provider table is smaller than the request");
        assert!(matches!(
            err,
            TravelTimeError::BlockOutOfRange { .. } | TravelTimeError::DimensionMismatch { .. }
        ));
    }

    #[rstest]
    fn from_minutes_rejects_negative_cells() {
        let err = DistanceMatrix::from_minutes(vec![vec![0.0, -1.0], vec![1.0, 0.0]])
            .expect_err("negative minutes");
        assert!(matches!(err, DistanceMatrixError::InvalidCell { from: 0, to: 1, .. }));
    }

    #[rstest]
    fn from_minutes_rejects_ragged_rows() {
        let err = DistanceMatrix::from_minutes(vec![vec![0.0, 1.0], vec![1.0]])
            .expect_err("ragged rows");
        assert_eq!(
            err,
            DistanceMatrixError::NotSquare {
                row: 1,
                len: 1,
                size: 2
            }
        );
    }

    #[rstest]
    fn rows_borrow_contiguous_minutes() {
        let matrix = DistanceMatrix::from_minutes(vec![vec![0.0, 2.0], vec![3.0, 0.0]])
            .expect("valid matrix");
        assert_eq!(matrix.row(1), Some(&[3.0, 0.0][..]));
        assert_eq!(matrix.row(2), None);
    }
}
