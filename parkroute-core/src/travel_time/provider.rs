//! Travel-time provider trait, table limits and block planning.

use std::num::NonZeroUsize;
use std::ops::Range;
use std::time::Duration;

use geo::Coord;

use super::error::TravelTimeError;

/// Table of travel times, `table[i][j]` from the i-th source to the j-th
/// destination. Unroutable pairs are reported as [`Duration::MAX`].
pub type TravelTimeMatrix = Vec<Vec<Duration>>;

/// Per-call ceiling on sources and destinations.
pub const DEFAULT_MAX_TABLE_DIMENSION: usize = 350;

const DEFAULT_DIMENSION: NonZeroUsize =
    NonZeroUsize::MIN.saturating_add(DEFAULT_MAX_TABLE_DIMENSION - 1);

/// How many sources and destinations a provider accepts in one call.
///
/// # Examples
/// ```
/// use std::num::NonZeroUsize;
/// use parkroute_core::TableLimits;
///
/// let limits = TableLimits::default();
/// assert_eq!(limits.max_sources.get(), 350);
///
/// let tiny = TableLimits::square(NonZeroUsize::new(2).expect("non-zero"));
/// assert_eq!(tiny.max_destinations.get(), 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableLimits {
    /// Maximum rows per call.
    pub max_sources: NonZeroUsize,
    /// Maximum columns per call.
    pub max_destinations: NonZeroUsize,
}

impl TableLimits {
    /// Limits with independent row and column ceilings.
    #[must_use]
    pub const fn new(max_sources: NonZeroUsize, max_destinations: NonZeroUsize) -> Self {
        Self {
            max_sources,
            max_destinations,
        }
    }

    /// Limits with the same ceiling on both axes.
    #[must_use]
    pub const fn square(max: NonZeroUsize) -> Self {
        Self::new(max, max)
    }
}

impl Default for TableLimits {
    fn default() -> Self {
        Self::square(DEFAULT_DIMENSION)
    }
}

/// A rectangular slice of the full location table fetched in one call.
///
/// Ranges index into the location slice handed to the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixBlock {
    /// Source (row) indices.
    pub sources: Range<usize>,
    /// Destination (column) indices.
    pub destinations: Range<usize>,
}

impl MatrixBlock {
    /// A block spanning every pair of `size` locations.
    #[must_use]
    pub const fn full(size: usize) -> Self {
        Self {
            sources: 0..size,
            destinations: 0..size,
        }
    }

    /// Number of rows in the block.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.sources.len()
    }

    /// Number of columns in the block.
    #[must_use]
    pub fn cols(&self) -> usize {
        self.destinations.len()
    }

    /// Borrow the source and destination coordinates of this block.
    ///
    /// # Errors
    ///
    /// Returns [`TravelTimeError::EmptyInput`] for an empty block and
    /// [`TravelTimeError::BlockOutOfRange`] when the ranges exceed
    /// `locations`.
    pub fn select<'a>(
        &self,
        locations: &'a [Coord<f64>],
    ) -> Result<(&'a [Coord<f64>], &'a [Coord<f64>]), TravelTimeError> {
        if self.sources.is_empty() || self.destinations.is_empty() {
            return Err(TravelTimeError::EmptyInput);
        }
        let sources = locations.get(self.sources.clone());
        let destinations = locations.get(self.destinations.clone());
        match (sources, destinations) {
            (Some(sources), Some(destinations)) => Ok((sources, destinations)),
            _ => Err(TravelTimeError::BlockOutOfRange {
                sources: self.sources.clone(),
                destinations: self.destinations.clone(),
                locations: locations.len(),
            }),
        }
    }

    /// Check that `table` has one row per source and one column per
    /// destination.
    ///
    /// # Errors
    ///
    /// Returns [`TravelTimeError::DimensionMismatch`] naming the first
    /// offending row.
    pub fn check_shape(&self, table: &TravelTimeMatrix) -> Result<(), TravelTimeError> {
        let mismatch = |detail: String| TravelTimeError::DimensionMismatch {
            expected_rows: self.rows(),
            expected_cols: self.cols(),
            rows: table.len(),
            detail,
        };
        if table.len() != self.rows() {
            return Err(mismatch("row count differs".to_owned()));
        }
        if let Some((idx, row)) = table
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != self.cols())
        {
            return Err(mismatch(format!("row {idx} has {} columns", row.len())));
        }
        Ok(())
    }
}

/// Tile a `size`×`size` table into blocks that respect `limits`.
///
/// Blocks are returned row-major: all column chunks of the first row chunk,
/// then the next row chunk. Every cell is covered exactly once.
///
/// # Examples
/// ```
/// use std::num::NonZeroUsize;
/// use parkroute_core::{TableLimits, plan_blocks};
///
/// let limits = TableLimits::square(NonZeroUsize::new(2).expect("non-zero"));
/// let blocks = plan_blocks(3, limits);
/// assert_eq!(blocks.len(), 4);
/// assert_eq!(blocks[0].sources, 0..2);
/// assert_eq!(blocks[3].destinations, 2..3);
/// ```
#[must_use]
pub fn plan_blocks(size: usize, limits: TableLimits) -> Vec<MatrixBlock> {
    let row_chunks = chunk_ranges(size, limits.max_sources);
    let col_chunks = chunk_ranges(size, limits.max_destinations);
    row_chunks
        .iter()
        .flat_map(|rows| {
            col_chunks.iter().map(move |cols| MatrixBlock {
                sources: rows.clone(),
                destinations: cols.clone(),
            })
        })
        .collect()
}

fn chunk_ranges(size: usize, chunk: NonZeroUsize) -> Vec<Range<usize>> {
    (0..size)
        .step_by(chunk.get())
        .map(|start| start..size.min(start.saturating_add(chunk.get())))
        .collect()
}

/// Fetch pairwise travel times between locations.
///
/// The capability the distance matrix builder depends on: given the full list
/// of locations and a block of source and destination indices, return the
/// travel times for that block. Implementations advertise their per-call
/// ceiling through [`TravelTimeProvider::limits`]; callers never request a
/// block larger than that.
///
/// Unroutable pairs must be reported as [`Duration::MAX`], never as zero or
/// omitted.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use geo::Coord;
/// use parkroute_core::{MatrixBlock, TravelTimeError, TravelTimeMatrix, TravelTimeProvider};
///
/// struct UnitProvider;
///
/// impl TravelTimeProvider for UnitProvider {
///     fn get_travel_time_block(
///         &self,
///         locations: &[Coord<f64>],
///         block: &MatrixBlock,
///     ) -> Result<TravelTimeMatrix, TravelTimeError> {
///         block.select(locations)?;
///         Ok(block
///             .sources
///             .clone()
///             .map(|i| {
///                 block
///                     .destinations
///                     .clone()
///                     .map(|j| if i == j { Duration::ZERO } else { Duration::from_secs(1) })
///                     .collect()
///             })
///             .collect())
///     }
/// }
///
/// let locations = [Coord { x: 0.0, y: 0.0 }, Coord { x: 1.0, y: 1.0 }];
/// let matrix = UnitProvider.get_travel_time_matrix(&locations)?;
/// assert_eq!(matrix[0][1], Duration::from_secs(1));
/// # Ok::<(), TravelTimeError>(())
/// ```
pub trait TravelTimeProvider {
    /// Per-call ceiling on sources and destinations.
    fn limits(&self) -> TableLimits {
        TableLimits::default()
    }

    /// Return travel times for one block of `locations`.
    ///
    /// Implementations must return `Err(TravelTimeError::EmptyInput)` when the
    /// block is empty.
    fn get_travel_time_block(
        &self,
        locations: &[Coord<f64>],
        block: &MatrixBlock,
    ) -> Result<TravelTimeMatrix, TravelTimeError>;

    /// Return travel times for several blocks, in the order given.
    ///
    /// The default issues one call per block sequentially. Providers backed by
    /// a network service may dispatch the blocks concurrently.
    fn get_travel_time_blocks(
        &self,
        locations: &[Coord<f64>],
        blocks: &[MatrixBlock],
    ) -> Result<Vec<TravelTimeMatrix>, TravelTimeError> {
        blocks
            .iter()
            .map(|block| self.get_travel_time_block(locations, block))
            .collect()
    }

    /// Return the full `n`×`n` table for `locations` in a single block.
    fn get_travel_time_matrix(
        &self,
        locations: &[Coord<f64>],
    ) -> Result<TravelTimeMatrix, TravelTimeError> {
        if locations.is_empty() {
            return Err(TravelTimeError::EmptyInput);
        }
        self.get_travel_time_block(locations, &MatrixBlock::full(locations.len()))
    }
}

impl<T: TravelTimeProvider + ?Sized> TravelTimeProvider for &T {
    fn limits(&self) -> TableLimits {
        (**self).limits()
    }

    fn get_travel_time_block(
        &self,
        locations: &[Coord<f64>],
        block: &MatrixBlock,
    ) -> Result<TravelTimeMatrix, TravelTimeError> {
        (**self).get_travel_time_block(locations, block)
    }

    fn get_travel_time_blocks(
        &self,
        locations: &[Coord<f64>],
        blocks: &[MatrixBlock],
    ) -> Result<Vec<TravelTimeMatrix>, TravelTimeError> {
        (**self).get_travel_time_blocks(locations, blocks)
    }
}
