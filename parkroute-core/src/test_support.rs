//! Test-only collaborators: an in-memory `RideStore` and deterministic
//! `TravelTimeProvider`s used by unit and behaviour tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use geo::Coord;

use crate::{
    MatrixBlock, Ride, RideId, RideStore, TableLimits, TravelTimeError, TravelTimeMatrix,
    TravelTimeProvider,
};

/// Build a valid ride named `Ride <id>`.
///
/// # Panics
///
/// Panics when the coordinates are invalid.
#[must_use]
pub fn ride(id: &str, latitude: f64, longitude: f64, wait_minutes: u32) -> Ride {
    Ride::from_lat_lon(
        RideId::from(id),
        format!("Ride {id}"),
        latitude,
        longitude,
        wait_minutes,
    )
    .expect("test ride should be valid")
}

/// In-memory `RideStore` implementation used in tests.
///
/// The store performs a linear scan and keeps insertion order, which is the
/// order [`RideStore::rides`] yields.
#[derive(Default, Debug, Clone)]
pub struct MemoryRideStore {
    rides: Vec<Ride>,
}

impl MemoryRideStore {
    /// Create a store containing a single ride.
    pub fn with_ride(ride: Ride) -> Self {
        Self::with_rides(std::iter::once(ride))
    }

    /// Create a store from a collection of rides.
    pub fn with_rides<I>(rides: I) -> Self
    where
        I: IntoIterator<Item = Ride>,
    {
        Self {
            rides: rides.into_iter().collect(),
        }
    }
}

impl RideStore for MemoryRideStore {
    fn get_ride(&self, id: &RideId) -> Option<Ride> {
        self.rides.iter().find(|ride| ride.id == *id).cloned()
    }

    fn rides(&self) -> Box<dyn Iterator<Item = Ride> + Send + '_> {
        Box::new(self.rides.iter().cloned())
    }
}

/// Deterministic `TravelTimeProvider` returning one-second edges.
#[derive(Default, Debug, Copy, Clone)]
pub struct UnitTravelTimeProvider;

impl TravelTimeProvider for UnitTravelTimeProvider {
    fn get_travel_time_block(
        &self,
        locations: &[Coord<f64>],
        block: &MatrixBlock,
    ) -> Result<TravelTimeMatrix, TravelTimeError> {
        block.select(locations)?;
        Ok(block
            .sources
            .clone()
            .map(|from| {
                block
                    .destinations
                    .clone()
                    .map(|to| {
                        if from == to {
                            Duration::ZERO
                        } else {
                            Duration::from_secs(1)
                        }
                    })
                    .collect()
            })
            .collect())
    }
}

/// `TravelTimeProvider` answering from a fixed table of seconds.
///
/// Cells equal to `u64::MAX` are reported as unroutable. The provider slices
/// the table by block, counts calls and can advertise tight limits to force
/// batching.
#[derive(Debug)]
pub struct FixedTravelTimeProvider {
    table: Vec<Vec<u64>>,
    limits: TableLimits,
    failure: Option<TravelTimeError>,
    calls: AtomicUsize,
}

impl FixedTravelTimeProvider {
    /// Answer every block from `table`.
    #[must_use]
    pub fn from_seconds(table: Vec<Vec<u64>>) -> Self {
        Self {
            table,
            limits: TableLimits::default(),
            failure: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Fail every block with `error`.
    #[must_use]
    pub fn failing(error: TravelTimeError) -> Self {
        Self {
            failure: Some(error),
            ..Self::from_seconds(Vec::new())
        }
    }

    /// Advertise `limits` instead of the default.
    #[must_use]
    pub fn with_limits(mut self, limits: TableLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Number of blocks answered so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl TravelTimeProvider for FixedTravelTimeProvider {
    fn limits(&self) -> TableLimits {
        self.limits
    }

    fn get_travel_time_block(
        &self,
        locations: &[Coord<f64>],
        block: &MatrixBlock,
    ) -> Result<TravelTimeMatrix, TravelTimeError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        block.select(locations)?;
        let mut rows = Vec::with_capacity(block.rows());
        for from in block.sources.clone() {
            let Some(source) = self.table.get(from) else {
                return Ok(rows);
            };
            let row = block
                .destinations
                .clone()
                .filter_map(|to| source.get(to))
                .map(|&secs| {
                    if secs == u64::MAX {
                        Duration::MAX
                    } else {
                        Duration::from_secs(secs)
                    }
                })
                .collect();
            rows.push(row);
        }
        Ok(rows)
    }
}
