//! JSON-file ride catalogue.
//!
//! [`RideCatalogue`] loads an array of ride records and serves them through
//! the [`RideStore`] trait:
//!
//! ```json
//! [
//!   { "rideId": "pirates", "name": "Pirates of the Caribbean",
//!     "lat": 33.8113, "lon": -117.9209, "waitTime": 35 }
//! ]
//! ```
//!
//! `waitTime` defaults to zero when absent and `id` is accepted in place of
//! `rideId`. Every record is validated on load; a duplicate id or an invalid
//! position rejects the whole file.

use std::collections::HashMap;
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};
use parkroute_core::{Ride, RideError, RideId, RideStore};
use serde::Deserialize;
use thiserror::Error;

/// Errors raised while loading a [`RideCatalogue`].
#[derive(Debug, Error)]
pub enum CatalogueError {
    /// The catalogue file could not be read.
    #[error("failed to read ride catalogue at {path}")]
    Io {
        /// File that failed.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The content is not a JSON array of ride records.
    #[error("failed to parse ride catalogue: {source}")]
    Parse {
        /// Decoder error.
        #[source]
        source: serde_json::Error,
    },
    /// Two records share an identifier.
    #[error("ride id {id} appears more than once")]
    DuplicateId {
        /// The repeated identifier.
        id: RideId,
    },
    /// A record failed validation.
    #[error("invalid ride record at index {index}")]
    InvalidRide {
        /// Position of the record in the array.
        index: usize,
        /// Validation failure.
        #[source]
        source: RideError,
    },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RideRecord {
    #[serde(alias = "id")]
    ride_id: String,
    name: String,
    lat: f64,
    lon: f64,
    #[serde(default)]
    wait_time: u32,
}

/// Read-only ride store backed by a JSON catalogue.
///
/// Rides are kept in file order; [`RideStore::rides`] yields them in that
/// order.
///
/// # Examples
/// ```
/// use parkroute_core::{RideId, RideStore};
/// use parkroute_data::RideCatalogue;
///
/// let catalogue = RideCatalogue::from_json_str(
///     r#"[{"rideId": "autopia", "name": "Autopia", "lat": 33.8145, "lon": -117.9166, "waitTime": 20}]"#,
/// )?;
/// let ride = catalogue.get_ride(&RideId::from("autopia")).expect("stored ride");
/// assert_eq!(ride.wait_minutes, 20);
/// # Ok::<(), parkroute_data::CatalogueError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct RideCatalogue {
    rides: Vec<Ride>,
    index: HashMap<RideId, usize>,
}

impl RideCatalogue {
    /// Load a catalogue from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogueError::Io`] when the file cannot be read, and the
    /// errors of [`Self::from_json_str`] for its content.
    pub fn load(path: &Utf8Path) -> Result<Self, CatalogueError> {
        let io_error = |source| CatalogueError::Io {
            path: path.to_path_buf(),
            source,
        };
        let parent = path
            .parent()
            .filter(|parent| !parent.as_str().is_empty())
            .unwrap_or_else(|| Utf8Path::new("."));
        let file_name = path
            .file_name()
            .ok_or_else(|| io_error(io::Error::other("catalogue path has no file name")))?;
        let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority()).map_err(io_error)?;
        let content = dir.read_to_string(file_name).map_err(io_error)?;
        let catalogue = Self::from_json_str(&content)?;
        log::debug!("loaded {} rides from {path}", catalogue.len());
        Ok(catalogue)
    }

    /// Parse a catalogue from JSON text.
    ///
    /// # Errors
    ///
    /// - [`CatalogueError::Parse`] for malformed JSON or missing fields.
    /// - [`CatalogueError::InvalidRide`] for an empty id or bad coordinates.
    /// - [`CatalogueError::DuplicateId`] when an id repeats.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogueError> {
        let records: Vec<RideRecord> =
            serde_json::from_str(json).map_err(|source| CatalogueError::Parse { source })?;
        Self::from_records(records)
    }

    /// Build a catalogue from already validated rides.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogueError::DuplicateId`] when an id repeats.
    pub fn from_rides<I>(rides: I) -> Result<Self, CatalogueError>
    where
        I: IntoIterator<Item = Ride>,
    {
        let mut catalogue = Self::default();
        for ride in rides {
            catalogue.insert(ride)?;
        }
        Ok(catalogue)
    }

    fn from_records(records: Vec<RideRecord>) -> Result<Self, CatalogueError> {
        let mut catalogue = Self::default();
        for (index, record) in records.into_iter().enumerate() {
            let ride = Ride::from_lat_lon(
                RideId::from(record.ride_id),
                record.name,
                record.lat,
                record.lon,
                record.wait_time,
            )
            .map_err(|source| CatalogueError::InvalidRide { index, source })?;
            catalogue.insert(ride)?;
        }
        Ok(catalogue)
    }

    fn insert(&mut self, ride: Ride) -> Result<(), CatalogueError> {
        if self.index.contains_key(&ride.id) {
            return Err(CatalogueError::DuplicateId { id: ride.id });
        }
        self.index.insert(ride.id.clone(), self.rides.len());
        self.rides.push(ride);
        Ok(())
    }

    /// Number of rides in the catalogue.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rides.len()
    }

    /// Whether the catalogue holds no rides.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rides.is_empty()
    }
}

impl RideStore for RideCatalogue {
    fn get_ride(&self, id: &RideId) -> Option<Ride> {
        self.index
            .get(id)
            .and_then(|&slot| self.rides.get(slot))
            .cloned()
    }

    fn rides(&self) -> Box<dyn Iterator<Item = Ride> + Send + '_> {
        Box::new(self.rides.iter().cloned())
    }
}
