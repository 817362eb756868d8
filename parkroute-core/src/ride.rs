//! Rides a guest may queue for.
//!
//! Coordinates are WGS84 with `x = longitude` and `y = latitude`, matching the
//! convention used by `geo` and the routing collaborators.

use std::fmt;

use geo::Coord;
use thiserror::Error;

/// Opaque identifier of a ride in the metadata store.
///
/// # Examples
/// ```
/// use parkroute_core::RideId;
///
/// let id = RideId::from("peter-pan");
/// assert_eq!(id.as_str(), "peter-pan");
/// assert_eq!(id.to_string(), "peter-pan");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct RideId(String);

impl RideId {
    /// Wrap a raw identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the identifier is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for RideId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RideId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for RideId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Errors returned by [`Ride::new`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RideError {
    /// The identifier was empty.
    #[error("ride identifier must not be empty")]
    EmptyId,
    /// The position was not a finite WGS84 coordinate.
    #[error("ride {id} has invalid coordinates (lat {latitude}, lon {longitude})")]
    InvalidCoordinates {
        /// Offending ride.
        id: RideId,
        /// Latitude in degrees.
        latitude: f64,
        /// Longitude in degrees.
        longitude: f64,
    },
}

/// A ride with its position and current queue wait.
///
/// # Examples
/// ```
/// use parkroute_core::{Ride, RideId};
///
/// let ride = Ride::from_lat_lon(RideId::from("toad"), "Mr. Toad's Wild Ride", 33.8121, -117.9190, 25)?;
/// assert_eq!(ride.latitude(), 33.8121);
/// assert_eq!(ride.wait_minutes, 25);
/// # Ok::<(), parkroute_core::RideError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Ride {
    /// Store identifier.
    pub id: RideId,
    /// Display name.
    pub name: String,
    /// Entrance position (`x = longitude`, `y = latitude`).
    pub location: Coord<f64>,
    /// Current queue wait in whole minutes.
    pub wait_minutes: u32,
}

impl Ride {
    /// Validate and construct a [`Ride`].
    ///
    /// # Errors
    ///
    /// Returns [`RideError::EmptyId`] for an empty identifier and
    /// [`RideError::InvalidCoordinates`] when the location is not a finite
    /// latitude/longitude pair.
    pub fn new(
        id: RideId,
        name: impl Into<String>,
        location: Coord<f64>,
        wait_minutes: u32,
    ) -> Result<Self, RideError> {
        if id.is_empty() {
            return Err(RideError::EmptyId);
        }
        if !is_valid_position(location) {
            return Err(RideError::InvalidCoordinates {
                id,
                latitude: location.y,
                longitude: location.x,
            });
        }
        Ok(Self {
            id,
            name: name.into(),
            location,
            wait_minutes,
        })
    }

    /// Construct a ride from latitude and longitude in degrees.
    ///
    /// # Errors
    ///
    /// See [`Ride::new`].
    pub fn from_lat_lon(
        id: RideId,
        name: impl Into<String>,
        latitude: f64,
        longitude: f64,
        wait_minutes: u32,
    ) -> Result<Self, RideError> {
        Self::new(
            id,
            name,
            Coord {
                x: longitude,
                y: latitude,
            },
            wait_minutes,
        )
    }

    /// Latitude in degrees.
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.location.y
    }

    /// Longitude in degrees.
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.location.x
    }
}

/// Whether `position` is a finite WGS84 coordinate.
pub(crate) fn is_valid_position(position: Coord<f64>) -> bool {
    position.x.is_finite()
        && position.y.is_finite()
        && (-180.0..=180.0).contains(&position.x)
        && (-90.0..=90.0).contains(&position.y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn ride_requires_identifier() {
        let err = Ride::from_lat_lon(RideId::from(""), "Nameless", 0.0, 0.0, 0)
            .expect_err("empty id should be rejected");
        assert_eq!(err, RideError::EmptyId);
    }

    #[rstest]
    #[case(91.0, 0.0)]
    #[case(-90.5, 0.0)]
    #[case(0.0, 180.1)]
    #[case(f64::NAN, 0.0)]
    #[case(0.0, f64::INFINITY)]
    fn ride_rejects_invalid_coordinates(#[case] latitude: f64, #[case] longitude: f64) {
        let err = Ride::from_lat_lon(RideId::from("r"), "Ride", latitude, longitude, 5)
            .expect_err("invalid coordinates should be rejected");
        assert!(matches!(err, RideError::InvalidCoordinates { .. }));
    }

    #[rstest]
    fn lat_lon_map_onto_geo_axes() {
        let ride = Ride::from_lat_lon(RideId::from("r"), "Ride", 33.81, -117.92, 5)
            .expect("valid ride");
        assert_eq!(ride.location, Coord { x: -117.92, y: 33.81 });
        assert_eq!(ride.latitude(), 33.81);
        assert_eq!(ride.longitude(), -117.92);
    }
}
