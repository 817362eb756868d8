use std::fmt;
use std::time::Duration;

use geo::Coord;
use thiserror::Error;

use crate::ride::is_valid_position;
use crate::{RideId, Route, TravelTimeError};

/// Parameters for a solve request.
///
/// The request captures the guest's position and the rides they want to
/// visit. Ids are resolved by the solver's [`RideStore`](crate::RideStore).
///
/// # Examples
/// ```rust
/// use parkroute_core::{RideId, SolveRequest};
///
/// let request = SolveRequest::new(33.8121, -117.9190, ["a", "b", "a"]);
/// assert_eq!(request.start().y, 33.8121);
/// assert_eq!(request.distinct_ride_ids(), vec![RideId::from("a"), RideId::from("b")]);
/// assert!(request.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct SolveRequest {
    /// Guest latitude in degrees.
    pub latitude: f64,
    /// Guest longitude in degrees.
    pub longitude: f64,
    /// Requested rides, in the order the guest picked them.
    #[cfg_attr(feature = "serde", serde(default))]
    pub ride_ids: Vec<RideId>,
}

impl SolveRequest {
    /// Build a request from a position and ride ids.
    pub fn new<I, R>(latitude: f64, longitude: f64, ride_ids: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<RideId>,
    {
        Self {
            latitude,
            longitude,
            ride_ids: ride_ids.into_iter().map(Into::into).collect(),
        }
    }

    /// Guest position with `x = longitude` and `y = latitude`.
    #[must_use]
    pub const fn start(&self) -> Coord<f64> {
        Coord {
            x: self.longitude,
            y: self.latitude,
        }
    }

    /// Requested ids with repeats collapsed to their first occurrence.
    #[must_use]
    pub fn distinct_ride_ids(&self) -> Vec<RideId> {
        let mut distinct: Vec<RideId> = Vec::with_capacity(self.ride_ids.len());
        for id in &self.ride_ids {
            if !distinct.contains(id) {
                distinct.push(id.clone());
            }
        }
        distinct
    }

    /// Check the request shape before any collaborator is consulted.
    ///
    /// # Errors
    ///
    /// Returns [`RequestValidationError::EmptyRideList`] when no rides were
    /// requested and [`RequestValidationError::InvalidCoordinates`] when the
    /// guest position is not a finite WGS84 coordinate.
    pub fn validate(&self) -> Result<(), RequestValidationError> {
        if self.ride_ids.is_empty() {
            return Err(RequestValidationError::EmptyRideList);
        }
        if !is_valid_position(self.start()) {
            return Err(RequestValidationError::InvalidCoordinates {
                latitude: self.latitude,
                longitude: self.longitude,
            });
        }
        Ok(())
    }
}

/// Request problems detected before solving.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RequestValidationError {
    /// No ride ids were supplied.
    #[error("no ride ids provided")]
    EmptyRideList,
    /// The guest position is not a finite latitude/longitude pair.
    #[error("invalid guest coordinates (lat {latitude}, lon {longitude})")]
    InvalidCoordinates {
        /// Latitude in degrees.
        latitude: f64,
        /// Longitude in degrees.
        longitude: f64,
    },
    /// More distinct rides were requested than the solver accepts.
    #[error("{requested} rides requested; at most {max} are supported")]
    TooManyRides {
        /// Distinct rides requested.
        requested: usize,
        /// Configured cap.
        max: usize,
    },
}

/// Whether an error is the caller's fault or the service's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Bad input or unknown ids.
    Client,
    /// No route exists or a collaborator failed.
    Server,
}

impl ErrorClass {
    /// HTTP status used by gateways for this class.
    #[must_use]
    pub const fn status_code(self) -> u16 {
        match self {
            Self::Client => 400,
            Self::Server => 500,
        }
    }
}

/// Ids that did not resolve, formatted as a comma-separated list.
#[derive(Debug)]
struct MissingIds<'a>(&'a [RideId]);

impl fmt::Display for MissingIds<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, id) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{id}")?;
        }
        Ok(())
    }
}

/// Errors returned by [`Solver::solve`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolveError {
    /// The request was malformed.
    #[error("invalid request: {0}")]
    InvalidInput(#[from] RequestValidationError),
    /// One or more ride ids are not in the metadata store.
    #[error("could not find rides: {}", MissingIds(.missing))]
    DataNotFound {
        /// Every requested id that did not resolve, in request order.
        missing: Vec<RideId>,
    },
    /// No finite path visits every requested ride.
    #[error("no walkable route visits every requested ride")]
    Unreachable,
    /// The routing collaborator failed or returned malformed data.
    #[error("routing service failed: {0}")]
    UpstreamService(#[from] TravelTimeError),
}

impl SolveError {
    /// Classify the error for status mapping.
    ///
    /// # Examples
    /// ```
    /// use parkroute_core::{ErrorClass, SolveError};
    ///
    /// assert_eq!(SolveError::Unreachable.class(), ErrorClass::Server);
    /// assert_eq!(SolveError::Unreachable.class().status_code(), 500);
    /// ```
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::InvalidInput(_) | Self::DataNotFound { .. } => ErrorClass::Client,
            Self::Unreachable | Self::UpstreamService(_) => ErrorClass::Server,
        }
    }
}

/// Alias for the solver error type.
pub type Error = SolveError;

/// Counters describing one solve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Diagnostics {
    /// Wall-clock time spent in the solver.
    pub solve_time: Duration,
    /// Distinct rides routed.
    pub rides_considered: usize,
    /// Predecessor relaxations performed by the dynamic program.
    pub states_evaluated: u64,
    /// Provider blocks requested to build the matrix.
    pub matrix_requests: usize,
}

/// Response from a successful solve.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveResponse {
    /// The ordered route for the guest.
    pub route: Route,
    /// Counters gathered while solving.
    pub diagnostics: Diagnostics,
}

/// Find the quickest order to visit the requested rides.
///
/// Implementations should return [`Error::InvalidInput`] for invalid
/// parameters rather than panicking.
/// Solvers must be `Send + Sync` to operate safely across threads.
pub trait Solver: Send + Sync {
    /// Solve a request, producing a route or an error.
    fn solve(&self, request: &SolveRequest) -> Result<SolveResponse, Error>;
}
