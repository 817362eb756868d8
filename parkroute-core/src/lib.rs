//! Core domain types for the Parkroute optimizer.
//!
//! The crate defines rides and requests, the collaborator traits the solver
//! consumes ([`RideStore`], [`TravelTimeProvider`]), the walking-time
//! [`DistanceMatrix`] and its builder, the [`Solver`] trait with its error
//! taxonomy, and the JSON shapes gateways exchange. Constructors return
//! `Result` to surface invalid input early.

mod matrix;
mod ride;
mod route;
mod solver;
pub mod store;
pub mod travel_time;
#[cfg(feature = "serde")]
mod wire;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use matrix::{
    DistanceMatrix, DistanceMatrixBuilder, DistanceMatrixError, SECONDS_PER_MINUTE,
    duration_to_minutes,
};
pub use ride::{Ride, RideError, RideId};
pub use route::Route;
pub use solver::{
    Diagnostics, Error, ErrorClass, RequestValidationError, SolveError, SolveRequest,
    SolveResponse, Solver,
};
pub use store::{NameResolution, RideLookup, RideStore, resolve_ride_names};
pub use travel_time::{
    DEFAULT_MAX_TABLE_DIMENSION, MatrixBlock, TableLimits, TravelTimeError, TravelTimeMatrix,
    TravelTimeProvider, plan_blocks,
};
#[cfg(feature = "serde")]
pub use wire::{ErrorBody, OptimizeResponse, OrderedRide, round_minutes};
