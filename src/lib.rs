//! Facade crate for the Parkroute ride-order optimizer.
//!
//! This crate re-exports the core domain types and exposes the exact
//! Held–Karp solver behind a feature flag.

#![forbid(unsafe_code)]

pub use parkroute_core::{
    Diagnostics, DistanceMatrix, DistanceMatrixBuilder, ErrorClass, RequestValidationError, Ride,
    RideId, RideStore, Route, SolveError, SolveRequest, SolveResponse, Solver, TravelTimeError,
    TravelTimeMatrix, TravelTimeProvider, resolve_ride_names,
};

#[cfg(feature = "serde")]
pub use parkroute_core::{ErrorBody, OptimizeResponse, OrderedRide};

#[cfg(feature = "solver-exact")]
pub use parkroute_solver_exact::{ExactRouteSolver, ExactSolverConfig, MAX_RIDES};
