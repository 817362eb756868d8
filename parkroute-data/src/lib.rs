//! Collaborator adapters for the Parkroute optimizer.
//!
//! Responsibilities:
//! - Fetch walking times from an OSRM routing service
//!   ([`routing::HttpTravelTimeProvider`]).
//! - Load ride metadata from a JSON catalogue ([`RideCatalogue`]).
//!
//! Boundaries:
//! - Do not encode routing rules (live in `parkroute-core` and the solver
//!   crates).
//! - Keep blocking I/O off async executors; the HTTP provider drives its own
//!   runtime.
//!
//! Invariants:
//! - Adapters are read-only once constructed and safe to share across
//!   threads.
//! - No global mutable state.

#![forbid(unsafe_code)]

mod catalogue;
pub mod routing;

pub use catalogue::{CatalogueError, RideCatalogue};
