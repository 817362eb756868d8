//! Exact route solver for Parkroute.
//!
//! This crate provides [`ExactRouteSolver`], the default implementation of the
//! [`Solver`](parkroute_core::Solver) trait. It resolves the requested rides
//! from a [`RideStore`](parkroute_core::RideStore), asks a
//! [`TravelTimeProvider`](parkroute_core::TravelTimeProvider) for the walking
//! matrix and runs the Held–Karp dynamic program ([`solve_path`]) to find the
//! order with the least walking plus queueing time. The walk starts at the
//! guest and does not return.
//!
//! Memory grows as `n * 2^n`, so requests are capped by
//! [`ExactSolverConfig::max_rides`] and never exceed [`MAX_RIDES`].

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod held_karp;
mod solver;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use held_karp::{MAX_RIDES, PathSolution, solve_path};
pub use solver::{DEFAULT_MAX_RIDES, ExactRouteSolver, ExactSolverConfig};
