//! Fetch travel times between locations.
//!
//! The `TravelTimeProvider` trait abstracts the routing collaborator. Callers
//! supply a slice of coordinates plus a [`MatrixBlock`] of source and
//! destination indices and receive a table of
//! [`Duration`](std::time::Duration) values, with unroutable pairs reported as
//! [`Duration::MAX`](std::time::Duration::MAX).
//!
//! Providers cap how many pairs one call may cover; [`plan_blocks`] tiles a
//! full table into blocks within those [`TableLimits`].

mod error;
mod provider;

pub use error::TravelTimeError;
pub use provider::{
    DEFAULT_MAX_TABLE_DIMENSION, MatrixBlock, TableLimits, TravelTimeMatrix, TravelTimeProvider,
    plan_blocks,
};
