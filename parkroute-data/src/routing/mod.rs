//! HTTP-based travel time providers for routing services.
//!
//! This module provides [`HttpTravelTimeProvider`], an implementation of
//! [`parkroute_core::TravelTimeProvider`] that fetches walking times from an
//! OSRM routing service.
//!
//! # Architecture
//!
//! The provider makes HTTP requests to the OSRM Table API, one per
//! [`parkroute_core::MatrixBlock`]. The synchronous trait is implemented by
//! blocking on async HTTP calls internally, keeping the solver embeddable in
//! synchronous contexts.
//!
//! # Example
//!
//! ```no_run
//! use std::num::NonZeroUsize;
//! use std::time::Duration;
//! use parkroute_core::{DistanceMatrixBuilder, TableLimits};
//! use parkroute_data::routing::{HttpTravelTimeProvider, HttpTravelTimeProviderConfig};
//! use geo::Coord;
//!
//! let config = HttpTravelTimeProviderConfig::new("http://localhost:5000")
//!     .with_profile("foot")
//!     .with_timeout(Duration::from_secs(10))
//!     .with_limits(TableLimits::square(NonZeroUsize::new(100).expect("non-zero")));
//! let provider = HttpTravelTimeProvider::with_config(config)?;
//!
//! let guest = Coord { x: -117.9190, y: 33.8121 };
//! let matrix = DistanceMatrixBuilder::new(&provider).build(guest, &[])?;
//! assert_eq!(matrix.size(), 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod osrm;
mod provider;

pub use provider::{
    DEFAULT_PROFILE, DEFAULT_USER_AGENT, HttpTravelTimeProvider, HttpTravelTimeProviderConfig,
    ProviderBuildError,
};
