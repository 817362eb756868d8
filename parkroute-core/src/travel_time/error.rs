use std::ops::Range;

use thiserror::Error;

/// Errors from [`crate::TravelTimeProvider`] implementations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TravelTimeError {
    /// No locations were provided.
    ///
    /// The provider requires at least one location to compute a matrix.
    #[error("at least one location is required")]
    EmptyInput,
    /// A requested block referenced locations outside the supplied slice.
    #[error("block {sources:?} x {destinations:?} exceeds {locations} locations")]
    BlockOutOfRange {
        /// Requested source indices.
        sources: Range<usize>,
        /// Requested destination indices.
        destinations: Range<usize>,
        /// Number of supplied locations.
        locations: usize,
    },
    /// The routing service could not be reached.
    #[error("request to {url} failed: {message}")]
    NetworkError {
        /// Requested URL.
        url: String,
        /// Transport error description.
        message: String,
    },
    /// The routing service did not answer within the configured timeout.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Requested URL.
        url: String,
        /// Configured timeout in seconds.
        timeout_secs: u64,
    },
    /// The routing service answered with a non-success HTTP status.
    #[error("request to {url} returned HTTP {status}: {message}")]
    HttpError {
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Error description.
        message: String,
    },
    /// The routing service reported a failure in its payload.
    #[error("routing service error {code}: {message}")]
    ServiceError {
        /// Service status code, e.g. `NoTable`.
        code: String,
        /// Service message.
        message: String,
    },
    /// The response body could not be decoded.
    #[error("failed to parse routing response: {message}")]
    ParseError {
        /// Decoder error description.
        message: String,
    },
    /// The returned table did not have the requested shape.
    #[error("expected a {expected_rows}x{expected_cols} table, got {rows} rows ({detail})")]
    DimensionMismatch {
        /// Number of requested sources.
        expected_rows: usize,
        /// Number of requested destinations.
        expected_cols: usize,
        /// Number of rows received.
        rows: usize,
        /// Which part of the table was malformed.
        detail: String,
    },
}
