//! Wire types for the OSRM Table service.
//!
//! See: <http://project-osrm.org/docs/v5.24.0/api/#table-service>

use serde::Deserialize;

/// Body of a Table API response.
///
/// Only the fields the provider consumes are decoded; `sources`,
/// `destinations` and `distances` are ignored.
#[derive(Debug, Deserialize)]
pub struct TableResponse {
    /// `"Ok"` on success, otherwise an error code such as `"InvalidQuery"`,
    /// `"InvalidOptions"` or `"NoTable"`.
    pub code: String,

    /// Human-readable failure reason, present when `code` is not `"Ok"`.
    pub message: Option<String>,

    /// `durations[i][j]` is the travel time in seconds from the i-th source to
    /// the j-th destination, or `None` when no route exists.
    pub durations: Option<Vec<Vec<Option<f64>>>>,
}

impl TableResponse {
    /// Whether the service reported success.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.code == "Ok"
    }
}
