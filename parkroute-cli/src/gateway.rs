//! Request/response adapter shared by every front door.
//!
//! [`handle_request`] takes the raw JSON a gateway received, runs the solver
//! and returns the HTTP-style status plus the JSON body to send back. It
//! accepts either the bare request object or an API-gateway proxy envelope
//! whose `body` field holds the request as a JSON string.

use parkroute_core::{ErrorBody, ErrorClass, OptimizeResponse, SolveError, SolveRequest, Solver};
use serde::Serialize;
use serde_json::Value;

/// Status code for a successful optimization.
pub const STATUS_OK: u16 = 200;

/// Prefix on every server-class error message.
pub const SERVER_ERROR_PREFIX: &str = "Internal server error: ";

/// Status plus serialised JSON body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GatewayResponse {
    /// HTTP-style status code.
    #[serde(rename = "statusCode")]
    pub status: u16,
    /// JSON text of an `OptimizeResponse` or an `ErrorBody`.
    pub body: String,
}

impl GatewayResponse {
    fn json(status: u16, body: &impl Serialize) -> Self {
        match serde_json::to_string(body) {
            Ok(body) => Self { status, body },
            Err(err) => {
                log::error!("failed to serialise gateway body: {err}");
                Self {
                    status: ErrorClass::Server.status_code(),
                    body: r#"{"error":"Internal server error: unserialisable response"}"#
                        .to_owned(),
                }
            }
        }
    }

    fn error(class: ErrorClass, message: impl std::fmt::Display) -> Self {
        let body = match class {
            ErrorClass::Client => ErrorBody::new(message),
            ErrorClass::Server => ErrorBody::new(format_args!("{SERVER_ERROR_PREFIX}{message}")),
        };
        Self::json(class.status_code(), &body)
    }

    /// Whether the request succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status == STATUS_OK
    }

    /// Error class implied by the status, `None` on success.
    #[must_use]
    pub const fn class(&self) -> Option<ErrorClass> {
        match self.status {
            STATUS_OK => None,
            400..=499 => Some(ErrorClass::Client),
            _ => Some(ErrorClass::Server),
        }
    }
}

/// Decode the request, solve it and shape the reply.
///
/// Malformed JSON and every [`SolveError`] are folded into the response;
/// this function never fails.
///
/// # Examples
/// ```
/// use parkroute_cli::gateway::handle_request;
/// use parkroute_core::test_support::{FixedTravelTimeProvider, MemoryRideStore, ride};
/// use parkroute_solver_exact::ExactRouteSolver;
///
/// let solver = ExactRouteSolver::new(
///     MemoryRideStore::with_rides([ride("a", 33.812, -117.918, 4)]),
///     FixedTravelTimeProvider::from_seconds(vec![vec![0, 720], vec![720, 0]]),
/// );
/// let reply = handle_request(
///     &solver,
///     r#"{"latitude": 33.8121, "longitude": -117.919, "rideIds": ["a"]}"#,
/// );
/// assert_eq!(reply.status, 200);
/// assert!(reply.body.contains(r#""totalTimeMinutes":16.0"#));
/// ```
pub fn handle_request(solver: &dyn Solver, payload: &str) -> GatewayResponse {
    let request = match decode_request(payload) {
        Ok(request) => request,
        Err(err) => {
            log::debug!("rejecting undecodable request: {err}");
            return GatewayResponse::error(
                ErrorClass::Client,
                format_args!("invalid request body: {err}"),
            );
        }
    };

    match solver.solve(&request) {
        Ok(response) => GatewayResponse::json(STATUS_OK, &OptimizeResponse::from(&response.route)),
        Err(err) => solve_failure(&err),
    }
}

fn solve_failure(err: &SolveError) -> GatewayResponse {
    let class = err.class();
    match class {
        ErrorClass::Client => log::debug!("request rejected: {err}"),
        ErrorClass::Server => log::warn!("optimization failed: {err}"),
    }
    GatewayResponse::error(class, err)
}

/// Parse a bare request or unwrap a proxy envelope.
fn decode_request(payload: &str) -> Result<SolveRequest, serde_json::Error> {
    let value: Value = serde_json::from_str(payload)?;
    match value {
        Value::Object(mut fields) if fields.contains_key("body") => {
            match fields.remove("body").unwrap_or(Value::Null) {
                Value::String(inner) => serde_json::from_str(&inner),
                other => serde_json::from_value(other),
            }
        }
        other => serde_json::from_value(other),
    }
}
