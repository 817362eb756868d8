//! JSON shapes exchanged with gateways.
//!
//! Field names follow the public contract: `orderedRides`,
//! `totalTimeMinutes`, `rideId`, `waitTime` and `error`.

use serde::{Deserialize, Serialize};

use crate::{Ride, RideId, Route};

/// Round minutes to one decimal place for display.
///
/// # Examples
/// ```
/// use parkroute_core::round_minutes;
///
/// assert_eq!(round_minutes(25.04), 25.0);
/// assert_eq!(round_minutes(25.05), 25.1);
/// ```
#[must_use]
pub fn round_minutes(minutes: f64) -> f64 {
    (minutes * 10.0).round() / 10.0
}

/// One ride in an [`OptimizeResponse`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderedRide {
    /// Store identifier.
    pub ride_id: RideId,
    /// Display name.
    pub name: String,
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
    /// Queue wait in minutes.
    pub wait_time: u32,
}

impl From<&Ride> for OrderedRide {
    fn from(ride: &Ride) -> Self {
        Self {
            ride_id: ride.id.clone(),
            name: ride.name.clone(),
            lat: ride.latitude(),
            lon: ride.longitude(),
            wait_time: ride.wait_minutes,
        }
    }
}

/// Successful optimizer response body.
///
/// # Examples
/// ```
/// use parkroute_core::{OptimizeResponse, Ride, RideId, Route};
///
/// let ride = Ride::from_lat_lon(RideId::from("a"), "Alpha", 1.0, 2.0, 4)?;
/// let body = OptimizeResponse::from(&Route::new(vec![ride], 16.04));
/// let json = serde_json::to_value(&body)?;
/// assert_eq!(json["totalTimeMinutes"], 16.0);
/// assert_eq!(json["orderedRides"][0]["rideId"], "a");
/// assert_eq!(json["orderedRides"][0]["waitTime"], 4);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeResponse {
    /// Rides in visiting order.
    pub ordered_rides: Vec<OrderedRide>,
    /// Total time rounded to one decimal.
    pub total_time_minutes: f64,
}

impl From<&Route> for OptimizeResponse {
    fn from(route: &Route) -> Self {
        Self {
            ordered_rides: route.stops.iter().map(OrderedRide::from).collect(),
            total_time_minutes: round_minutes(route.total_minutes),
        }
    }
}

/// Error response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable description.
    pub error: String,
}

impl ErrorBody {
    /// Wrap any displayable error.
    pub fn new(error: impl std::fmt::Display) -> Self {
        Self {
            error: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SolveError;
    use crate::test_support::ride;
    use rstest::rstest;

    #[rstest]
    #[case(16.0, 16.0)]
    #[case(24.99, 25.0)]
    #[case(12.345, 12.3)]
    #[case(0.0, 0.0)]
    fn rounds_to_one_decimal(#[case] minutes: f64, #[case] expected: f64) {
        assert!((round_minutes(minutes) - expected).abs() < 1e-9);
    }

    #[rstest]
    fn response_serialises_with_contract_names() {
        let route = Route::new(
            vec![ride("a", 33.81, -117.92, 5), ride("b", 33.82, -117.91, 10)],
            25.0,
        );
        let json = serde_json::to_value(OptimizeResponse::from(&route)).expect("serialise");
        assert_eq!(
            json,
            serde_json::json!({
                "orderedRides": [
                    {"rideId": "a", "name": "Ride a", "lat": 33.81, "lon": -117.92, "waitTime": 5},
                    {"rideId": "b", "name": "Ride b", "lat": 33.82, "lon": -117.91, "waitTime": 10}
                ],
                "totalTimeMinutes": 25.0
            })
        );
    }

    #[rstest]
    fn error_body_carries_the_message() {
        let body = ErrorBody::new(SolveError::Unreachable);
        let json = serde_json::to_string(&body).expect("serialise");
        assert_eq!(json, r#"{"error":"no walkable route visits every requested ride"}"#);
    }
}
