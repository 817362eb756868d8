//! Routes through rides.
//!
//! Aggregates ordered rides with the total walking and queueing time.

use crate::Ride;

/// An ordered visit through rides with an overall duration in minutes.
///
/// # Examples
/// ```
/// use parkroute_core::{Ride, RideId, Route};
///
/// let ride = Ride::from_lat_lon(RideId::from("a"), "Alpha", 0.0, 0.0, 4)?;
/// let route = Route::new(vec![ride], 16.0);
///
/// assert_eq!(route.stops.len(), 1);
/// assert_eq!(route.total_minutes, 16.0);
/// # Ok::<(), parkroute_core::RideError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    /// Rides in visiting order.
    pub stops: Vec<Ride>,
    /// Total walking plus queueing time, unrounded.
    pub total_minutes: f64,
}

impl Route {
    /// Construct a route from rides and total minutes.
    #[must_use]
    pub const fn new(stops: Vec<Ride>, total_minutes: f64) -> Self {
        Self {
            stops,
            total_minutes,
        }
    }

    /// Construct an empty route.
    ///
    /// # Examples
    /// ```
    /// use parkroute_core::Route;
    ///
    /// let route = Route::empty();
    /// assert!(route.stops.is_empty());
    /// assert_eq!(route.total_minutes, 0.0);
    /// ```
    #[must_use]
    pub const fn empty() -> Self {
        Self::new(Vec::new(), 0.0)
    }

    /// Map a solved index order back onto the resolved rides.
    ///
    /// `order` holds positions in `rides`. An index outside `rides` is a
    /// solver bug: it trips a debug assertion and is skipped in release
    /// builds.
    ///
    /// # Examples
    /// ```
    /// use parkroute_core::{Ride, RideId, Route};
    ///
    /// let rides = vec![
    ///     Ride::from_lat_lon(RideId::from("a"), "Alpha", 0.0, 0.0, 5)?,
    ///     Ride::from_lat_lon(RideId::from("b"), "Bravo", 0.0, 0.001, 5)?,
    /// ];
    /// let route = Route::assemble(&rides, &[1, 0], 25.0);
    /// assert_eq!(route.stops[0].id, RideId::from("b"));
    /// # Ok::<(), parkroute_core::RideError>(())
    /// ```
    #[must_use]
    pub fn assemble(rides: &[Ride], order: &[usize], total_minutes: f64) -> Self {
        let stops = order
            .iter()
            .filter_map(|&idx| {
                let ride = rides.get(idx);
                if ride.is_none() {
                    log::error!("solved order references ride {idx} of {}", rides.len());
                    debug_assert!(false, "solved order references ride {idx} of {}", rides.len());
                }
                ride.cloned()
            })
            .collect();
        Self::new(stops, total_minutes)
    }

    /// Number of rides on the route.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stops.len()
    }

    /// Whether the route visits no rides.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }
}
