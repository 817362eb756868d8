//! Data access traits for ride metadata.
//!
//! The `RideStore` trait defines a read-only interface for resolving
//! [`Ride`] records by identifier. The optimizer consumes it to turn the
//! guest's requested ride ids into positions and wait times.

use std::collections::{HashMap, HashSet};

use crate::{Ride, RideId};

/// Read-only access to ride metadata.
///
/// # Examples
///
/// ```rust
/// use parkroute_core::{Ride, RideId, RideStore};
///
/// struct OneRide(Ride);
///
/// impl RideStore for OneRide {
///     fn get_ride(&self, id: &RideId) -> Option<Ride> {
///         (self.0.id == *id).then(|| self.0.clone())
///     }
///
///     fn rides(&self) -> Box<dyn Iterator<Item = Ride> + Send + '_> {
///         Box::new(std::iter::once(self.0.clone()))
///     }
/// }
///
/// let ride = Ride::from_lat_lon(RideId::from("a"), "Alpha", 0.0, 0.0, 5)?;
/// let store = OneRide(ride);
/// let lookup = store.lookup(&[RideId::from("a"), RideId::from("b")]);
/// assert_eq!(lookup.found.len(), 1);
/// assert_eq!(lookup.missing, vec![RideId::from("b")]);
/// # Ok::<(), parkroute_core::RideError>(())
/// ```
pub trait RideStore {
    /// Return the ride stored under `id`, if any.
    fn get_ride(&self, id: &RideId) -> Option<Ride>;

    /// Iterate over every ride in the store.
    fn rides(&self) -> Box<dyn Iterator<Item = Ride> + Send + '_>;

    /// Resolve `ids` in order, collecting every id that is not stored.
    fn lookup(&self, ids: &[RideId]) -> RideLookup {
        let mut lookup = RideLookup::default();
        for id in ids {
            match self.get_ride(id) {
                Some(ride) => lookup.found.push(ride),
                None => lookup.missing.push(id.clone()),
            }
        }
        lookup
    }
}

/// Outcome of [`RideStore::lookup`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RideLookup {
    /// Rides found, in request order.
    pub found: Vec<Ride>,
    /// Requested ids with no stored ride, in request order.
    pub missing: Vec<RideId>,
}

impl RideLookup {
    /// Whether every requested id resolved.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Outcome of [`resolve_ride_names`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct NameResolution {
    /// Ids of the rides whose names matched, in request order.
    pub ride_ids: Vec<RideId>,
    /// Names that matched no ride.
    pub missing_rides: Vec<String>,
}

/// Map display names to ride ids.
///
/// Names match exactly. When two rides share a name the first one yielded by
/// [`RideStore::rides`] wins. Repeated names resolve once.
///
/// # Examples
///
/// ```rust
/// use parkroute_core::{Ride, RideId, RideStore, resolve_ride_names};
///
/// struct Rides(Vec<Ride>);
///
/// impl RideStore for Rides {
///     fn get_ride(&self, id: &RideId) -> Option<Ride> {
///         self.0.iter().find(|ride| ride.id == *id).cloned()
///     }
///
///     fn rides(&self) -> Box<dyn Iterator<Item = Ride> + Send + '_> {
///         Box::new(self.0.iter().cloned())
///     }
/// }
///
/// let store = Rides(vec![
///     Ride::from_lat_lon(RideId::from("pp"), "Peter Pan's Flight", 33.81, -117.92, 40)?,
/// ]);
/// let resolution = resolve_ride_names(&store, &["Peter Pan's Flight", "Space Mountain"]);
/// assert_eq!(resolution.ride_ids, vec![RideId::from("pp")]);
/// assert_eq!(resolution.missing_rides, vec!["Space Mountain".to_owned()]);
/// # Ok::<(), parkroute_core::RideError>(())
/// ```
pub fn resolve_ride_names<S, N>(store: &S, names: &[N]) -> NameResolution
where
    S: RideStore + ?Sized,
    N: AsRef<str>,
{
    let mut by_name: HashMap<String, RideId> = HashMap::new();
    for ride in store.rides() {
        by_name.entry(ride.name).or_insert(ride.id);
    }
    log::debug!("resolving {} ride names against {} rides", names.len(), by_name.len());

    let mut seen = HashSet::new();
    let mut resolution = NameResolution::default();
    for name in names {
        let name = name.as_ref();
        if !seen.insert(name) {
            continue;
        }
        match by_name.get(name) {
            Some(id) => resolution.ride_ids.push(id.clone()),
            None => resolution.missing_rides.push(name.to_owned()),
        }
    }
    if !resolution.missing_rides.is_empty() {
        log::warn!("could not find ids for rides: {:?}", resolution.missing_rides);
    }
    resolution
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MemoryRideStore;
    use rstest::{fixture, rstest};

    #[fixture]
    fn store() -> MemoryRideStore {
        MemoryRideStore::with_rides([
            Ride::from_lat_lon(RideId::from("a"), "Alpha", 0.0, 0.0, 5).expect("ride"),
            Ride::from_lat_lon(RideId::from("b"), "Bravo", 0.0, 0.001, 10).expect("ride"),
            Ride::from_lat_lon(RideId::from("c"), "Alpha", 0.0, 0.002, 15).expect("ride"),
        ])
    }

    #[rstest]
    fn lookup_preserves_request_order(store: MemoryRideStore) {
        let lookup = store.lookup(&[RideId::from("b"), RideId::from("a")]);
        let ids: Vec<_> = lookup.found.iter().map(|ride| ride.id.as_str()).collect();
        assert_eq!(ids, ["b", "a"]);
        assert!(lookup.is_complete());
    }

    #[rstest]
    fn lookup_lists_every_missing_id(store: MemoryRideStore) {
        let lookup = store.lookup(&[
            RideId::from("x"),
            RideId::from("a"),
            RideId::from("y"),
        ]);
        assert_eq!(lookup.found.len(), 1);
        assert_eq!(lookup.missing, vec![RideId::from("x"), RideId::from("y")]);
    }

    #[rstest]
    fn names_resolve_to_first_matching_ride(store: MemoryRideStore) {
        let resolution = resolve_ride_names(&store, &["Alpha", "Bravo", "Alpha"]);
        assert_eq!(resolution.ride_ids, vec![RideId::from("a"), RideId::from("b")]);
        assert!(resolution.missing_rides.is_empty());
    }

    #[rstest]
    fn unknown_names_are_reported(store: MemoryRideStore) {
        let resolution = resolve_ride_names(&store, &["Zulu"]);
        assert!(resolution.ride_ids.is_empty());
        assert_eq!(resolution.missing_rides, vec!["Zulu".to_owned()]);
    }
}
