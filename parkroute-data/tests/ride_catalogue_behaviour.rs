//! Behavioural tests for loading a [`RideCatalogue`] from disk.

use std::cell::RefCell;
use std::io::Write;

use camino::Utf8Path;
use parkroute_core::{NameResolution, RideId, RideStore, resolve_ride_names};
use parkroute_data::{CatalogueError, RideCatalogue};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tempfile::NamedTempFile;

const PARK: &str = r#"[
    {"rideId": "pirates", "name": "Pirates of the Caribbean", "lat": 33.8113, "lon": -117.9209, "waitTime": 35},
    {"rideId": "autopia", "name": "Autopia", "lat": 33.8145, "lon": -117.9166},
    {"rideId": "matterhorn", "name": "Matterhorn Bobsleds", "lat": 33.8131, "lon": -117.9180, "waitTime": 50}
]"#;

const DUPLICATED: &str = r#"[
    {"rideId": "pirates", "name": "Pirates of the Caribbean", "lat": 33.8113, "lon": -117.9209, "waitTime": 35},
    {"rideId": "pirates", "name": "Pirates again", "lat": 33.8113, "lon": -117.9209, "waitTime": 5}
]"#;

#[derive(Default)]
struct CatalogueWorld {
    file: RefCell<Option<NamedTempFile>>,
    loaded: RefCell<Option<Result<RideCatalogue, CatalogueError>>>,
    resolution: RefCell<NameResolution>,
}

#[fixture]
fn world() -> CatalogueWorld {
    CatalogueWorld::default()
}

impl CatalogueWorld {
    fn write(&self, content: &str) {
        let mut file = tempfile::Builder::new()
            .suffix(".json")
            .tempfile()
            .expect("temp file");
        file.write_all(content.as_bytes()).expect("write catalogue");
        self.file.replace(Some(file));
    }

    fn catalogue(&self) -> RideCatalogue {
        match self.loaded.borrow().as_ref().expect("catalogue was loaded") {
            Ok(catalogue) => catalogue.clone(),
            Err(err) => panic!("expected a catalogue, got {err:?}"),
        }
    }
}

#[given("a catalogue file listing pirates, autopia and matterhorn")]
fn given_park(world: &CatalogueWorld) {
    world.write(PARK);
}

#[given("a catalogue file listing pirates twice")]
fn given_duplicates(world: &CatalogueWorld) {
    world.write(DUPLICATED);
}

#[when("I load the catalogue")]
fn when_load(world: &CatalogueWorld) {
    let file = world.file.borrow();
    let path = file.as_ref().expect("catalogue file was written").path();
    let path = Utf8Path::from_path(path).expect("utf-8 temp path");
    world.loaded.replace(Some(RideCatalogue::load(path)));
}

#[when("I resolve the names Autopia and Dumbo")]
fn when_resolve(world: &CatalogueWorld) {
    let resolution = resolve_ride_names(&world.catalogue(), &["Autopia", "Dumbo"]);
    world.resolution.replace(resolution);
}

#[then("the catalogue holds {count} rides")]
fn then_count(world: &CatalogueWorld, count: usize) {
    assert_eq!(world.catalogue().len(), count);
}

#[then("ride {id:word} waits {minutes} minutes")]
fn then_wait(world: &CatalogueWorld, id: String, minutes: u32) {
    let ride = world
        .catalogue()
        .get_ride(&RideId::from(id))
        .expect("ride should be stored");
    assert_eq!(ride.wait_minutes, minutes);
}

#[then("loading fails because {id:word} is duplicated")]
fn then_duplicate(world: &CatalogueWorld, id: String) {
    let loaded = world.loaded.borrow();
    match loaded.as_ref().expect("catalogue was loaded") {
        Err(CatalogueError::DuplicateId { id: duplicated }) => {
            assert_eq!(duplicated.as_str(), id);
        }
        other => panic!("expected a duplicate id error, got {other:?}"),
    }
}

#[then("the resolved ids are {id:word}")]
fn then_resolved(world: &CatalogueWorld, id: String) {
    assert_eq!(world.resolution.borrow().ride_ids, vec![RideId::from(id)]);
}

#[then("the unmatched names are {name:word}")]
fn then_unmatched(world: &CatalogueWorld, name: String) {
    assert_eq!(world.resolution.borrow().missing_rides, vec![name]);
}

#[scenario(path = "tests/features/ride_catalogue.feature", index = 0)]
fn loading_a_catalogue(world: CatalogueWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/ride_catalogue.feature", index = 1)]
fn duplicate_ids_are_rejected(world: CatalogueWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/ride_catalogue.feature", index = 2)]
fn names_resolve(world: CatalogueWorld) {
    let _ = world;
}
