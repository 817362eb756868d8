#![expect(
    clippy::expect_used,
    reason = "behaviour tests use expect for readable failures"
)]

//! Behavioural tests replaying golden routes through the exact solver.


use std::cell::RefCell;

use parkroute_core::{RideId, SolveResponse, Solver};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

use golden_routes_support::{GoldenRoute, load_golden_route};

/// World state for golden route BDD scenarios.
#[derive(Debug, Default)]
struct GoldenRouteWorld {
    golden: RefCell<Option<GoldenRoute>>,
    response: RefCell<Option<SolveResponse>>,
}

#[fixture]
fn world() -> GoldenRouteWorld {
    GoldenRouteWorld::default()
}

#[given("a golden route {name:word}")]
fn given_golden_route(world: &GoldenRouteWorld, name: String) {
    // Gherkin quotes may be captured with the file name.
    let clean_name = name.trim_matches('"');
    world.golden.replace(Some(load_golden_route(clean_name)));
}

#[when("the exact solver solves the golden route")]
fn when_solver_runs(world: &GoldenRouteWorld) {
    let borrowed_golden = world.golden.borrow();
    let golden_ref = borrowed_golden
        .as_ref()
        .expect("golden route should be loaded");
    let fixture = golden_ref.fixture();
    let response = fixture
        .solver()
        .solve(&fixture.request())
        .expect("solve should succeed");
    world.response.replace(Some(response));
}

#[then("the rides are visited in the expected order")]
fn then_order_matches(world: &GoldenRouteWorld) {
    let borrowed_golden = world.golden.borrow();
    let golden_ref = borrowed_golden
        .as_ref()
        .expect("golden route should be loaded");
    let borrowed_response = world.response.borrow();
    let response_ref = borrowed_response
        .as_ref()
        .expect("response should be recorded");

    let actual: Vec<RideId> = response_ref
        .route
        .stops
        .iter()
        .map(|ride| ride.id.clone())
        .collect();
    assert_eq!(actual, golden_ref.expected_ids());
}

#[then("the total time matches the expected minutes")]
#[expect(clippy::float_arithmetic, reason = "tolerance comparison")]
fn then_total_matches(world: &GoldenRouteWorld) {
    let borrowed_golden = world.golden.borrow();
    let golden_ref = borrowed_golden
        .as_ref()
        .expect("golden route should be loaded");
    let borrowed_response = world.response.borrow();
    let response_ref = borrowed_response
        .as_ref()
        .expect("response should be recorded");

    let delta = response_ref.route.total_minutes - golden_ref.expected.total_minutes;
    assert!(
        delta.abs() < 1e-6,
        "total {} differs from {}",
        response_ref.route.total_minutes,
        golden_ref.expected.total_minutes
    );
}

#[scenario(path = "tests/features/golden_routes.feature", index = 0)]
fn asymmetric_layout(world: GoldenRouteWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/golden_routes.feature", index = 1)]
fn closed_walkways(world: GoldenRouteWorld) {
    let _ = world;
}
