//! `wiremock` stand-in for the OSRM Table service.
//!
//! Locations are placed at `lon = index, lat = 0`, so the mock can recover
//! each coordinate's index from the URL and answer with a deterministic
//! table: one minute of walking per index step.

use std::collections::HashSet;

use serde_json::{Value, json};
use tokio::runtime::Runtime;
use wiremock::matchers::{method, path_regex};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// A running mock OSRM server.
///
/// The provider under test owns its own runtime, so the server is driven
/// from a separate one here.
pub struct OsrmMock {
    server: MockServer,
    runtime: Runtime,
}

impl OsrmMock {
    /// Answer every table request with `responder`.
    pub fn start(responder: impl Respond + 'static) -> Self {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("mock runtime");
        let server = runtime.block_on(async {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path_regex(r"^/table/v1/walking/"))
                .respond_with(responder)
                .mount(&server)
                .await;
            server
        });
        Self { server, runtime }
    }

    /// Answer with walking times, leaving pairs touching `closed` unroutable.
    pub fn walking(closed: HashSet<usize>) -> Self {
        Self::start(move |request: &Request| {
            ResponseTemplate::new(200).set_body_json(walking_table(request, &closed))
        })
    }

    /// Answer every request with `status` and a JSON `body`.
    pub fn replying(status: u16, body: Value) -> Self {
        Self::start(ResponseTemplate::new(status).set_body_json(body))
    }

    /// Base URL to configure the provider with.
    pub fn base_url(&self) -> String {
        self.server.uri()
    }

    /// Paths of the requests received so far.
    pub fn request_paths(&self) -> Vec<String> {
        self.runtime
            .block_on(self.server.received_requests())
            .unwrap_or_default()
            .iter()
            .map(|request| request.url.path().to_owned())
            .collect()
    }
}

fn walking_table(request: &Request, closed: &HashSet<usize>) -> Value {
    let coords = request.url.path().rsplit('/').next().unwrap_or_default();
    let indices: Vec<usize> = coords
        .split(';')
        .map(|pair| {
            let lon = pair.split(',').next().unwrap_or_default();
            lon.parse::<f64>().expect("numeric longitude") as usize
        })
        .collect();

    let mut sources: Vec<usize> = (0..indices.len()).collect();
    let mut destinations = sources.clone();
    for (key, value) in request.url.query_pairs() {
        let positions: Vec<usize> = value
            .split(';')
            .map(|idx| idx.parse().expect("numeric index"))
            .collect();
        match key.as_ref() {
            "sources" => sources = positions,
            "destinations" => destinations = positions,
            other => panic!("unexpected query parameter {other}"),
        }
    }

    let durations: Vec<Vec<Option<f64>>> = sources
        .iter()
        .map(|&src| {
            destinations
                .iter()
                .map(|&dst| {
                    let (from, to) = (indices[src], indices[dst]);
                    if from != to && (closed.contains(&from) || closed.contains(&to)) {
                        None
                    } else {
                        Some(60.0 * from.abs_diff(to) as f64)
                    }
                })
                .collect()
        })
        .collect();
    json!({ "code": "Ok", "durations": durations })
}
