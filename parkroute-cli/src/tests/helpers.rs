//! Test helpers for laying out request and catalogue files.

use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use tempfile::TempDir;

pub(super) const CATALOGUE: &str = r#"[
    {"rideId": "A", "name": "Astro Orbitor", "lat": 33.8125, "lon": -117.9185, "waitTime": 5},
    {"rideId": "B", "name": "Big Thunder Mountain", "lat": 33.8130, "lon": -117.9180, "waitTime": 10}
]"#;

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    fs::write(path, contents).unwrap_or_else(|err| panic!("write {path}: {err}"));
}

/// Temporary directory holding `request.json` and `rides.json`.
pub(super) struct Workspace {
    _dir: TempDir,
    pub(super) root: Utf8PathBuf,
    pub(super) request: Utf8PathBuf,
    pub(super) catalogue: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        let request = root.join("request.json");
        let catalogue = root.join("rides.json");
        Self {
            _dir: dir,
            root,
            request,
            catalogue,
        }
    }

    pub(super) fn with_catalogue(self) -> Self {
        write_utf8(&self.catalogue, CATALOGUE.as_bytes());
        self
    }

    pub(super) fn write_request(&self, ride_ids: &[&str]) {
        let payload = serde_json::json!({
            "latitude": 33.8121,
            "longitude": -117.9190,
            "rideIds": ride_ids,
        });
        write_utf8(&self.request, payload.to_string().as_bytes());
    }
}
