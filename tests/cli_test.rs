//! CLI tests for the trip utilities

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Command isolated in `dir`: config, trip file and logs all live there
fn roadtrip(dir: &Path) -> Command {
    let config = dir.join("roadtrip.yml");
    if !config.exists() {
        let yaml = format!(
            "chat:\n  currency: SEK\nstorage:\n  state-file: {}\n",
            dir.join("trip.json").display()
        );
        fs::write(&config, yaml).unwrap();
    }

    let mut cmd = Command::cargo_bin("roadtrip").unwrap();
    cmd.current_dir(dir)
        .env("HOME", dir)
        .env("XDG_DATA_HOME", dir.join("data"))
        .env("XDG_CONFIG_HOME", dir.join("config"))
        .arg("-c")
        .arg(&config);
    cmd
}

const STORED_TRIP: &str = r#"{
  "metadata": {"name": "Nordic Loop", "travelers": 2},
  "stops": [
    {"id": "s1", "name": "Oslo", "coordinates": {"lat": 59.91, "lng": 10.75}, "nights": 2},
    {"id": "s2", "name": "Göteborg", "coordinates": {"lat": 57.71, "lng": 11.97}}
  ],
  "route_segments": [{"from_stop_id": "s1", "to_stop_id": "s2", "distance_km": 290.0}]
}"#;

#[test]
fn test_help() {
    let dir = TempDir::new().unwrap();
    roadtrip(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("chat"))
        .stdout(predicate::str::contains("places"));
}

#[test]
fn test_tools_lists_schemas_in_configured_currency() {
    let dir = TempDir::new().unwrap();
    let output = roadtrip(dir.path()).arg("tools").assert().success().get_output().stdout.clone();

    let schemas: serde_json::Value = serde_json::from_slice(&output).unwrap();
    let names: Vec<&str> = schemas
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    for expected in ["set_route", "add_stop", "remove_stop", "update_stop", "reorder_stops", "update_trip"] {
        assert!(names.contains(&expected), "missing {}", expected);
    }
    assert!(String::from_utf8_lossy(&output).contains("SEK"));
}

#[test]
fn test_show_without_trip() {
    let dir = TempDir::new().unwrap();
    roadtrip(dir.path())
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("No trip planned yet."));
}

#[test]
fn test_show_text_and_json() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("trip.json"), STORED_TRIP).unwrap();

    roadtrip(dir.path())
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("Nordic Loop"))
        .stdout(predicate::str::contains("1. Oslo (2 nights)"))
        .stdout(predicate::str::contains("2. Göteborg (1 night)"));

    let output = roadtrip(dir.path())
        .args(["show", "--format", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let doc: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(doc["stops"][1]["name"], "Göteborg");
    // Segments are re-derived, never restored from storage
    assert_eq!(doc["route_segments"], serde_json::json!([]));
}

#[test]
fn test_invalid_stored_trip_is_ignored() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("trip.json"), r#"{"stops": "not a list"}"#).unwrap();

    roadtrip(dir.path())
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("No trip planned yet."));
}

#[test]
fn test_reset_deletes_trip() {
    let dir = TempDir::new().unwrap();
    let trip = dir.path().join("trip.json");
    fs::write(&trip, STORED_TRIP).unwrap();

    roadtrip(dir.path())
        .arg("reset")
        .assert()
        .success()
        .stdout(predicate::str::contains("Trip cleared."));
    assert!(!trip.exists());

    // Resetting again is fine
    roadtrip(dir.path()).arg("reset").assert().success();
}

#[test]
fn test_places_without_key() {
    let dir = TempDir::new().unwrap();
    roadtrip(dir.path())
        .env_remove("GOOGLE_PLACES_API_KEY")
        .args(["places", "--lat", "52.52", "--lng", "13.40"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No places found."))
        .stderr(predicate::str::contains("GOOGLE_PLACES_API_KEY"));
}
