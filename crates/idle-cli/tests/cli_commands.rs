//! Integration tests for the `idle` CLI commands.

#![allow(deprecated)] // Command::cargo_bin – macro replacement not yet stable

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn idle() -> Command {
    Command::cargo_bin("idle").unwrap()
}

fn simulate_json(args: &[&str]) -> serde_json::Value {
    let output = idle()
        .args(["simulate", "--json"])
        .args(args)
        .output()
        .unwrap();
    assert!(output.status.success());
    serde_json::from_slice(&output.stdout).unwrap()
}

// ---------------------------------------------------------------------------
// normalize
// ---------------------------------------------------------------------------

#[test]
fn normalize_shows_groups() {
    idle()
        .args(["normalize", "950", "1000", "263"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("snapped")
                .and(predicate::str::contains("canonical"))
                .and(predicate::str::contains("rounded"))
                .and(predicate::str::contains("share 2 host timer(s)")),
        );
}

#[test]
fn normalize_requires_an_interval() {
    idle().arg("normalize").assert().failure();
}

// ---------------------------------------------------------------------------
// simulate
// ---------------------------------------------------------------------------

#[test]
fn simulate_prints_tables() {
    idle()
        .args(["simulate", "-n", "5"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Production Sources")
                .and(predicate::str::contains("Timer Groups"))
                .and(predicate::str::contains("loop:passive"))
                .and(predicate::str::contains("tick")),
        );
}

#[test]
fn simulate_verbose_lists_systems() {
    idle()
        .args(["simulate", "-n", "2", "--verbose"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("combo")
                .and(predicate::str::contains("multiplier"))
                .and(predicate::str::contains("frenzy")),
        );
}

#[test]
fn simulate_is_deterministic_for_a_seed() {
    let a = simulate_json(&["-n", "20", "--seed", "7"]);
    let b = simulate_json(&["-n", "20", "--seed", "7"]);
    assert_eq!(a["clicks"], b["clicks"]);
    assert_eq!(a["economy"]["resources"], b["economy"]["resources"]);
    assert_eq!(a["purchases"], b["purchases"]);
}

#[test]
fn simulate_consolidates_timers() {
    let report = simulate_json(&["-n", "3"]);
    let timers = &report["timers"];
    // loop:passive + tick share 100ms; loop:hybrid + sps-sampler share 1000ms.
    assert_eq!(timers["total_timers"], 5);
    assert_eq!(timers["master_timers"], 3);
    assert_eq!(timers["live_host_timers"], 3);
    assert_eq!(timers["failures"], 0);
}

#[test]
fn simulate_without_clicks_earns_nothing() {
    let report = simulate_json(&["-n", "10", "--clicks-per-second", "0"]);
    assert_eq!(report["clicks"], 0);
    assert_eq!(report["economy"]["resources"], 0.0);
}

#[test]
fn simulate_reads_a_config_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("idle.json");
    fs::write(
        &path,
        r#"{
    "click_value": 100.0,
    "sources": [ { "name": "well", "base_rate": 2.0, "price": 10.0 } ],
    "loops": { "hybrid_interval_ms": 5000 }
}"#,
    )
    .unwrap();

    let report = simulate_json(&["-n", "5", "--config", path.to_str().unwrap()]);
    let sources = report["economy"]["sources"].as_array().unwrap();
    assert_eq!(sources.len(), 1);
    assert_eq!(sources[0]["name"], "well");
    assert!(sources[0]["owned"].as_u64().unwrap() > 0);
}

#[test]
fn simulate_rejects_a_bad_config() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("idle.json");
    fs::write(&path, "{ not json").unwrap();

    idle()
        .args(["simulate", "--config", path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid config"));
}
