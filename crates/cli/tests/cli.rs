use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;

const BODIES: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../configs/bodies");

fn bin(name: &str, store: &Path) -> Command {
    let mut cmd = Command::cargo_bin(name).expect("binary built");
    cmd.env_remove("GEMINI_API_KEY")
        .env("RUST_LOG", "warn")
        .args(["--bodies", BODIES, "--store"])
        .arg(store);
    cmd
}

fn stdout_json(cmd: &mut Command) -> Value {
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).expect("json on stdout")
}

#[test]
fn orbit_track_defaults_to_low_earth_orbit() {
    let dir = tempfile::tempdir().unwrap();
    let track = stdout_json(&mut bin("orbit_track", dir.path()));
    let points = track.as_array().unwrap();
    assert_eq!(points.len(), 200);
    let first = points[0]["distance"].as_f64().unwrap();
    let last = points[199]["distance"].as_f64().unwrap();
    assert!((first - 6_871.0).abs() < 1e-6, "{first}");
    assert!((last - first).abs() < 1e-6);
}

#[test]
fn orbit_track_rejects_unknown_body() {
    let dir = tempfile::tempdir().unwrap();
    bin("orbit_track", dir.path())
        .args(["--body", "pluto"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("earth, mars and sun"));
}

#[test]
fn simulate_store_retrieve_export_and_summarize() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("trajectories");

    let summary = stdout_json(bin("simulate", &store).args([
        "--target",
        "2I/Borisov",
        "--epoch-jd",
        "2458765.5",
        "--swarm-size",
        "12",
        "--role-split",
        "balanced",
        "--propulsion",
        "chemical",
    ]));
    let id = summary["mission_id"].as_str().unwrap().to_string();
    assert!(id.starts_with("mission_"));
    assert_eq!(summary["point_count"], 100);
    assert!(store.join(format!("{id}.json")).exists());

    bin("missions", &store)
        .assert()
        .success()
        .stdout(predicate::str::contains(id.as_str()));

    let record = stdout_json(bin("trajectory", &store).arg(&id).args(["--sample", "3"]));
    assert_eq!(record["parameters"]["target_name"], "2I/Borisov");
    assert_eq!(record["trajectory"].as_array().unwrap().len(), 100);
    assert_eq!(record["trajectory"][0]["datetime"], "2019-10-09T00:00:00Z");

    // At the default filter the leading points are echoed on stderr.
    let echoed = bin("trajectory", &store)
        .env_remove("RUST_LOG")
        .arg(&id)
        .args(["--sample", "2"])
        .assert()
        .success()
        .get_output()
        .stderr
        .clone();
    let echoed = String::from_utf8_lossy(&echoed);
    assert_eq!(echoed.matches("trajectory sample").count(), 2, "{echoed}");

    let csv_path = dir.path().join("export").join("borisov.csv");
    bin("trajectory", &store)
        .arg(&id)
        .arg("--export")
        .arg(&csv_path)
        .assert()
        .success();
    let csv = fs::read_to_string(&csv_path).unwrap();
    assert!(csv.starts_with("datetime,x,y,z,vx,vy,vz,distance,source\n"));
    assert_eq!(csv.lines().count(), 101);

    let insights = stdout_json(bin("insights", &store).arg(&id));
    assert_eq!(
        insights["insights"],
        "[Fallback] AI unavailable. Keep delta-v optimized. Monitor fuel and trajectory."
    );
}

#[test]
fn simulate_rejects_bad_input() {
    let dir = tempfile::tempdir().unwrap();
    bin("simulate", dir.path())
        .args(["--target", "Vulcan", "--epoch-jd", "2458765.5", "--swarm-size", "3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown body"));

    bin("simulate", dir.path())
        .args(["--target", "MARS", "--epoch-jd", "2458765.5", "--swarm-size", "-2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("swarm size must be positive"));

    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn unknown_mission_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    bin("trajectory", dir.path())
        .arg("mission_20000101_000000_000")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}
