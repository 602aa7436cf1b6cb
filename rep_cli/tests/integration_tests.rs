//! Integration tests for the repcount binary.
//!
//! These tests verify end-to-end behavior including:
//! - Catalog listing
//! - Frame replay and feedback output
//! - Session logging and history
//! - Custom exercises from configuration

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Helper to create a test data directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// CLI command pinned to an empty config file inside `dir`
fn cli(dir: &Path) -> Command {
    let config_path = dir.join("config.toml");
    if !config_path.exists() {
        fs::write(&config_path, "").expect("Failed to write config");
    }
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("repcount"));
    cmd.arg("--config").arg(config_path).arg("--data-dir").arg(dir);
    cmd
}

fn curl_fixture() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/curl_angles.jsonl")
}

fn write_frames(dir: &Path, name: &str, lines: &[&str]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, lines.join("\n")).expect("Failed to write frames");
    path
}

#[test]
fn test_cli_help() {
    Command::new(assert_cmd::cargo::cargo_bin!("repcount"))
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Pose-based repetition counter"));
}

#[test]
fn test_exercises_lists_catalog() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .arg("exercises")
        .assert()
        .success()
        .stdout(predicate::str::contains("biceps_curl"))
        .stdout(predicate::str::contains("squat"))
        .stdout(predicate::str::contains("form check: rightShoulder > 45"));
}

#[test]
fn test_replay_counts_reps_and_logs_session() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .arg("replay")
        .arg(curl_fixture())
        .arg("--exercise")
        .arg("biceps_curl")
        .assert()
        .success()
        .stdout(predicate::str::contains("Biceps Curl"))
        .stdout(predicate::str::contains("Keep your elbow close to your body"))
        .stdout(predicate::str::contains("Reps: 1"))
        .stdout(predicate::str::contains("Form errors: 1"))
        .stdout(predicate::str::contains("Session logged"));

    let log = fs::read_to_string(temp_dir.path().join("sessions.jsonl"))
        .expect("Failed to read session log");
    assert_eq!(log.lines().count(), 1);
    assert!(log.contains("\"exercise_id\":\"biceps_curl\""));
}

#[test]
fn test_replay_json_summary() {
    let temp_dir = setup_test_dir();

    let output = cli(temp_dir.path())
        .arg("replay")
        .arg(curl_fixture())
        .arg("-e")
        .arg("biceps_curl")
        .arg("--json")
        .arg("--no-log")
        .output()
        .expect("Failed to run repcount");
    assert!(output.status.success());

    let summary: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(summary["reps"], 1);
    assert_eq!(summary["form_errors"], 1);
    assert_eq!(summary["frames_seen"], 8);
    assert_eq!(summary["frames_dropped"], 0);
}

#[test]
fn test_no_log_does_not_write() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .arg("replay")
        .arg(curl_fixture())
        .arg("--exercise")
        .arg("biceps_curl")
        .arg("--no-log")
        .assert()
        .success();

    assert!(!temp_dir.path().join("sessions.jsonl").exists());
}

#[test]
fn test_occluded_frames_are_counted_as_dropped() {
    let temp_dir = setup_test_dir();
    let frames = write_frames(
        temp_dir.path(),
        "squat.jsonl",
        &[
            r#"{"angles": {"rightKnee": 170}}"#,
            r#"{"angles": {}}"#,
            r#"{"angles": {"rightKnee": 80}}"#,
            r#"{"angles": {"leftKnee": 80}}"#,
            r#"{"angles": {"rightKnee": 170}}"#,
        ],
    );

    let output = cli(temp_dir.path())
        .arg("replay")
        .arg(frames)
        .arg("--exercise")
        .arg("squat")
        .arg("--json")
        .output()
        .expect("Failed to run repcount");
    assert!(output.status.success());

    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["reps"], 1);
    assert_eq!(summary["frames_dropped"], 2);
}

#[test]
fn test_replay_from_landmarks() {
    let temp_dir = setup_test_dir();

    // Right arm only; hip, shoulder and elbow stacked vertically
    let frame = |wrist: (f64, f64)| {
        let mut points = vec![r#"{"x": 0.0, "y": 0.0, "visibility": 0.0}"#.to_string(); 33];
        points[24] = r#"{"x": 0.5, "y": 0.8}"#.into();
        points[12] = r#"{"x": 0.5, "y": 0.4}"#.into();
        points[14] = r#"{"x": 0.5, "y": 0.6}"#.into();
        points[16] = format!(r#"{{"x": {}, "y": {}}}"#, wrist.0, wrist.1);
        format!(r#"{{"landmarks": [{}]}}"#, points.join(","))
    };
    let extended = frame((0.5, 0.8));
    let flexed = frame((0.55, 0.42));
    let frames = write_frames(
        temp_dir.path(),
        "landmarks.jsonl",
        &[
            extended.as_str(),
            flexed.as_str(),
            flexed.as_str(),
            extended.as_str(),
        ],
    );

    let output = cli(temp_dir.path())
        .arg("replay")
        .arg(frames)
        .arg("--exercise")
        .arg("biceps_curl")
        .arg("--json")
        .output()
        .expect("Failed to run repcount");
    assert!(output.status.success());

    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["reps"], 1);
    assert_eq!(summary["form_errors"], 0);
}

#[test]
fn test_unknown_exercise_fails() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .arg("replay")
        .arg(curl_fixture())
        .arg("--exercise")
        .arg("deadlift")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: Unknown exercise: deadlift"));
}

#[test]
fn test_malformed_frame_file_fails_with_line() {
    let temp_dir = setup_test_dir();
    let frames = write_frames(
        temp_dir.path(),
        "bad.jsonl",
        &[r#"{"angles": {"rightElbow": 170}}"#, "not json"],
    );

    cli(temp_dir.path())
        .arg("replay")
        .arg(frames)
        .arg("--exercise")
        .arg("biceps_curl")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Frame error at line 2"));

    assert!(!temp_dir.path().join("sessions.jsonl").exists());
}

#[test]
fn test_history_lists_newest_first() {
    let temp_dir = setup_test_dir();
    let squat = write_frames(
        temp_dir.path(),
        "squat.jsonl",
        &[r#"{"angles": {"rightKnee": 80}}"#, r#"{"angles": {"rightKnee": 170}}"#],
    );

    cli(temp_dir.path())
        .args(["replay", "--exercise", "biceps_curl"])
        .arg(curl_fixture())
        .assert()
        .success();
    cli(temp_dir.path())
        .args(["replay", "--exercise", "squat"])
        .arg(squat)
        .assert()
        .success();

    let output = cli(temp_dir.path())
        .arg("history")
        .output()
        .expect("Failed to run repcount");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<_> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("squat"));
    assert!(lines[1].contains("biceps_curl"));

    cli(temp_dir.path())
        .args(["history", "--limit", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("squat"))
        .stdout(predicate::str::contains("biceps_curl").not());
}

#[test]
fn test_history_empty() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .arg("history")
        .assert()
        .success()
        .stdout(predicate::str::contains("No sessions logged yet."));
}

#[test]
fn test_custom_exercise_from_config() {
    let temp_dir = setup_test_dir();
    fs::write(
        temp_dir.path().join("config.toml"),
        r#"
[[exercises]]
id = "leg_curl"
name = "Leg Curl"

[exercises.profile]
primary_joint = "leftKnee"
flexed_threshold = 70.0
extended_threshold = 150.0

[exercises.cues]
flexed = "Squeeze"
"#,
    )
    .unwrap();
    let frames = write_frames(
        temp_dir.path(),
        "leg_curl.jsonl",
        &[r#"{"angles": {"leftKnee": 160}}"#, r#"{"angles": {"leftKnee": 60}}"#],
    );

    cli(temp_dir.path())
        .arg("exercises")
        .assert()
        .success()
        .stdout(predicate::str::contains("leg_curl"));

    cli(temp_dir.path())
        .args(["replay", "--no-log", "--exercise", "leg_curl"])
        .arg(frames)
        .assert()
        .success()
        .stdout(predicate::str::contains("Squeeze"))
        .stdout(predicate::str::contains("Reps: 0"));
}

#[test]
fn test_invalid_custom_exercise_is_rejected() {
    let temp_dir = setup_test_dir();
    fs::write(
        temp_dir.path().join("config.toml"),
        r#"
[[exercises]]
id = "broken"
name = "Broken"

[exercises.profile]
primary_joint = "leftKnee"
flexed_threshold = 150.0
extended_threshold = 70.0
"#,
    )
    .unwrap();

    cli(temp_dir.path())
        .arg("exercises")
        .assert()
        .failure()
        .stderr(predicate::str::contains("flexed threshold"));
}
