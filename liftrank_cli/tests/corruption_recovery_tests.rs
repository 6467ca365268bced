//! Corruption recovery tests for liftrank.
//!
//! These tests verify the system can handle:
//! - Corrupted rank snapshots
//! - Corrupted lines in the workout log
//! - Malformed or missing config and benchmark files

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::io::Write as IoWrite;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn cli() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("liftrank"))
}

fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

fn write_config(dir: &Path, extra: &str) -> PathBuf {
    let config_path = dir.join("config.toml");
    let contents = format!(
        "[data]\ndata_dir = {:?}\n\n[profile]\nbodyweight = 180.0\nsex = \"male\"\n{}",
        dir.join("data"),
        extra
    );
    fs::write(&config_path, contents).expect("Failed to write config");
    config_path
}

fn liftrank(dir: &Path) -> Command {
    let mut cmd = cli();
    cmd.arg("--config").arg(write_config(dir, ""));
    cmd
}

#[test]
fn test_corrupted_rank_snapshot() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("data");
    fs::create_dir_all(&data_dir).unwrap();

    fs::write(data_dir.join("rank.json"), "{ invalid json }}}}")
        .expect("Failed to write corrupted snapshot");

    // Falls back to an empty snapshot, so no rank up can be claimed
    liftrank(temp_dir.path())
        .args(["lift", "--exercise", "squat", "--weight", "315", "--reps", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rank up!").not());

    // The snapshot is rewritten with valid contents
    let snapshot = fs::read_to_string(data_dir.join("rank.json")).unwrap();
    assert!(snapshot.contains("\"overall_percentile\""));
}

#[test]
fn test_corrupted_workout_lines_skipped() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("data");

    liftrank(temp_dir.path())
        .args(["lift", "--exercise", "squat", "--weight", "315", "--reps", "5"])
        .assert()
        .success();

    // Simulate a torn write followed by garbage
    let mut file = fs::OpenOptions::new()
        .append(true)
        .open(data_dir.join("workouts.jsonl"))
        .unwrap();
    write!(file, "{{\"id\":\"0000").unwrap();
    writeln!(file).unwrap();
    writeln!(file, "not json at all").unwrap();
    drop(file);

    liftrank(temp_dir.path())
        .arg("score")
        .assert()
        .success()
        .stdout(predicate::str::contains("Overall: 87"));

    // Appends still work after the corrupt lines
    liftrank(temp_dir.path())
        .args(["lift", "--exercise", "deadlift", "--weight", "405", "--reps", "1"])
        .assert()
        .success();

    liftrank(temp_dir.path())
        .args(["stats", "--period", "all"])
        .assert()
        .success()
        .stdout(predicate::str::contains("all-time: 2 sets"));
}

#[test]
fn test_empty_workout_log() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("data");
    fs::create_dir_all(&data_dir).unwrap();
    fs::write(data_dir.join("workouts.jsonl"), "").unwrap();

    liftrank(temp_dir.path())
        .arg("score")
        .assert()
        .success()
        .stdout(predicate::str::contains("Overall: 0"));
}

#[test]
fn test_malformed_config_fails() {
    let temp_dir = setup_test_dir();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "[profile\nbodyweight = ").unwrap();

    cli()
        .arg("--config")
        .arg(&config_path)
        .arg("score")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Toml"));
}

#[test]
fn test_missing_config_file_fails() {
    let temp_dir = setup_test_dir();

    cli()
        .arg("--config")
        .arg(temp_dir.path().join("nope.toml"))
        .arg("score")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_invalid_bodyweight_rejected() {
    let temp_dir = setup_test_dir();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "[profile]\nbodyweight = 0.0\n").unwrap();

    cli()
        .arg("--config")
        .arg(&config_path)
        .arg("--data-dir")
        .arg(temp_dir.path().join("data"))
        .args(["lift", "--exercise", "squat", "--weight", "225", "--reps", "5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("bodyweight must be positive"));
}

#[test]
fn test_unknown_benchmark_schema_scores_nothing() {
    let temp_dir = setup_test_dir();
    let table_path = temp_dir.path().join("benchmarks.toml");
    fs::write(
        &table_path,
        "schema_version = 99\nversion = \"future\"\n",
    )
    .unwrap();

    let config_path = write_config(
        temp_dir.path(),
        &format!("\n[benchmarks]\npath = {:?}\n", table_path),
    );

    cli()
        .arg("--config")
        .arg(&config_path)
        .args(["lift", "--exercise", "squat", "--weight", "315", "--reps", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("no benchmark data"))
        .stdout(predicate::str::contains("Overall: 0"));
}

#[test]
fn test_malformed_benchmark_table_fails() {
    let temp_dir = setup_test_dir();
    let table_path = temp_dir.path().join("benchmarks.toml");
    fs::write(
        &table_path,
        concat!(
            "schema_version = 1\n",
            "version = \"broken\"\n",
            "[[exercises]]\n",
            "id = \"squat\"\n",
            "[[exercises.curves]]\n",
            "sex = \"male\"\n",
            "points = [[0.0, 2.0], [100.0, 1.0]]\n",
        ),
    )
    .unwrap();

    let config_path = write_config(
        temp_dir.path(),
        &format!("\n[benchmarks]\npath = {:?}\n", table_path),
    );

    cli()
        .arg("--config")
        .arg(&config_path)
        .arg("score")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration"));
}
