use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn telemetry() -> Command {
    Command::cargo_bin("telemetry").unwrap()
}

fn json_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

// =============================================================================
// GENERAL
// =============================================================================

#[test]
fn test_no_args_shows_help() {
    telemetry()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn test_version_flag() {
    telemetry()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("telemetry"));
}

#[test]
fn test_help_flag() {
    telemetry()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("analytics"));
}

// =============================================================================
// TASKS SUBCOMMAND
// =============================================================================

#[test]
fn test_tasks_subcommand() {
    telemetry()
        .arg("tasks")
        .assert()
        .success()
        .stdout(predicate::str::contains("detectAnomalies"))
        .stdout(predicate::str::contains("calculateStats"))
        .stdout(predicate::str::contains("correlate"));
}

#[test]
fn test_tasks_json() {
    let output = telemetry().args(["tasks", "--json"]).output().unwrap();
    assert!(output.status.success());
    let tasks = stdout_json(&output);
    assert_eq!(tasks.as_array().unwrap().len(), 8);
    assert_eq!(tasks[0]["name"], "decimate");
}

// =============================================================================
// ANALYZE SUBCOMMAND
// =============================================================================

#[test]
fn test_analyze_single_request_from_stdin() {
    let output = telemetry()
        .args(["analyze", "--compact"])
        .write_stdin(
            r#"{"id": "a1", "task": "aggregate", "data": {"data": [1, 2, 3, 4, 5, 6], "windowSize": 3, "method": "mean"}}"#,
        )
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        stdout_json(&output),
        serde_json::json!({"id": "a1", "result": [2.0, 5.0]})
    );
}

#[test]
fn test_analyze_batch_with_error_exits_3() {
    let requests = json_file(
        r#"[
            {"id": "ok", "task": "fft", "data": {"data": [1, 0, -1, 0]}},
            {"id": "bad", "task": "bogus", "data": {}}
        ]"#,
    );

    let output = telemetry()
        .args(["analyze", "--input"])
        .arg(requests.path())
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(3));
    let responses = stdout_json(&output);
    assert_eq!(responses[0]["id"], "ok");
    assert!(responses[0]["result"]["magnitudes"].is_array());
    assert_eq!(responses[1]["error"], "Unknown task: bogus");
}

#[test]
fn test_analyze_writes_output_file() {
    let out = NamedTempFile::new().unwrap();
    telemetry()
        .args(["analyze", "--output"])
        .arg(out.path())
        .write_stdin(r#"[{"id": "s", "task": "smooth", "data": {"data": [1, 2, 3], "windowSize": 3}}]"#)
        .assert()
        .success();

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(out.path()).unwrap()).unwrap();
    assert_eq!(written[0]["result"], serde_json::json!([1.5, 2.0, 2.5]));
}

#[test]
fn test_analyze_malformed_input_exits_2() {
    telemetry()
        .arg("analyze")
        .write_stdin("{ not json")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_analyze_missing_file_exits_2() {
    telemetry()
        .args(["analyze", "--input", "/nonexistent/requests.json"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Failed to read input file"));
}

// =============================================================================
// REPLAY SUBCOMMAND
// =============================================================================

fn sample_file() -> NamedTempFile {
    let samples: Vec<serde_json::Value> = (0..20)
        .rev()
        .map(|t| serde_json::json!({"timestamp": t * 100, "value": t as f64}))
        .collect();
    json_file(&serde_json::to_string(&samples).unwrap())
}

#[test]
fn test_replay_statistics() {
    let samples = sample_file();
    let output = telemetry()
        .args(["replay", "--capacity", "5", "--latest", "2", "--input"])
        .arg(samples.path())
        .output()
        .unwrap();

    assert!(output.status.success());
    let report = stdout_json(&output);
    assert_eq!(report["ingested"], 20);
    assert_eq!(report["statistics"]["count"], 5);
    assert_eq!(report["latest"].as_array().unwrap().len(), 2);
    assert!(report.get("buckets").is_none());
}

#[test]
fn test_replay_buckets_with_batches() {
    let samples = sample_file();
    let output = telemetry()
        .args([
            "replay",
            "--batch-size",
            "20",
            "--bucket-ms",
            "1000",
            "--aggregation",
            "max",
            "--input",
        ])
        .arg(samples.path())
        .output()
        .unwrap();

    assert!(output.status.success());
    let report = stdout_json(&output);
    let buckets = report["buckets"].as_array().unwrap();
    assert_eq!(buckets.len(), 2);
    assert_eq!(buckets[0]["value"], 9.0);
    assert_eq!(buckets[1]["value"], 19.0);
    assert_eq!(buckets[1]["count"], 10);
}

#[test]
fn test_replay_capacity_from_env() {
    let samples = sample_file();
    let output = telemetry()
        .env("TELEMETRY_CAPACITY", "3")
        .args(["replay", "--input"])
        .arg(samples.path())
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["statistics"]["count"], 3);
}

#[test]
fn test_replay_zero_capacity_rejected() {
    let samples = sample_file();
    telemetry()
        .args(["replay", "--capacity", "0", "--input"])
        .arg(samples.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("capacity"));
}

#[test]
fn test_replay_invalid_samples() {
    let bad = json_file(r#"[{"value": 1.0}]"#);
    telemetry()
        .args(["replay", "--input"])
        .arg(bad.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid sample file"));
}
