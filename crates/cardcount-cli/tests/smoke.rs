use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

const TRACE: &str = r#"{"at_ms": 0, "response": {"result": [{"suit": "H", "rank": "K"}, {"suit": "D", "rank": "3"}]}}
{"at_ms": 4000, "response": {"suit": "H", "rank": "K"}}
{"at_ms": 8000, "cards": ["KH", "3D"]}
{"at_ms": 9000, "response": {"suit": "?", "rank": "K"}}
{"at_ms": 12000, "cards": ["KH"]}
{"at_ms": 16000, "cards": ["KH", "3D"]}
{"at_ms": 20000, "cards": ["3D"]}
{"at_ms": 24000, "cards": ["3D"]}
"#;

#[test]
fn replay_prints_count_and_rank_table() {
    let dir = tempdir().expect("temp dir");
    let trace = dir.path().join("trace.jsonl");
    fs::write(&trace, TRACE).expect("write trace");

    Command::cargo_bin("cardcount")
        .expect("binary built")
        .arg("replay")
        .arg(&trace)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Count: 0 [neutral #ffffff]"))
        .stdout(predicate::str::contains("King: 1\n"))
        .stdout(predicate::str::contains("Three: 1\n"))
        .stdout(predicate::str::contains("Ace: 0\n"))
        .stderr(predicate::str::contains("2 cards registered"));
}

#[test]
fn replay_json_output_is_parseable() {
    let dir = tempdir().expect("temp dir");
    let trace = dir.path().join("trace.jsonl");
    fs::write(&trace, TRACE).expect("write trace");

    let output = Command::cargo_bin("cardcount")
        .expect("binary built")
        .args(["--json", "replay"])
        .arg(&trace)
        .output()
        .expect("run replay");
    assert!(output.status.success());

    let frame: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    assert_eq!(frame["count"], 0);
    assert_eq!(frame["tint"]["kind"], "neutral");
    assert_eq!(frame["ranks"].as_array().map(Vec::len), Some(13));
}

#[test]
fn replay_reports_out_of_order_trace() {
    let dir = tempdir().expect("temp dir");
    let trace = dir.path().join("bad.jsonl");
    fs::write(
        &trace,
        "{\"at_ms\": 500, \"cards\": []}\n{\"at_ms\": 100, \"cards\": []}\n",
    )
    .expect("write trace");

    Command::cargo_bin("cardcount")
        .expect("binary built")
        .arg("replay")
        .arg(&trace)
        .assert()
        .failure()
        .stderr(predicate::str::contains("earlier than the previous entry"));
}

#[test]
fn validate_only_accepts_config_file() {
    let dir = tempdir().expect("temp dir");
    let config = dir.path().join("cardcount.yaml");
    fs::write(
        &config,
        "session_id: \"smoke\"\ncapture:\n  backend: \"simulated\"\n",
    )
    .expect("write config");

    Command::cargo_bin("cardcount")
        .expect("binary built")
        .arg("--config")
        .arg(&config)
        .arg("--validate-only")
        .assert()
        .success()
        .stdout(predicate::str::contains("'smoke' is valid (simulated backend)"));
}

#[test]
fn validate_only_rejects_http_without_frames() {
    Command::cargo_bin("cardcount")
        .expect("binary built")
        .args(["--validate-only", "run", "--server", "http://127.0.0.1:5000/"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("capture.frames"));
}

#[test]
fn simulated_auto_run_registers_cards() {
    let output = Command::cargo_bin("cardcount")
        .expect("binary built")
        .args(["--json", "run", "--seed", "3", "--auto", "120"])
        .output()
        .expect("run simulated session");
    assert!(output.status.success());

    let frame: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    let total: u64 = frame["ranks"]
        .as_array()
        .expect("rank rows")
        .iter()
        .filter_map(|row| row["count"].as_u64())
        .sum();
    assert!(total > 0, "expected at least one registered card");
}
