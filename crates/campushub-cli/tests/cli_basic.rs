//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run against the dev data directory
//! and verify outputs.

use std::process::Command;

/// Run a CLI command and return output.
fn run_cli(args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "-p", "campushub-cli", "--"])
        .args(args)
        .env("CAMPUSHUB_ENV", "dev")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

/// Parse the pretty-printed JSON that follows a "Created:" line.
fn json_tail(stdout: &str) -> serde_json::Value {
    let start = stdout.find(['{', '[']).expect("no JSON in output");
    serde_json::from_str(&stdout[start..]).expect("invalid JSON in output")
}

#[test]
fn test_help() {
    let (stdout, _, code) = run_cli(&["--help"]);
    assert_eq!(code, 0, "help failed");
    assert!(stdout.contains("allocate"));
}

#[test]
fn test_full_allocation_flow() {
    // Event
    let (stdout, stderr, code) = run_cli(&["event", "create", "CLI Fest"]);
    assert_eq!(code, 0, "event create failed: {stderr}");
    let event_id = json_tail(&stdout)["id"].as_str().unwrap().to_string();

    // Team + member
    let (stdout, stderr, code) = run_cli(&["team", "create", &event_id, "CLI Crew"]);
    assert_eq!(code, 0, "team create failed: {stderr}");
    let team_id = json_tail(&stdout)["id"].as_str().unwrap().to_string();

    let (_, stderr, code) = run_cli(&[
        "team",
        "add-member",
        &team_id,
        "cli-user-1",
        "Dev Jones",
        "--skills",
        "sound,lighting",
    ]);
    assert_eq!(code, 0, "add-member failed: {stderr}");

    // Task
    let (stdout, stderr, code) = run_cli(&[
        "task",
        "create",
        &event_id,
        &team_id,
        "Wire the stage",
        "--skills",
        "sound",
        "--priority",
        "high",
    ]);
    assert_eq!(code, 0, "task create failed: {stderr}");
    let task_id = json_tail(&stdout)["id"].as_str().unwrap().to_string();

    // Allocate
    let (stdout, stderr, code) = run_cli(&["allocate", &event_id]);
    assert_eq!(code, 0, "allocate failed: {stderr}");
    assert!(
        stdout.contains("Assigned 1 task(s)"),
        "unexpected allocate output: {stdout}"
    );

    // The task is now assigned to the only member, flagged as engine-made.
    let (stdout, stderr, code) = run_cli(&["task", "get", &task_id]);
    assert_eq!(code, 0, "task get failed: {stderr}");
    let task = json_tail(&stdout);
    assert_eq!(task["assigned_to"].as_str(), Some("cli-user-1"));
    assert_eq!(task["ai_assigned"].as_bool(), Some(true));

    // A second run finds nothing to do.
    let (stdout, stderr, code) = run_cli(&["allocate", &event_id]);
    assert_eq!(code, 0, "re-allocate failed: {stderr}");
    assert!(
        stdout.contains("No unassigned tasks"),
        "unexpected re-allocate output: {stdout}"
    );
}
