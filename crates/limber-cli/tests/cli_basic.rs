//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run against the dev data directory
//! and verify outputs.

use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "-p", "limber-cli", "--"])
        .args(args)
        .env("LIMBER_ENV", "dev")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

#[test]
fn stretch_list_json_parses() {
    let (stdout, _stderr, code) = run_cli(&["stretch", "list", "--json"]);
    assert_eq!(code, 0, "stretch list failed");
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert!(parsed.as_array().unwrap().len() >= 10);
}

#[test]
fn stretch_list_filters_by_kind() {
    let (stdout, _stderr, code) = run_cli(&["stretch", "list", "--kind", "dynamic", "--json"]);
    assert_eq!(code, 0, "filtered stretch list failed");
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    for stretch in parsed.as_array().unwrap() {
        assert_eq!(stretch["dynamic"], serde_json::Value::Bool(true));
    }
}

#[test]
fn config_show_prints_toml() {
    let (stdout, _stderr, code) = run_cli(&["config", "show"]);
    assert_eq!(code, 0, "config show failed");
    assert!(stdout.contains("[feedback]"));
}

#[test]
fn timer_flow_start_tick_pause_reset() {
    let (stdout, _stderr, code) = run_cli(&["timer", "start", "--seconds", "5"]);
    assert_eq!(code, 0, "timer start failed");
    assert!(stdout.contains("\"run_state\": \"running\""));

    let (stdout, _stderr, code) = run_cli(&["timer", "tick"]);
    assert_eq!(code, 0, "timer tick failed");
    assert!(stdout.contains("\"time_remaining\": 4"));

    let (stdout, _stderr, code) = run_cli(&["timer", "pause"]);
    assert_eq!(code, 0, "timer pause failed");
    assert!(stdout.contains("\"run_state\": \"paused\""));

    let (stdout, _stderr, code) = run_cli(&["timer", "reset"]);
    assert_eq!(code, 0, "timer reset failed");
    assert!(stdout.contains("\"run_state\": \"idle\""));
    assert!(stdout.contains("\"time_remaining\": 5"));
}
