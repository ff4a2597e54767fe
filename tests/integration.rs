//! End-to-end tests for the REPL harness
//!
//! Each test writes a scenario file pointing at the mock-repl binary, runs
//! the harness against it as a subprocess and checks the exit status and
//! diagnostics.

use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

fn harness_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_repl-harness"))
}

fn mock_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_mock-repl"))
}

/// Output from a harness invocation
struct HarnessOutput {
    stdout: String,
    stderr: String,
    success: bool,
}

fn run_harness(args: &[&str]) -> HarnessOutput {
    let output = Command::new(harness_bin())
        .args(args)
        .output()
        .expect("Failed to run harness");

    HarnessOutput {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        success: output.status.success(),
    }
}

fn write_scenario(dir: &Path, name: &str, yaml: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, yaml).expect("Failed to write scenario");
    path
}

fn walkthrough_yaml(mock_args: &str, timeout_secs: u64) -> String {
    format!(
        r#"
name: scripted walkthrough
description: banner, two steps, then repeat-last as the final turn
timeout_secs: {timeout_secs}
target:
  program: {mock}
  args: [{mock_args}]
turns:
  - expect:
      - 'listening on port \d+'
      - 'connecting\.\.\. ok'
      - 'break in .*:1'
  - input: n
    expect:
      - 'debug> n'
      - 'break in .*:11'
  - input: c
    expect:
      - 'debug> c'
      - 'break in .*:5'
  - input: ""
"#,
        mock = mock_bin().display(),
    )
}

#[test]
fn scripted_walkthrough_passes() {
    let dir = TempDir::new().unwrap();
    let scenario = write_scenario(
        dir.path(),
        "walkthrough.yaml",
        &walkthrough_yaml("\"--port={port}\"", 5),
    );

    let output = run_harness(&["run", scenario.to_str().unwrap(), "--port", "5858"]);
    assert!(
        output.success,
        "Expected success:\nstdout: {}\nstderr: {}",
        output.stdout, output.stderr
    );
    assert!(
        output.stdout.contains("Scenario passed"),
        "Expected pass summary, got: {}",
        output.stdout
    );
}

#[test]
fn noisy_output_is_cleaned_before_matching() {
    let dir = TempDir::new().unwrap();
    let scenario = write_scenario(
        dir.path(),
        "noisy.yaml",
        &walkthrough_yaml("\"--noisy\", \"--port={port}\"", 5),
    );

    let output = run_harness(&["run", scenario.to_str().unwrap()]);
    assert!(
        output.success,
        "Expected prompt echoes and escapes to be stripped:\nstderr: {}",
        output.stderr
    );
}

#[test]
fn mismatch_fails_with_both_sides_named() {
    let dir = TempDir::new().unwrap();
    let scenario = write_scenario(
        dir.path(),
        "garbage.yaml",
        &walkthrough_yaml("\"--garbage\", \"--port={port}\"", 5),
    );

    let output = run_harness(&["run", scenario.to_str().unwrap()]);
    assert!(!output.success, "Expected failure: {}", output.stdout);
    assert!(
        output.stderr.contains("Pattern mismatch"),
        "Expected mismatch diagnostic, got: {}",
        output.stderr
    );
    assert!(
        output.stderr.contains("garbage from the child")
            && output.stderr.contains("debug> n"),
        "Expected actual line and pending pattern in diagnostic: {}",
        output.stderr
    );
}

#[test]
fn silent_child_times_out_naming_pending_pattern() {
    let dir = TempDir::new().unwrap();
    let scenario = write_scenario(
        dir.path(),
        "silent.yaml",
        &walkthrough_yaml("\"--silent\"", 1),
    );

    let output = run_harness(&["run", scenario.to_str().unwrap()]);
    assert!(!output.success, "Expected timeout failure");
    assert!(
        output.stderr.contains("Timeout after 1s"),
        "Expected timeout diagnostic, got: {}",
        output.stderr
    );
    assert!(
        output.stderr.contains("listening on port"),
        "Expected first pending pattern in diagnostic: {}",
        output.stderr
    );
}

#[cfg(unix)]
#[test]
fn escalation_terminates_a_child_that_ignores_interrupts() {
    let dir = TempDir::new().unwrap();
    let scenario = write_scenario(
        dir.path(),
        "stubborn.yaml",
        &walkthrough_yaml("\"--stubborn\"", 1),
    );

    let started = std::time::Instant::now();
    let output = run_harness(&["run", scenario.to_str().unwrap()]);
    let elapsed = started.elapsed();

    assert!(!output.success, "Expected timeout failure");
    assert!(
        output.stderr.contains("Timeout after 1s"),
        "Expected timeout diagnostic, got: {}",
        output.stderr
    );
    // The interrupts are ignored, so only the termination step can stop the
    // child; the run must still finish within the budget plus the grace
    // delay rather than hanging on the 60s sleep.
    assert!(
        elapsed < std::time::Duration::from_secs(5),
        "Escalation did not terminate the child in time: {elapsed:?}"
    );
}

#[test]
fn clean_exit_with_pending_turns_fails() {
    let dir = TempDir::new().unwrap();
    let scenario = write_scenario(
        dir.path(),
        "early.yaml",
        &walkthrough_yaml("\"--exit-early\", \"--port={port}\"", 5),
    );

    let output = run_harness(&["run", scenario.to_str().unwrap()]);
    assert!(!output.success, "Expected queue-not-drained failure");
    assert!(
        output.stderr.contains("still pending"),
        "Expected pending-turns diagnostic, got: {}",
        output.stderr
    );
}

#[test]
fn check_reports_turn_list() {
    let dir = TempDir::new().unwrap();
    let scenario = write_scenario(
        dir.path(),
        "walkthrough.yaml",
        &walkthrough_yaml("\"--port={port}\"", 5),
    );

    let output = run_harness(&["check", scenario.to_str().unwrap()]);
    assert!(output.success, "check failed: {}", output.stderr);
    assert!(
        output.stdout.contains("4 turns"),
        "Expected turn count, got: {}",
        output.stdout
    );
}

#[test]
fn check_rejects_invalid_pattern() {
    let dir = TempDir::new().unwrap();
    let scenario = write_scenario(
        dir.path(),
        "bad.yaml",
        r#"
name: bad
target:
  program: true
turns:
  - expect: ['break in (']
"#,
    );

    let output = run_harness(&["check", scenario.to_str().unwrap()]);
    assert!(!output.success, "Expected parse failure");
    assert!(
        output.stderr.contains("Error:"),
        "Expected error report, got: {}",
        output.stderr
    );
}

#[test]
fn missing_program_fails_to_spawn() {
    let dir = TempDir::new().unwrap();
    let scenario = write_scenario(
        dir.path(),
        "missing.yaml",
        r#"
name: missing
target:
  program: /nonexistent/debugger
turns:
  - expect: ['listening']
"#,
    );

    let output = run_harness(&["run", scenario.to_str().unwrap()]);
    assert!(!output.success);
    assert!(
        output.stderr.contains("Failed to spawn"),
        "Expected spawn diagnostic, got: {}",
        output.stderr
    );
}
