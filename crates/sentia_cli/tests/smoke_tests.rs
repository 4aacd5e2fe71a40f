//! CLI smoke tests: verify basic binary behavior.

use std::process::Command;

fn cli_bin(dir: &std::path::Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_sentia"));
    cmd.current_dir(dir)
        .env_remove("OPENROUTER_API_KEY")
        .env_remove("SENTIA_PROVIDER")
        .env_remove("SENTIA_CONFIG")
        .env_remove("SENTIA_MAX_DEPTH")
        .env_remove("SENTIA_ATTENTION_CAPACITY")
        .env_remove("SENTIA_CONFIDENCE_THRESHOLD");
    cmd
}

#[test]
fn test_help_flag() {
    let dir = tempfile::tempdir().unwrap();
    let output = cli_bin(dir.path()).arg("--help").output().expect("failed to run");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage"), "Expected usage info in --help output");
    assert!(stdout.contains("--provider"));
}

#[test]
fn test_version_flag() {
    let dir = tempfile::tempdir().unwrap();
    let output = cli_bin(dir.path()).arg("--version").output().expect("failed to run");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("sentia"), "Expected binary name in --version output");
}

#[test]
fn test_offline_turns_print_json_records() {
    let dir = tempfile::tempdir().unwrap();
    let output = cli_bin(dir.path())
        .args(["--provider", "heuristic", "--turn", "Hello there", "--turn", "Why is the sea salty?"])
        .output()
        .expect("failed to run");
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8_lossy(&output.stdout);
    let records: Vec<serde_json::Value> = stdout
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["turnIndex"], 0);
    assert_eq!(records[1]["turnIndex"], 1);
    assert!(records[0]["metrics"]["temporalBinding"].is_null());
    assert!(records[1]["reply"].is_string());
}

#[test]
fn test_missing_config_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let output = cli_bin(dir.path())
        .args(["--config", "does_not_exist.toml", "--turn", "hi"])
        .output()
        .expect("failed to run");
    // No API key in the environment: the HTTP provider degrades to the heuristic one.
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
}

#[test]
fn test_invalid_session_config_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("bad.toml"),
        "[session]\nattention_capacity = 0\n",
    )
    .unwrap();
    let output = cli_bin(dir.path())
        .args(["--config", "bad.toml", "--provider", "heuristic", "--turn", "hi"])
        .output()
        .expect("failed to run");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("attention_capacity"), "stderr: {}", stderr);
}

#[test]
fn test_malformed_config_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("broken.toml"),
        "[session]\nmax_recursion_depth = -1\n",
    )
    .unwrap();
    let output = cli_bin(dir.path())
        .args(["--config", "broken.toml", "--provider", "heuristic", "--turn", "hi"])
        .output()
        .expect("failed to run");
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("broken.toml"), "stderr: {}", stderr);
}

#[test]
fn test_unknown_provider_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = cli_bin(dir.path())
        .args(["--provider", "telepathy", "--turn", "hi"])
        .output()
        .expect("failed to run");
    assert!(!output.status.success());
}
