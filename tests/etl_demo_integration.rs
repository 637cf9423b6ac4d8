//! Integration tests for the etl_demo CLI.
//!
//! Runs the built binary with short durations and temp config files.

use std::io::Write;
use std::process::{Command, Output};

fn run_etl_demo(args: &[&str]) -> Output {
  Command::new(env!("CARGO_BIN_EXE_etl_demo"))
    .args(args)
    .env("RUST_LOG", "info")
    .output()
    .expect("run etl_demo")
}

#[test]
fn etl_demo_runs_default_path_and_raises_alerts() {
  let out = run_etl_demo(&["--duration-secs", "1", "--block-time-ms", "20", "--every", "2"]);
  let stdout = String::from_utf8_lossy(&out.stdout);
  assert!(
    out.status.success(),
    "stderr: {}",
    String::from_utf8_lossy(&out.stderr)
  );
  assert!(stdout.contains("path ready"), "stdout: {}", stdout);
  assert!(stdout.contains("block_multiple"), "stdout: {}", stdout);
  assert!(stdout.contains("etl shut down"), "stdout: {}", stdout);
}

#[test]
fn etl_demo_reuses_duplicate_requests_from_paths_file() {
  let mut file = tempfile::NamedTempFile::new().unwrap();
  write!(
    file,
    r#"[
      {{"network": "layer1", "path_type": "live", "topic": "block_header"}},
      {{"network": "layer1", "path_type": "live", "topic": "block_header"}}
    ]"#
  )
  .unwrap();
  let path = file.path().to_str().unwrap();
  let out = run_etl_demo(&["--paths", path, "--duration-secs", "1"]);
  let stdout = String::from_utf8_lossy(&out.stdout);
  assert!(
    out.status.success(),
    "stderr: {}",
    String::from_utf8_lossy(&out.stderr)
  );
  assert!(stdout.contains("reused=true"), "stdout: {}", stdout);
}

#[test]
fn etl_demo_exits_1_for_missing_paths_file() {
  let out = run_etl_demo(&["--paths", "/nonexistent/paths.json", "--duration-secs", "1"]);
  assert!(!out.status.success());
  assert_eq!(out.status.code(), Some(1));
  let stderr = String::from_utf8_lossy(&out.stderr);
  assert!(stderr.contains("Error"), "stderr: {}", stderr);
}

#[test]
fn etl_demo_rejects_invalid_path_request() {
  let mut file = tempfile::NamedTempFile::new().unwrap();
  write!(
    file,
    r#"[{{"network": "layer1", "path_type": "backtest", "topic": "block_header"}}]"#
  )
  .unwrap();
  let out = run_etl_demo(&["--paths", file.path().to_str().unwrap()]);
  assert_eq!(out.status.code(), Some(1));
  let stderr = String::from_utf8_lossy(&out.stderr);
  assert!(stderr.contains("backtest"), "stderr: {}", stderr);
}
