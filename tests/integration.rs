use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn rpt_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("rpt");
    path
}

const TOKEN: &str = "integration-test-token";

const SAMPLE_DOC: &str = r#"export const metadata = {
  title: 'Q3 2025 Earnings Analysis',
  company: 'NVIDIA Corporation',
  ticker: 'NVDA',
  period: 'Q3 FY2025',
  date: 'November 2025',
  icon: '📊',
}

# The Quarter in Review

Datacenter revenue carried the quarter.
"#;

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    // A staging area for documents to publish
    let staging = root.join("staging");
    fs::create_dir_all(&staging).unwrap();
    fs::write(staging.join("Q3 2025 NVIDIA Report.mdx"), SAMPLE_DOC).unwrap();
    fs::write(staging.join("notes.txt"), "not a report").unwrap();

    let config_content = format!(
        r#"[store]
root = "{}/content/reports"

[server]
bind = "127.0.0.1:0"

[auth]
token = "{}"
username = "admin"
"#,
        root.display(),
        TOKEN
    );

    let config_path = config_dir.join("rpt.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_rpt(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = rpt_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run rpt binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

#[test]
fn test_init_creates_store_root() {
    let (tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_rpt(&config_path, &["init"]);
    assert!(success, "init failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("initialized"));
    assert!(tmp.path().join("content/reports").is_dir());
}

#[test]
fn test_init_idempotent() {
    let (_tmp, config_path) = setup_test_env();

    let (_, _, success1) = run_rpt(&config_path, &["init"]);
    assert!(success1, "First init failed");

    let (_, _, success2) = run_rpt(&config_path, &["init"]);
    assert!(success2, "Second init failed (not idempotent)");
}

#[test]
fn test_list_before_init_is_empty_not_an_error() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_rpt(&config_path, &["list"]);
    assert!(success, "list against a missing store root should succeed");
    assert!(stdout.contains("No reports"));
}

#[test]
fn test_publish_then_list() {
    let (tmp, config_path) = setup_test_env();
    let doc = tmp.path().join("staging/Q3 2025 NVIDIA Report.mdx");

    let (stdout, stderr, success) = run_rpt(&config_path, &["publish", doc.to_str().unwrap()]);
    assert!(
        success,
        "publish failed: stdout={}, stderr={}",
        stdout, stderr
    );
    assert!(stdout.contains("q3-2025-nvidia-report.mdx"));

    let (stdout, _, success) = run_rpt(&config_path, &["list"]);
    assert!(success);
    assert!(stdout.contains("q3-2025-nvidia-report"));
    assert!(stdout.contains("Q3 2025 Earnings Analysis"));
    assert!(stdout.contains("NVIDIA Corporation"));
}

#[test]
fn test_publish_rejects_wrong_extension() {
    let (tmp, config_path) = setup_test_env();
    let doc = tmp.path().join("staging/notes.txt");

    let (_, stderr, success) = run_rpt(&config_path, &["publish", doc.to_str().unwrap()]);
    assert!(!success, "publishing a .txt file should fail");
    assert!(
        stderr.contains("invalid format"),
        "Should report invalid format, got: {}",
        stderr
    );
}

#[test]
fn test_publish_missing_file_fails() {
    let (tmp, config_path) = setup_test_env();
    let doc = tmp.path().join("staging/absent.mdx");

    let (_, stderr, success) = run_rpt(&config_path, &["publish", doc.to_str().unwrap()]);
    assert!(!success);
    assert!(stderr.contains("Failed to read document"));
}

#[test]
fn test_get_prints_metadata_and_body() {
    let (tmp, config_path) = setup_test_env();
    let doc = tmp.path().join("staging/Q3 2025 NVIDIA Report.mdx");
    run_rpt(&config_path, &["publish", doc.to_str().unwrap()]);

    let (stdout, _, success) = run_rpt(&config_path, &["get", "q3-2025-nvidia-report"]);
    assert!(success, "get should succeed");
    assert!(stdout.contains("Q3 2025 Earnings Analysis"));
    assert!(stdout.contains("NVDA"));
    assert!(stdout.contains("The Quarter in Review"));
}

#[test]
fn test_get_missing_report() {
    let (_tmp, config_path) = setup_test_env();
    run_rpt(&config_path, &["init"]);

    let (_, stderr, success) = run_rpt(&config_path, &["get", "nonexistent"]);
    assert!(!success, "get with missing slug should fail");
    assert!(
        stderr.contains("not found"),
        "Should report not found, got: {}",
        stderr
    );
}

#[test]
fn test_delete_then_list() {
    let (tmp, config_path) = setup_test_env();
    let doc = tmp.path().join("staging/Q3 2025 NVIDIA Report.mdx");
    run_rpt(&config_path, &["publish", doc.to_str().unwrap()]);

    let (stdout, stderr, success) =
        run_rpt(&config_path, &["delete", "q3-2025-nvidia-report.mdx"]);
    assert!(
        success,
        "delete failed: stdout={}, stderr={}",
        stdout, stderr
    );

    let (stdout, _, _) = run_rpt(&config_path, &["list"]);
    assert!(!stdout.contains("q3-2025-nvidia-report"));
}

#[test]
fn test_delete_missing_report() {
    let (_tmp, config_path) = setup_test_env();
    run_rpt(&config_path, &["init"]);

    let (_, stderr, success) = run_rpt(&config_path, &["delete", "absent.mdx"]);
    assert!(!success);
    assert!(stderr.contains("not found"));
}

#[test]
fn test_missing_config_fails() {
    let (tmp, _) = setup_test_env();
    let bogus = tmp.path().join("config/absent.toml");

    let (_, stderr, success) = run_rpt(&bogus, &["list"]);
    assert!(!success);
    assert!(stderr.contains("Failed to read config file"));
}
