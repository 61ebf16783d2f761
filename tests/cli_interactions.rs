//! CLI behaviour tests
//!
//! Everything here runs offline: argument errors never reach the network,
//! and full sessions run against a local mock server.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

const PROBE_VARS: [&str; 9] = [
    "PROBE_TARGET",
    "PROBE_ATTEMPTS",
    "PROBE_TIMEOUT_SECONDS",
    "PROBE_INTERVAL_MS",
    "PROBE_PACKET_SIZE",
    "PROBE_RETRIES",
    "PROBE_RETRY_INTERVAL_MS",
    "PROBE_MODE",
    "ENABLE_COLOR",
];

/// Command with a clean environment and an empty working directory
fn netdiag(workdir: &tempfile::TempDir) -> Command {
    let mut cmd = Command::cargo_bin("netdiag").unwrap();
    for var in PROBE_VARS {
        cmd.env_remove(var);
    }
    cmd.current_dir(workdir.path()).env("NO_COLOR", "1");
    cmd
}

fn workdir() -> tempfile::TempDir {
    tempfile::tempdir().unwrap()
}

/// A local address nothing listens on
fn closed_address() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let address = listener.local_addr().unwrap();
    drop(listener);
    address.to_string()
}

#[test]
fn test_help_lists_options() {
    netdiag(&workdir())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--count"))
        .stdout(predicate::str::contains("--retry-interval"))
        .stdout(predicate::str::contains("--diagnose"))
        .stdout(predicate::str::contains("--mode"));
}

#[test]
fn test_version() {
    netdiag(&workdir())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_invalid_count_is_usage_error() {
    // Parses, then fails validation
    netdiag(&workdir())
        .args(["example.com", "--count", "0"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Attempt count"));

    netdiag(&workdir())
        .args(["example.com", "--count", "1001"])
        .assert()
        .code(1);
}

#[test]
fn test_invalid_timeout_is_rejected() {
    for timeout in ["0", "301", "abc"] {
        netdiag(&workdir())
            .args(["example.com", "--timeout", timeout])
            .assert()
            .code(1);
    }
}

#[test]
fn test_invalid_mode_is_rejected() {
    netdiag(&workdir())
        .args(["example.com", "--mode", "icmp"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("icmp"));
}

#[test]
fn test_oversized_packet_is_rejected() {
    netdiag(&workdir())
        .args(["example.com", "--size", "65508"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Packet size"));
}

#[test]
fn test_invalid_env_value_is_config_error() {
    netdiag(&workdir())
        .env("PROBE_ATTEMPTS", "lots")
        .arg("example.com")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("PROBE_ATTEMPTS"));
}

#[test]
fn test_env_file_with_bad_value_is_config_error() {
    let dir = workdir();
    std::fs::write(dir.path().join(".env"), "PROBE_RETRIES=eleven\n").unwrap();

    netdiag(&dir)
        .arg("example.com")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("PROBE_RETRIES"));
}

#[test]
fn test_env_help_reports_env_file_problems() {
    let dir = workdir();
    std::fs::write(dir.path().join(".env"), "PROBE_MODE=icmp\n").unwrap();

    netdiag(&dir)
        .arg("--env-help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Supported Environment Variables"))
        .stdout(predicate::str::contains("Problems in .env"));
}

#[test]
fn test_env_example() {
    netdiag(&workdir())
        .arg("--env-example")
        .assert()
        .success()
        .stdout(predicate::str::contains("# PROBE_TARGET="));
}

#[test]
fn test_check_conflicts_with_diagnose() {
    netdiag(&workdir())
        .args(["--check", "--diagnose"])
        .assert()
        .code(1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_http_session_against_local_server_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    let target = server.address().to_string();

    netdiag(&workdir())
        .args([target.as_str(), "--mode", "http", "-c", "3", "-i", "0", "-r", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#1 "))
        .stdout(predicate::str::contains("#3 "))
        .stdout(predicate::str::contains("3 attempted, 3 succeeded, 0.0% loss"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_json_output_document() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    let target = server.address().to_string();

    let output = netdiag(&workdir())
        .args([target.as_str(), "--mode", "http", "-c", "2", "-i", "0", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["strategy"], "http-only");
    assert_eq!(json["results"].as_array().unwrap().len(), 2);
    assert_eq!(json["statistics"]["success_count"], 2);
    assert_eq!(json["cancelled"], false);
    assert!(json.get("diagnosis").is_none());
}

#[test]
fn test_refused_connection_exits_with_network_code() {
    netdiag(&workdir())
        .args([closed_address().as_str(), "--mode", "http", "-c", "2", "-i", "0", "-r", "0", "-t", "2"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("failed (other)"))
        .stdout(predicate::str::contains("100.0% loss"))
        .stderr(predicate::str::contains("2 of 2 attempts"));
}
