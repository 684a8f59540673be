#![allow(clippy::unwrap_used, clippy::expect_used)]

//! CLI smoke tests for the ridehub-server binary.

use std::net::TcpListener;
use std::process::{Command, Stdio};
use std::time::Duration;

use tempfile::TempDir;

fn ridehub_server() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_ridehub-server"));
    cmd.stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .env_remove("RUST_LOG");
    cmd
}

fn run_ridehub_server(args: &[&str]) -> std::process::Output {
    ridehub_server()
        .args(args)
        .output()
        .expect("Failed to execute ridehub-server")
}

fn write_config(dir: &TempDir, name: &str, content: &str) -> String {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("Failed to write config file");
    path.to_str().unwrap().to_owned()
}

#[test]
fn test_cli_help_command() {
    let output = run_ridehub_server(&["--help"]);
    assert!(output.status.success(), "Help command should succeed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ridehub-server"), "Should contain binary name");
    assert!(stdout.contains("Usage:"), "Should contain usage information");
    assert!(stdout.contains("run"), "Should contain 'run' subcommand");
    assert!(stdout.contains("check"), "Should contain 'check' subcommand");
    assert!(stdout.contains("--config"), "Should mention config option");
}

#[test]
fn test_cli_version_command() {
    let output = run_ridehub_server(&["--version"]);
    assert!(output.status.success(), "Version command should succeed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ridehub-server"));
    assert!(stdout.chars().any(|c| c.is_ascii_digit()));
}

#[test]
fn test_cli_invalid_command() {
    let output = run_ridehub_server(&["invalid-command"]);
    assert!(!output.status.success(), "Invalid command should fail");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error"), "Should report the error: {stderr}");
}

#[test]
fn test_cli_config_validation_missing_file() {
    let output = run_ridehub_server(&["--config", "/nonexistent/config.yaml", "check"]);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("does not exist"),
        "Should indicate config file not found: {stderr}"
    );
}

#[test]
fn test_cli_config_validation_invalid_yaml() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_config(&temp_dir, "invalid.yaml", "invalid: yaml: content: [unclosed");

    let output = run_ridehub_server(&["--config", &path, "check"]);
    assert!(!output.status.success(), "Should fail with invalid YAML");
}

#[test]
fn test_cli_check_valid_config() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_config(
        &temp_dir,
        "valid.yaml",
        &format!(
            r#"
server:
  port: 18087
database:
  url: "sqlite://{}/ridehub.db?mode=rwc"
logging:
  level: error
ridehub:
  auth:
    jwt_secret: "smoke-test-secret"
"#,
            temp_dir.path().to_string_lossy().replace('\\', "/")
        ),
    );

    let output = run_ridehub_server(&["--config", &path, "check"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "STDOUT: {stdout}\nSTDERR: {stderr}");
    assert!(stdout.contains("Configuration is valid"));
    assert!(!stdout.contains("smoke-test-secret"), "Secrets must be redacted");
}

#[test]
fn test_cli_check_rejects_bad_bind_address() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_config(
        &temp_dir,
        "bad_addr.yaml",
        r"
server:
  bind_addr: not-an-address
ridehub:
  auth:
    disabled: true
",
    );

    let output = run_ridehub_server(&["--config", &path, "check"]);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("bind address"), "{stderr}");
}

#[test]
fn test_cli_check_requires_jwt_secret() {
    let output = temp_env::with_vars_unset(["RIDEHUB__RIDEHUB__AUTH__JWT_SECRET"], || {
        run_ridehub_server(&["--mock", "check"])
    });
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("jwt_secret"), "{stderr}");
}

#[test]
fn test_cli_env_overrides_file() {
    let output = ridehub_server()
        .args(["--print-config"])
        .env("RIDEHUB__SERVER__PORT", "19999")
        .output()
        .expect("Failed to execute ridehub-server");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("19999"), "{stdout}");
}

#[test]
fn test_cli_print_config_with_port_override() {
    let output = run_ridehub_server(&["--port", "18123", "--mock", "--print-config"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("18123"), "{stdout}");
    assert!(stdout.contains("sqlite::memory:"), "{stdout}");
}

#[test]
fn test_cli_subcommand_help() {
    let output = run_ridehub_server(&["run", "--help"]);
    assert!(output.status.success());
    let output = run_ridehub_server(&["check", "--help"]);
    assert!(output.status.success());
}

#[tokio::test]
async fn test_cli_run_serves_health_until_killed() {
    // Grab a free port, then release it for the server.
    let port = TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();

    let mut child = tokio::process::Command::new(env!("CARGO_BIN_EXE_ridehub-server"))
        .args(["--mock", "--port", &port.to_string(), "run"])
        .env("RIDEHUB__RIDEHUB__AUTH__DISABLED", "true")
        .env("RIDEHUB__LOGGING__LEVEL", "error")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .expect("Failed to spawn ridehub-server");

    let mut healthy = false;
    for _ in 0..50 {
        tokio::time::sleep(Duration::from_millis(100)).await;
        if let Ok(mut stream) = tokio::net::TcpStream::connect(("127.0.0.1", port)).await {
            use tokio::io::{AsyncReadExt, AsyncWriteExt};
            stream
                .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
                .await
                .unwrap();
            let mut response = String::new();
            stream.read_to_string(&mut response).await.unwrap();
            healthy = response.starts_with("HTTP/1.1 200") && response.contains("\"ok\"");
            break;
        }
    }

    child.kill().await.unwrap();
    assert!(healthy, "server should answer /health");
}

#[test]
fn test_cli_check_sample_config() {
    let sample = concat!(env!("CARGO_MANIFEST_DIR"), "/../../config/ridehub.yaml");
    let output = run_ridehub_server(&["--config", sample, "check"]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "{stderr}");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("change-me"), "Secrets must be redacted");
}
