//! Integration tests for the noaa-current binary

use std::process::Command;

fn binary() -> Command {
    Command::new(env!("CARGO_BIN_EXE_noaa-current"))
}

/// Test that the CLI shows help with its options
#[test]
fn test_cli_help() {
    let output = binary()
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--config"));
    assert!(stdout.contains("--notifications-only"));
}

/// Test that an out-of-range location is rejected before anything runs
#[test]
fn test_invalid_location_exits_with_error() {
    let path = std::env::temp_dir().join(format!("noaa-current-cli-{}.toml", std::process::id()));
    std::fs::write(&path, "[location]\nlat = 200.0\nlon = -87.6\n").unwrap();

    let output = binary()
        .arg("--config")
        .arg(&path)
        .output()
        .expect("Failed to execute command");
    std::fs::remove_file(&path).ok();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to load configuration"), "stderr: {stderr}");
    assert!(stderr.contains("Latitude"), "stderr: {stderr}");
}
