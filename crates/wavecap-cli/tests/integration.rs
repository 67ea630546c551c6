//! Integration tests for wavecap-cli.
//!
//! Tests drive the built binary end to end: signal generation, offline
//! analysis, the simulated monitor loop and config management.

use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Helper to get the path to the `wavecap` binary built by cargo.
fn wavecap_bin() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_wavecap"));
    // default filter regardless of the caller's environment
    cmd.env_remove("RUST_LOG");
    cmd
}

fn run(args: &[&str]) -> Output {
    wavecap_bin()
        .args(args)
        .output()
        .expect("failed to run wavecap")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Write an empty config so the user's file never leaks into a test.
fn empty_config(dir: &Path) -> String {
    let path = dir.join("wavecap.toml");
    std::fs::write(&path, "").unwrap();
    path.to_string_lossy().into_owned()
}

// ---------------------------------------------------------------------------
// CLI binary tests -- `wavecap generate` + `wavecap analyze`
// ---------------------------------------------------------------------------

#[test]
fn cli_generate_then_analyze_square() {
    let dir = TempDir::new().unwrap();
    let config = empty_config(dir.path());
    let wav = dir.path().join("square.wav");
    let wav_str = wav.to_str().unwrap();

    let output = run(&["generate", "square", wav_str, "--freq", "50", "--duration", "1.2"]);
    assert!(output.status.success(), "generate failed: {output:?}");
    assert!(wav.is_file());
    assert!(stdout(&output).contains("6000 samples"));

    let output = run(&["--config", &config, "analyze", wav_str, "--json"]);
    assert!(output.status.success(), "analyze failed: {output:?}");

    let text = stdout(&output);
    let lines: Vec<&str> = text.lines().collect();
    // 1.2 s at 5 kHz in 0.4 s windows
    assert_eq!(lines.len(), 3, "{text}");
    for line in lines {
        let value: serde_json::Value = serde_json::from_str(line).unwrap();
        assert_eq!(value["label"], "square", "{line}");
        assert_eq!(value["samples"], 2000);
        let hz = value["frequency_hz"].as_f64().unwrap();
        assert!((hz - 50.0).abs() < 1.0, "{hz}");
    }
}

#[test]
fn cli_analyze_human_output_has_summary() {
    let dir = TempDir::new().unwrap();
    let config = empty_config(dir.path());
    let wav = dir.path().join("tri.wav");
    let wav_str = wav.to_str().unwrap();

    assert!(run(&["generate", "triangle", wav_str, "--duration", "0.8"]).status.success());
    let output = run(&["--config", &config, "analyze", wav_str]);
    assert!(output.status.success());

    let text = stdout(&output);
    assert!(text.contains("Analyzing:"), "{text}");
    assert!(text.contains("-> triangle"), "{text}");
    assert!(text.contains("Summary: 2 window(s)"), "{text}");
}

#[test]
fn cli_analyze_missing_file_fails() {
    let dir = TempDir::new().unwrap();
    let output = run(&["analyze", dir.path().join("absent.wav").to_str().unwrap()]);
    assert!(!output.status.success());
}

#[test]
fn cli_generate_rejects_bad_bit_depth() {
    let dir = TempDir::new().unwrap();
    let wav = dir.path().join("x.wav");
    let output = run(&["generate", "sine", wav.to_str().unwrap(), "--bits", "12"]);
    assert!(!output.status.success());
    assert!(!wav.exists());
}

// ---------------------------------------------------------------------------
// CLI binary tests -- `wavecap monitor`
// ---------------------------------------------------------------------------

#[test]
fn cli_monitor_stepped_sim_json() {
    let dir = TempDir::new().unwrap();
    let config = empty_config(dir.path());

    let output = run(&[
        "--config",
        &config,
        "monitor",
        "--stepped",
        "--free",
        "--shape",
        "square",
        "--offset",
        "1.6",
        "--cycles",
        "2",
        "--interval-ms",
        "0",
        "--json",
    ]);
    assert!(output.status.success(), "monitor failed: {output:?}");

    let text = stdout(&output);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2, "{text}");
    for (i, line) in lines.iter().enumerate() {
        let value: serde_json::Value = serde_json::from_str(line).unwrap();
        assert_eq!(value["cycle"], i as u64 + 1);
        assert_eq!(value["label"], "square");
        assert_eq!(value["measured_fs"], 5000.0);
        assert!(value["spectral_hz"].is_number());
        assert!(value["zero_crossing_hz"].is_number());
    }
}

#[test]
fn cli_monitor_on_change_prints_once() {
    let dir = TempDir::new().unwrap();
    let config = empty_config(dir.path());

    let output = run(&[
        "--config",
        &config,
        "monitor",
        "--stepped",
        "--free",
        "--shape",
        "triangle",
        "--offset",
        "1.6",
        "--cycles",
        "3",
        "--interval-ms",
        "0",
        "--on-change",
    ]);
    assert!(output.status.success(), "monitor failed: {output:?}");

    let text = stdout(&output);
    assert_eq!(text.lines().count(), 1, "{text}");
    assert!(text.contains("-> triangle"), "{text}");
}

#[test]
fn cli_monitor_rejects_bad_channel() {
    let dir = TempDir::new().unwrap();
    let config = empty_config(dir.path());
    let output = run(&["--config", &config, "monitor", "--channel", "8", "--cycles", "1"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("capture.channel 8"), "{stderr}");
}

// ---------------------------------------------------------------------------
// CLI binary tests -- `wavecap config`
// ---------------------------------------------------------------------------

#[test]
fn cli_config_init_and_show() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("conf/wavecap.toml");
    let path_str = path.to_str().unwrap();

    let output = run(&["config", "init", path_str]);
    assert!(output.status.success(), "init failed: {output:?}");
    assert!(path.is_file());

    // refuses to clobber without --force
    assert!(!run(&["config", "init", path_str]).status.success());
    assert!(run(&["config", "init", path_str, "--force"]).status.success());

    let output = run(&["--config", path_str, "config", "show"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("[capture]"), "{text}");
    assert!(text.contains("sample_rate_hz = 5000.0"), "{text}");
    assert!(text.contains("[classifier]"), "{text}");
}

#[test]
fn cli_config_path_names_file() {
    let output = run(&["config", "path"]);
    assert!(output.status.success());
    assert!(stdout(&output).trim_end().ends_with("wavecap.toml"));
}

#[test]
fn cli_help_lists_commands() {
    let output = run(&["--help"]);
    assert!(output.status.success());
    let text = stdout(&output);
    for cmd in ["monitor", "analyze", "generate", "config"] {
        assert!(text.contains(cmd), "help should list '{cmd}'");
    }
}
