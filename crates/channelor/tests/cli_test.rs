//! Integration tests for the `channelor` CLI binary.
//!
//! Scan data comes from temporary files or stdin; no real scanner or user
//! configuration is involved.
#![allow(clippy::unwrap_used)]

use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `channelor` binary with env isolation.
///
/// Clears `CHANNELOR_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn channelor_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("channelor");
    cmd.env("HOME", "/tmp/channelor-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/channelor-cli-test-nonexistent")
        .env_remove("CHANNELOR_CONFIG")
        .env_remove("CHANNELOR_OUTPUT")
        .env_remove("CHANNELOR_PIPELINE__SETTLE_DELAY_MS")
        .env_remove("CHANNELOR_PIPELINE__ONLY_24GHZ")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1");
    cmd
}

fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

fn empty_scan(dir: &TempDir) -> PathBuf {
    write_file(dir, "empty.json", "[]")
}

/// One access point on Wi-Fi channel 1 plus one on channel 6.
fn home_scan(dir: &TempDir) -> PathBuf {
    write_file(
        dir,
        "home.json",
        r#"[
            {"identifier": "Net1", "center_frequency_mhz": 2412, "signal_strength_dbm": -40},
            {"ssid": "Home", "frequency": 2437, "rssi": -52}
        ]"#,
    )
}

fn path_arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = channelor_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    channelor_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("Zigbee")
            .and(predicate::str::contains("channels"))
            .and(predicate::str::contains("recommend"))
            .and(predicate::str::contains("watch")),
    );
}

#[test]
fn test_version_flag() {
    channelor_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("channelor"));
}

#[test]
fn test_completions_bash() {
    channelor_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("channelor"));
}

// ── channels ────────────────────────────────────────────────────────

#[test]
fn test_channels_list_json_has_sixteen_channels() {
    let dir = TempDir::new().unwrap();
    let scan = home_scan(&dir);
    let output = channelor_cmd()
        .args(["channels", "list", "--scan", path_arg(&scan), "-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let channels = value.as_array().unwrap();
    assert_eq!(channels.len(), 16);
    assert_eq!(channels[0]["channel_number"], 11);
    assert_eq!(channels[0]["congestion_dbm"], -40);
    assert_eq!(channels[0]["recommended"], false);
    assert_eq!(channels[15]["channel_number"], 26);
    assert_eq!(channels[15]["is_warning_channel"], true);
}

#[test]
fn test_channels_list_table() {
    let dir = TempDir::new().unwrap();
    let scan = empty_scan(&dir);
    channelor_cmd()
        .args(["channels", "list", "--scan", path_arg(&scan)])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Channel")
                .and(predicate::str::contains("2405"))
                .and(predicate::str::contains("2480"))
                .and(predicate::str::contains("compatibility risk")),
        );
}

#[test]
fn test_channels_show_lists_interferers_and_tags() {
    let dir = TempDir::new().unwrap();
    let scan = home_scan(&dir);
    channelor_cmd()
        .args(["channels", "show", "15", "--scan", path_arg(&scan)])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Channel 15 (2425 MHz)")
                .and(predicate::str::contains("Zigbee Light Link (ZLL) recommended channel"))
                .and(predicate::str::contains("Home"))
                .and(predicate::str::contains("Net1").not()),
        );
}

#[test]
fn test_channels_show_unknown_channel() {
    let dir = TempDir::new().unwrap();
    let scan = empty_scan(&dir);
    channelor_cmd()
        .args(["channels", "show", "30", "--scan", path_arg(&scan)])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("not a Zigbee channel"));
}

// ── recommend ───────────────────────────────────────────────────────

#[test]
fn test_recommend_quiet_spectrum() {
    let dir = TempDir::new().unwrap();
    let scan = empty_scan(&dir);
    channelor_cmd()
        .args(["recommend", "--scan", path_arg(&scan), "-o", "plain"])
        .assert()
        .success()
        .stdout("12\n13\n11\n");
}

#[test]
fn test_recommend_avoids_wifi_channel_one() {
    let dir = TempDir::new().unwrap();
    let scan = write_file(
        &dir,
        "scan.yaml",
        "- ssid: Net1\n  frequency: 2412\n  rssi: -40\n",
    );
    channelor_cmd()
        .args(["recommend", "--scan", path_arg(&scan), "-o", "plain"])
        .assert()
        .success()
        .stdout("16\n17\n15\n");
}

#[test]
fn test_recommend_json_marks_best_zll_last() {
    let dir = TempDir::new().unwrap();
    let scan = empty_scan(&dir);
    let output = channelor_cmd()
        .args(["recommend", "--scan", path_arg(&scan), "-o", "json-compact"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let picks = value.as_array().unwrap();
    assert_eq!(picks.len(), 3);
    assert_eq!(picks[0]["pick"], "quietest");
    assert_eq!(picks[2]["pick"], "best_zll");
    assert_eq!(picks[2]["channel_number"], 11);
    assert_eq!(picks[2]["rank"], 3);
}

#[test]
fn test_recommend_5ghz_network_never_overlaps() {
    let dir = TempDir::new().unwrap();
    let scan = write_file(
        &dir,
        "mixed.json",
        r#"[{"ssid":"Fast","frequency":5180,"rssi":-30}]"#,
    );
    channelor_cmd()
        .args(["recommend", "--scan", path_arg(&scan), "-o", "plain", "--all-bands"])
        .assert()
        .success()
        .stdout("12\n13\n11\n");
}

#[test]
fn test_missing_scan_file() {
    channelor_cmd()
        .args(["recommend", "--scan", "/tmp/channelor-no-such-scan.json"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_malformed_scan_file() {
    let dir = TempDir::new().unwrap();
    let scan = write_file(&dir, "bad.json", "{\"nope\": true}");
    channelor_cmd()
        .args(["recommend", "--scan", path_arg(&scan)])
        .assert()
        .code(65);
}

// ── watch ───────────────────────────────────────────────────────────

#[test]
fn test_watch_reads_snapshots_from_file() {
    let dir = TempDir::new().unwrap();
    let input = write_file(
        &dir,
        "scans.ndjson",
        "[]\n\n[{\"ssid\":\"Net1\",\"frequency\":2412,\"rssi\":-40}]\n",
    );
    channelor_cmd()
        .args(["watch", "--input", path_arg(&input), "-o", "plain"])
        .assert()
        .success()
        .stdout("12 13 11\n16 17 15\n");
}

#[test]
fn test_watch_reads_stdin_as_json_lines() {
    let output = channelor_cmd()
        .args(["watch", "-o", "json"])
        .write_stdin("[]\n[{\"ssid\":\"Net1\",\"frequency\":2412,\"rssi\":-40}]\n")
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<serde_json::Value> = stdout
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["snapshot"], 1);
    assert_eq!(lines[1]["networks"], 1);
    assert_eq!(lines[1]["best_zll"], 15);
}

#[test]
fn test_watch_rejects_bad_line() {
    channelor_cmd()
        .args(["watch", "-o", "plain"])
        .write_stdin("[]\nnot json\n")
        .assert()
        .code(65)
        .stdout("12 13 11\n")
        .stderr(predicate::str::contains("line 2"));
}

#[test]
fn test_watch_rejects_zero_settle_delay() {
    channelor_cmd()
        .args(["watch", "--settle-delay", "0s"])
        .write_stdin("")
        .assert()
        .code(2);
}

// ── config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path_honours_flag() {
    channelor_cmd()
        .args(["config", "path", "--config", "/tmp/channelor-test/custom.toml"])
        .assert()
        .success()
        .stdout("/tmp/channelor-test/custom.toml\n");
}

#[test]
fn test_config_init_then_refuse_overwrite() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");

    channelor_cmd()
        .args(["config", "init", "--config", path_arg(&path)])
        .assert()
        .success();
    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.contains("settle_delay_ms = 1000"));

    channelor_cmd()
        .args(["config", "init", "--config", path_arg(&path)])
        .write_stdin("")
        .assert()
        .code(2);

    channelor_cmd()
        .args(["config", "init", "--config", path_arg(&path), "--yes"])
        .assert()
        .success();
}

#[test]
fn test_config_output_default_applies() {
    let dir = TempDir::new().unwrap();
    let config = write_file(&dir, "config.toml", "[defaults]\noutput = \"plain\"\n");
    let scan = empty_scan(&dir);
    channelor_cmd()
        .args([
            "recommend",
            "--scan",
            path_arg(&scan),
            "--config",
            path_arg(&config),
        ])
        .assert()
        .success()
        .stdout("12\n13\n11\n");
}

#[test]
fn test_config_show_toml() {
    channelor_cmd()
        .args(["config", "show", "--config", "/tmp/channelor-test/absent.toml"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("[pipeline]").and(predicate::str::contains("only_24ghz = true")),
        );
}
