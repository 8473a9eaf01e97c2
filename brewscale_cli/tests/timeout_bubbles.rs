use assert_cmd::prelude::*;
use predicates::prelude::*;
use rstest::rstest;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

#[rstest]
#[case("run")]
#[case("self-check")]
#[case("tare")]
fn hx711_timeout_bubbles_to_cli(#[case] subcommand: &str) {
    let dir = tempdir().unwrap();
    let cfg = dir.path().join("cfg.toml");
    fs::write(&cfg, "[hx711]\nread_timeout_ms = 20\n").unwrap();

    let mut cmd = Command::cargo_bin("brewscale").unwrap();
    cmd.env("BREWSCALE_SIM_TIMEOUT", "1")
        .env_remove("RUST_LOG")
        .arg("--config")
        .arg(&cfg)
        .arg(subcommand);
    cmd.assert()
        .code(3)
        .stderr(predicate::str::contains("What happened: Scale read timed out"));
}

#[test]
fn hx711_timeout_in_json_mode() {
    let dir = tempdir().unwrap();
    let cfg = dir.path().join("cfg.toml");
    fs::write(&cfg, "[hx711]\nread_timeout_ms = 20\n").unwrap();

    let out = Command::cargo_bin("brewscale")
        .unwrap()
        .env("BREWSCALE_SIM_TIMEOUT", "1")
        .env_remove("RUST_LOG")
        .arg("--config")
        .arg(&cfg)
        .args(["--json", "run", "--cycles", "3"])
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(3));
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(v["reason"], "SensorTimeout");
}
