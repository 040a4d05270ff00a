use assert_cmd::prelude::*;
use rstest::rstest;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::tempdir;

fn write_config(dir: &tempfile::TempDir, extra: &str) -> PathBuf {
    let toml = format!(
        r#"
[[devices]]
kind = "hinge"
name = "Tank Control Left"
angle_deg = 30.0

[[devices]]
kind = "hinge"
name = "Tank Control Gear"
angle_deg = 18.0

[[devices]]
kind = "rotor"
name = "Tank Drive Left"
{extra}
"#
    );
    let path = dir.path().join("cfg.toml");
    fs::write(&path, toml).unwrap();
    path
}

fn json_lines(out: &[u8]) -> Vec<serde_json::Value> {
    String::from_utf8_lossy(out)
        .lines()
        .filter(|l| l.starts_with('{'))
        .map(|l| serde_json::from_str(l).expect("valid JSON"))
        .collect()
}

/// One JSON line per tick with gear ratio, per-lever outputs and write counts.
#[rstest]
fn jsonl_tick_schema() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, "");

    let out = Command::cargo_bin("tank")
        .unwrap()
        .arg("--json")
        .arg("--log-level")
        .arg("error")
        .arg("--config")
        .arg(&cfg)
        .args(["run", "--ticks", "3", "--print-runtime"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let lines = json_lines(&out);
    assert_eq!(lines.len(), 4, "3 ticks plus the summary");

    let first = &lines[0];
    assert_eq!(first["tick"].as_u64(), Some(1));
    assert!((first["gear_ratio"].as_f64().unwrap() - 0.36).abs() < 1e-4);
    assert_eq!(first["writes"].as_u64(), Some(1));

    let levers = first["levers"].as_array().expect("levers array");
    assert_eq!(levers.len(), 2);
    assert_eq!(levers[0]["channel"], "Gear");
    assert_eq!(levers[1]["name"], "Tank Control Left");
    assert!((levers[1]["output"].as_f64().unwrap() - 10.8).abs() < 1e-4);
    for key in ["angle_deg", "raw_angle_deg"] {
        assert!(levers[1][key].as_f64().is_some(), "{key} should be a number");
    }
    assert_eq!(levers[1]["unlocked"], false);

    // Steady levers: later ticks write nothing.
    assert_eq!(lines[1]["writes"].as_u64(), Some(0));

    let summary = &lines[3];
    assert_eq!(summary["ticks"].as_u64(), Some(3));
    assert_eq!(summary["writes"].as_u64(), Some(1));
    assert!(summary["duration_ms"].as_u64().is_some());
    assert_eq!(summary["stopped_by_shutdown"], false);
}

#[rstest]
fn jsonl_discover_schema() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, "");

    let out = Command::cargo_bin("tank")
        .unwrap()
        .arg("--json")
        .arg("--config")
        .arg(&cfg)
        .arg("discover")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let lines = json_lines(&out);
    let v = &lines[0];

    assert_eq!(v["levers"].as_array().map(Vec::len), Some(2));
    assert_eq!(v["left_drives"][0], "Tank Drive Left");
    assert_eq!(v["right_drives"].as_array().map(Vec::len), Some(0));
    assert_eq!(v["foreign_ignored"].as_u64(), Some(0));
    assert!(v["warnings"].as_array().unwrap().is_empty());
}

/// Structured error on stderr when a config value is out of range.
#[rstest]
fn json_error_schema() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, "\n[engine]\nunlock_limit_deg = 0.0\n");

    let out = Command::cargo_bin("tank")
        .unwrap()
        .arg("--json")
        .arg("--config")
        .arg(&cfg)
        .arg("self-check")
        .assert()
        .failure()
        .get_output()
        .stderr
        .clone();
    let lines = json_lines(&out);
    let err = lines
        .iter()
        .find(|v| v.get("reason").is_some())
        .expect("error JSON on stderr");

    assert_eq!(err["reason"], "Error");
    assert!(err["message"].as_str().unwrap().contains("unlock_limit_deg"));
    assert_eq!(err["exit_code"].as_i64(), Some(1));
}
