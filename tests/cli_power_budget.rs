use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!(
        "gpon-sim-{prefix}-{}-{nanos}",
        std::process::id()
    ));
    fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

#[test]
fn power_budget_json_matches_worked_example() {
    let dir = unique_temp_dir("power-budget");
    let profile = dir.join("profile.json");
    fs::write(
        &profile,
        r#"{ "head_end": { "tx_power_dbm": 5.0, "rx_sensitivity_dbm": -28.0 } }"#,
    )
    .expect("write profile");

    let output = Command::new(env!("CARGO_BIN_EXE_power_budget"))
        .args([
            "--shape",
            "star",
            "--terminals",
            "4",
            "--split-ratio",
            "1:32",
            "--profile",
            profile.to_str().unwrap(),
            "--json",
        ])
        .output()
        .expect("run power_budget");
    assert!(
        output.status.success(),
        "power_budget failed: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );

    let v: Value = serde_json::from_slice(&output.stdout).expect("parse stdout json");
    let rows = v.as_array().expect("budget rows");
    assert_eq!(rows.len(), 4);

    // 馈线 2 km + 第一条引入段 3 km = 5 km
    let first = &rows[0];
    assert_eq!(first["terminal_name"], "ONU-1");
    assert_eq!(first["splice_count"], 3);
    assert!((first["power_budget_db"].as_f64().unwrap() - 33.0).abs() < 1e-9);
    assert!((first["total_loss_db"].as_f64().unwrap() - 16.35).abs() < 0.01);
    assert!((first["available_power_db"].as_f64().unwrap() - 13.65).abs() < 0.01);
    assert_eq!(first["is_valid"], true);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn power_budget_table_has_summary_line() {
    let output = Command::new(env!("CARGO_BIN_EXE_power_budget"))
        .args(["--shape", "tree", "--terminals", "20", "--split-ratio", "1:8"])
        .output()
        .expect("run power_budget");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let summary = stdout
        .lines()
        .find(|l| l.starts_with("budget_summary "))
        .expect("summary line");
    assert!(summary.contains("shape=tree"));
    assert!(summary.contains("terminals=20"));
    assert_eq!(stdout.lines().filter(|l| l.starts_with("ONU-")).count(), 20);
}

#[test]
fn power_budget_rejects_capacity_overflow() {
    let output = Command::new(env!("CARGO_BIN_EXE_power_budget"))
        .args(["--shape", "star", "--terminals", "9", "--split-ratio", "1:8"])
        .output()
        .expect("run power_budget");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("CAPACITY_EXCEEDED"), "stderr={stderr}");
}
