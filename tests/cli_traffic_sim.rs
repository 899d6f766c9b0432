use serde_json::Value;
use std::fs;
use std::process::Command;

#[test]
fn traffic_sim_prints_summary_and_writes_json() {
    let out_json = std::env::temp_dir().join(format!(
        "gpon-sim-traffic-{}.json",
        std::process::id()
    ));

    let output = Command::new(env!("CARGO_BIN_EXE_traffic_sim"))
        .args([
            "--shape",
            "star",
            "--terminals",
            "3",
            "--split-ratio",
            "1:8",
            "--duration-s",
            "100",
            "--traffic-rate",
            "1000",
            "--traffic-rate",
            "1000",
            "--traffic-rate",
            "1000",
            "--out-json",
            out_json.to_str().unwrap(),
        ])
        .output()
        .expect("run traffic_sim");
    assert!(
        output.status.success(),
        "traffic_sim failed: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("granted=1000.000"));
    assert!(stdout.contains("granted=250.000"));
    assert!(stdout.contains("granted=0.000"));
    assert!(stdout.lines().any(|l| l.starts_with("sim_summary ")));

    let raw = fs::read_to_string(&out_json).expect("read run json");
    let v: Value = serde_json::from_str(&raw).expect("parse run json");
    assert_eq!(v["terminals"].as_array().unwrap().len(), 3);
    assert_eq!(v["duration_s"], 100.0);
    assert_eq!(v["policy"], "ipact");

    let _ = fs::remove_file(&out_json);
}

#[test]
fn traffic_sim_rejects_zero_duration() {
    let output = Command::new(env!("CARGO_BIN_EXE_traffic_sim"))
        .args(["--terminals", "2", "--duration-s", "0"])
        .output()
        .expect("run traffic_sim");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("INVALID_DURATION"));
}

#[test]
fn traffic_sim_fair_policy_splits_capacity() {
    let output = Command::new(env!("CARGO_BIN_EXE_traffic_sim"))
        .args([
            "--terminals",
            "2",
            "--split-ratio",
            "1:8",
            "--policy",
            "fair",
            "--traffic-rate",
            "1000",
            "--traffic-rate",
            "1000",
        ])
        .output()
        .expect("run traffic_sim");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.matches("granted=625.000").count(), 2);
}

#[test]
fn traffic_sim_accepts_fifo_alias_and_rejects_unknown_policy() {
    let output = Command::new(env!("CARGO_BIN_EXE_traffic_sim"))
        .args([
            "--terminals",
            "2",
            "--policy",
            "fifo",
            "--traffic-rate",
            "1000",
            "--traffic-rate",
            "1000",
        ])
        .output()
        .expect("run traffic_sim");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.matches("granted=1000.000").count(), 1);
    assert_eq!(stdout.matches("granted=250.000").count(), 1);

    let output = Command::new(env!("CARGO_BIN_EXE_traffic_sim"))
        .args(["--policy", "round_robin"])
        .output()
        .expect("run traffic_sim");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("round_robin"));
}
