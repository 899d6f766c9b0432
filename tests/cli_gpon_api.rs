use serde_json::Value;
use std::io::Write;
use std::process::{Command, Stdio};

fn run_session(lines: &[&str]) -> Vec<Value> {
    let mut child = Command::new(env!("CARGO_BIN_EXE_gpon_api"))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn gpon_api");
    {
        let stdin = child.stdin.as_mut().expect("stdin");
        for line in lines {
            writeln!(stdin, "{line}").expect("write request");
        }
    }
    let output = child.wait_with_output().expect("wait gpon_api");
    assert!(
        output.status.success(),
        "gpon_api failed: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|l| serde_json::from_str(l).expect("response json"))
        .collect()
}

#[test]
fn gpon_api_serves_one_response_per_request() {
    let responses = run_session(&[
        r#"{"op":"health"}"#,
        r#"{"op":"create_topology","name":"lab","terminal_count":4,"split_ratio":"1:8","shape":"tree"}"#,
        "",
        r#"{"op":"get_power_budget","topology_id":1}"#,
        r#"{"op":"run_simulation","topology_id":1,"name":"smoke","duration_seconds":2.5}"#,
        r#"{"op":"get_topology","id":2}"#,
    ]);
    assert_eq!(responses.len(), 5);

    assert_eq!(responses[0]["data"]["status"], "healthy");
    assert_eq!(responses[1]["success"], true);
    assert_eq!(responses[1]["data"]["id"], 1);
    assert_eq!(responses[2]["data"].as_array().unwrap().len(), 4);
    assert_eq!(responses[3]["data"]["name"], "smoke");
    assert_eq!(responses[3]["data"]["duration_s"], 2.5);
    assert_eq!(responses[4]["success"], false);
    assert_eq!(responses[4]["error"]["code"], "NOT_FOUND");
}

#[test]
fn gpon_api_reports_malformed_lines() {
    let responses = run_session(&["{", r#"{"op":"health"}"#]);
    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0]["error"]["code"], "INVALID_REQUEST");
    assert_eq!(responses[1]["success"], true);
}
