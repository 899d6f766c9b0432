use serde_json::{Value, json};

use crate::service::{Request, Response, SimulationService};

fn call(svc: &SimulationService, req: Value) -> Response {
    svc.handle_json(&req.to_string())
}

fn data(resp: Response) -> Value {
    assert!(resp.success, "unexpected failure: {:?}", resp.error);
    resp.data.expect("data")
}

#[test]
fn health_reports_service_name() {
    let svc = SimulationService::default();
    let d = data(call(&svc, json!({ "op": "health" })));
    assert_eq!(d["status"], "healthy");
    assert_eq!(d["service"], "gpon-sim");
}

#[test]
fn create_get_budget_and_simulate_over_json() {
    let svc = SimulationService::default();
    let topo = data(call(
        &svc,
        json!({
            "op": "create_topology",
            "name": "campus",
            "terminal_count": 6,
            "split_ratio": "1:8",
            "shape": "bus",
        }),
    ));
    let id = topo["id"].as_u64().unwrap();
    assert_eq!(topo["shape"], "bus");
    assert_eq!(topo["split_ratio"], "1:8");

    let detail = data(call(&svc, json!({ "op": "get_topology", "id": id })));
    assert_eq!(detail["topology"]["name"], "campus");
    assert_eq!(detail["splitter_order"]["fell_back"], false);

    let budget = data(call(&svc, json!({ "op": "get_power_budget", "topology_id": id })));
    let rows = budget.as_array().unwrap();
    assert_eq!(rows.len(), 6);
    for row in rows {
        assert!(row["terminal_id"].is_number());
        assert!(row["total_loss_db"].is_number());
        assert!(row["available_power_db"].is_number());
        assert!(row["is_valid"].is_boolean());
    }

    let run = data(call(
        &svc,
        json!({ "op": "run_simulation", "topology_id": id, "duration_seconds": 10.0 }),
    ));
    assert_eq!(run["name"], "Simulation");
    assert_eq!(run["metrics"].as_array().unwrap().len(), 24);
    assert!(run["total_throughput_mbps"].as_f64().unwrap() > 0.0);

    let runs = data(call(&svc, json!({ "op": "list_simulations", "topology_id": id })));
    assert_eq!(runs.as_array().unwrap().len(), 1);

    let listed = data(call(&svc, json!({ "op": "list_topologies" })));
    assert_eq!(listed[0]["simulations"], 1);
}

#[test]
fn failures_carry_stable_codes() {
    let svc = SimulationService::default();
    let cases = [
        (json!({ "op": "get_topology", "id": 42 }), "NOT_FOUND"),
        (
            json!({ "op": "create_topology", "terminal_count": 65, "split_ratio": "1:64" }),
            "CAPACITY_EXCEEDED",
        ),
        (
            json!({ "op": "create_topology", "terminal_count": 4, "split_ratio": "1:3" }),
            "INVALID_SPLIT_RATIO",
        ),
        (
            json!({ "op": "allocate_bandwidth", "requests": [ { "terminal_id": 0, "requested_mbps": -1.0 } ] }),
            "INVALID_REQUEST",
        ),
        (json!({ "op": "teleport" }), "INVALID_REQUEST"),
    ];
    for (req, code) in cases {
        let resp = call(&svc, req.clone());
        assert!(!resp.success, "{req}");
        assert!(resp.data.is_none());
        assert_eq!(resp.error_code(), Some(code), "{req}");
    }

    let resp = svc.handle_json("not json");
    assert_eq!(resp.error_code(), Some("INVALID_REQUEST"));
}

#[test]
fn empty_topology_and_bad_duration_over_json() {
    let svc = SimulationService::default();
    let id = data(call(
        &svc,
        json!({ "op": "create_topology", "terminal_count": 0 }),
    ))["id"]
        .as_u64()
        .unwrap();

    let resp = call(
        &svc,
        json!({ "op": "run_simulation", "topology_id": id, "duration_seconds": 5.0 }),
    );
    assert_eq!(resp.error_code(), Some("EMPTY_TOPOLOGY"));

    let resp = call(
        &svc,
        json!({ "op": "run_simulation", "topology_id": id, "duration_seconds": 0.0 }),
    );
    assert_eq!(resp.error_code(), Some("INVALID_DURATION"));
}

#[test]
fn batch_and_delete_over_json() {
    let svc = SimulationService::default();
    let id = data(call(
        &svc,
        json!({ "op": "create_topology", "terminal_count": 3, "split_ratio": "1:8", "shape": "ring" }),
    ))["id"]
        .as_u64()
        .unwrap();

    let items = data(call(
        &svc,
        json!({
            "op": "run_batch",
            "jobs": [
                { "topology_id": id, "duration_seconds": 1.0 },
                { "topology_id": 999, "duration_seconds": 1.0 },
            ]
        }),
    ));
    let items = items.as_array().unwrap();
    assert_eq!(items[0]["success"], true);
    assert_eq!(items[1]["error"]["code"], "NOT_FOUND");
    let run_id = items[0]["data"]["id"].as_u64().unwrap();

    let deleted = data(call(&svc, json!({ "op": "delete_topology", "id": id })));
    assert_eq!(deleted["deleted"], id);
    let resp = call(&svc, json!({ "op": "get_simulation", "id": run_id }));
    assert_eq!(resp.error_code(), Some("NOT_FOUND"));
}

#[test]
fn requests_round_trip_through_serde() {
    let req: Request = serde_json::from_value(json!({
        "op": "allocate_bandwidth",
        "requests": [],
        "policy": "fair",
    }))
    .unwrap();
    assert_eq!(req.op(), "allocate_bandwidth");
    let back = serde_json::to_value(&req).unwrap();
    assert_eq!(back["op"], "allocate_bandwidth");
}
