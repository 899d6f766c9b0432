use std::fs;

use crate::config::{AllocationPolicy, SimProfile};
use crate::error::GponError;
use crate::topo::TopologyShape;

#[test]
fn defaults_match_gpon_constants() {
    let p = SimProfile::default();
    assert_eq!(p.head_end.tx_power_dbm, 2.5);
    assert_eq!(p.head_end.rx_sensitivity_dbm, -27.0);
    assert_eq!(p.head_end.upstream_capacity_mbps, 1250.0);
    assert_eq!(p.head_end.downstream_capacity_mbps, 2500.0);
    assert_eq!(p.optical.safety_margin_db, 3.0);
    assert_eq!(p.optical.attenuation_db_per_km, 0.2);
    assert_eq!(p.optical.splice_interval_km, 2.0);
    assert_eq!(p.optical.splice_loss_db, 0.1);
    assert_eq!(p.traffic.overhead_fraction, 0.05);
    assert_eq!(p.traffic.policy, AllocationPolicy::Ipact);
    assert_eq!(p.analysis.latency_factors.get(TopologyShape::Bus), 1.5);
    assert_eq!(p.analysis.latency_factors.get(TopologyShape::Ring), 1.2);
    assert_eq!(p.analysis.latency_factors.get(TopologyShape::Tree), 1.1);
}

#[test]
fn partial_json_keeps_defaults_for_missing_fields() {
    let p = SimProfile::from_json_str(
        r#"{
            "optical": { "safety_margin_db": 4.5 },
            "traffic": { "policy": "fair" }
        }"#,
    )
    .unwrap();
    assert_eq!(p.optical.safety_margin_db, 4.5);
    assert_eq!(p.optical.attenuation_db_per_km, 0.2);
    assert_eq!(p.traffic.policy, AllocationPolicy::Fair);
    assert_eq!(p.traffic.average_packet_bytes, 1500.0);
    assert_eq!(p.head_end, SimProfile::default().head_end);

    assert_eq!(SimProfile::from_json_str("{}").unwrap(), SimProfile::default());
}

#[test]
fn malformed_profile_is_a_config_error() {
    let err = SimProfile::from_json_str(r#"{ "traffic": { "policy": "priority" } }"#).unwrap_err();
    assert!(matches!(err, GponError::Config(_)));
    assert_eq!(err.code(), "INVALID_CONFIG");
}

#[test]
fn profile_loads_from_file() {
    let path = std::env::temp_dir().join(format!("gpon-sim-profile-{}.json", std::process::id()));
    fs::write(&path, r#"{ "head_end": { "tx_power_dbm": 5.0, "rx_sensitivity_dbm": -28.0 } }"#)
        .expect("write profile");
    let p = SimProfile::from_json_file(&path).unwrap();
    fs::remove_file(&path).ok();
    assert_eq!(p.head_end.tx_power_dbm, 5.0);
    assert_eq!(p.head_end.rx_sensitivity_dbm, -28.0);
    assert_eq!(p.head_end.upstream_capacity_mbps, 1250.0);

    let missing = SimProfile::from_json_file(path.with_extension("missing")).unwrap_err();
    assert_eq!(missing.code(), "IO_ERROR");
}
