use super::{EPS, approx, head_end, single_drop};
use crate::config::{HeadEndSpec, OpticalProfile};
use crate::error::GponError;
use crate::net::{Network, SplitRatio, Splitter, SplitterRole, Terminal};
use crate::optics::{compute_power_budget, splice_count, splitter_loss_db};
use crate::topo::{TopologyOpts, TopologyShape, build_topology};

fn ratio(k: u32) -> SplitRatio {
    SplitRatio::new(k).unwrap()
}

#[test]
fn worked_example_1_32_over_5_km() {
    let (net, onu) = single_drop(head_end(5.0, -28.0), ratio(32), 2.0, 3.0);
    let report = compute_power_budget(&net, &OpticalProfile::default()).unwrap();
    assert_eq!(report.len(), 1);

    let b = &report[0];
    assert_eq!(b.terminal_id, onu);
    assert!(approx(b.budget.power_budget_db, 33.0, EPS));
    assert!(approx(b.budget.splitter_loss_db, 15.05, 0.01));
    assert!(approx(b.budget.fiber_loss_db, 1.0, 1e-6));
    assert!(approx(b.budget.path_length_km, 5.0, 1e-6));
    assert_eq!(b.budget.splice_count, 3);
    assert!(approx(b.budget.splice_loss_db, 0.3, 1e-6));
    assert!(approx(b.total_loss_db(), 16.35, 0.01));
    assert!(approx(b.available_power_db(), 13.65, 0.01));
    assert!(b.is_valid());
    assert_eq!(b.splitters_traversed, 1);
    assert_eq!(b.span_losses.len(), 2);
    assert!(b.exceeds_class_ceiling);
}

#[test]
fn splitter_loss_values_and_monotonicity() {
    let expected = [(8, 9.03), (16, 12.04), (32, 15.05), (64, 18.06)];
    for (k, db) in expected {
        assert!(
            approx(splitter_loss_db(ratio(k)), db, 0.01),
            "1:{k} loss {}",
            splitter_loss_db(ratio(k))
        );
    }
    assert!(splitter_loss_db(ratio(64)) > splitter_loss_db(ratio(32)));
    assert!(splitter_loss_db(ratio(32)) > splitter_loss_db(ratio(16)));
    assert!(splitter_loss_db(ratio(16)) > splitter_loss_db(ratio(8)));
}

#[test]
fn splice_count_is_one_per_interval_plus_baseline() {
    assert_eq!(splice_count(0.0, 2.0), 1);
    assert_eq!(splice_count(1.99, 2.0), 1);
    assert_eq!(splice_count(2.0, 2.0), 2);
    assert_eq!(splice_count(5.0, 2.0), 3);
    assert_eq!(splice_count(0.1 + 0.2 + 0.3 + 1.4, 2.0), 2);
    assert_eq!(splice_count(10.0, 0.0), 1);
}

#[test]
fn long_path_behind_1_64_is_invalid() {
    let (net, _) = single_drop(HeadEndSpec::default().into(), ratio(64), 20.0, 20.0);
    let report = compute_power_budget(&net, &OpticalProfile::default()).unwrap();
    let b = &report[0];
    assert!(b.available_power_db() < 0.0);
    assert!(!b.is_valid());
    // 29.5 dB 的缺省预算高于 B+ 上限，只做提示
    assert!(b.exceeds_class_ceiling);
}

#[test]
fn available_power_identity_holds_for_every_shape() {
    let optical = OpticalProfile::default();
    for shape in TopologyShape::ALL {
        let opts = TopologyOpts {
            shape,
            terminal_count: 12,
            split_ratio: ratio(16),
            ..TopologyOpts::default()
        };
        let topo = build_topology(&opts, &optical).unwrap();
        let report = compute_power_budget(&topo.network, &optical).unwrap();
        assert_eq!(report.len(), 12, "{shape}");

        for b in &report {
            let lhs = b.available_power_db();
            let rhs = b.budget.power_budget_db - b.total_loss_db() - optical.safety_margin_db;
            assert!(approx(lhs, rhs, EPS), "{shape}: {lhs} vs {rhs}");
            assert_eq!(b.is_valid(), lhs >= 0.0);

            let sum = b.budget.fiber_loss_db + b.budget.splice_loss_db + b.budget.splitter_loss_db;
            assert!(approx(b.total_loss_db(), sum, EPS));
            assert!(approx(
                b.budget.splitter_loss_db,
                b.splitters_traversed as f64 * splitter_loss_db(ratio(16)),
                EPS
            ));
        }
    }
}

#[test]
fn power_budget_is_idempotent_and_matches_annotation() {
    let optical = OpticalProfile::default();
    let opts = TopologyOpts {
        shape: TopologyShape::Tree,
        terminal_count: 40,
        split_ratio: ratio(32),
        ..TopologyOpts::default()
    };
    let topo = build_topology(&opts, &optical).unwrap();

    let first = compute_power_budget(&topo.network, &optical).unwrap();
    let second = compute_power_budget(&topo.network, &optical).unwrap();
    assert_eq!(first, second);

    for (b, (e, t)) in first.iter().zip(topo.network.terminals()) {
        assert_eq!(b.terminal_id, e.id);
        assert_eq!(b.total_loss_db(), t.total_loss_db);
        assert_eq!(b.available_power_db(), t.available_power_db);
        assert_eq!(b.is_valid(), t.is_valid);
    }
}

#[test]
fn every_chain_splitter_on_the_path_is_counted_once() {
    let opts = TopologyOpts {
        shape: TopologyShape::Bus,
        terminal_count: 10,
        split_ratio: ratio(8),
        ..TopologyOpts::default()
    };
    let topo = build_topology(&opts, &OpticalProfile::default()).unwrap();
    let report = compute_power_budget(&topo.network, &OpticalProfile::default()).unwrap();

    // 1:8 的总线每级接 7 个终端
    assert!(report[..7].iter().all(|b| b.splitters_traversed == 1));
    assert!(report[7..].iter().all(|b| b.splitters_traversed == 2));
}

#[test]
fn unreachable_terminal_is_a_graph_inconsistency() {
    let mut net = Network::default();
    let olt = net.add_head_end("OLT-1", HeadEndSpec::default().into());
    let sp = net.add_splitter(
        "SPLIT-1",
        Splitter {
            ratio: ratio(8),
            role: SplitterRole::Root,
        },
    );
    net.add_terminal("ONU-1", Terminal::default());
    net.connect("FIBER-FEEDER", olt, sp, 1.0, 0.2);

    let err = compute_power_budget(&net, &OpticalProfile::default()).unwrap_err();
    assert!(matches!(err, GponError::GraphInconsistency(_)), "{err}");
}
