mod api;
mod config_profile;
mod optical_budget;

use crate::config::{HeadEndSpec, OpticalProfile};
use crate::net::{ElementId, HeadEnd, Network, SplitRatio, Splitter, SplitterRole, Terminal};

pub(crate) const EPS: f64 = 1e-9;

pub(crate) fn approx(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol
}

pub(crate) fn head_end(tx_power_dbm: f64, rx_sensitivity_dbm: f64) -> HeadEnd {
    HeadEnd::from(HeadEndSpec {
        tx_power_dbm,
        rx_sensitivity_dbm,
        ..HeadEndSpec::default()
    })
}

/// OLT --feeder--> 1:K --drop--> ONU
pub(crate) fn single_drop(
    he: HeadEnd,
    ratio: SplitRatio,
    feeder_km: f64,
    drop_km: f64,
) -> (Network, ElementId) {
    let atten = OpticalProfile::default().attenuation_db_per_km;
    let mut net = Network::default();
    let olt = net.add_head_end("OLT-1", he);
    let sp = net.add_splitter(
        "SPLIT-1",
        Splitter {
            ratio,
            role: SplitterRole::Root,
        },
    );
    let onu = net.add_terminal("ONU-1", Terminal::default());
    net.connect("FIBER-FEEDER", olt, sp, feeder_km, atten);
    net.connect("FIBER-DROP-1", sp, onu, drop_km, atten);
    (net, onu)
}
