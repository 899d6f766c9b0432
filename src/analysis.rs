//! 拓扑性能分析
//!
//! 基于实际光路长度给出平均 / 最大路径、传播时延与带宽共享系数。
//! 各形态的时延修正系数和共享系数是经验值，来自 `AnalysisProfile`。

use serde::Serialize;

use crate::config::AnalysisProfile;
use crate::error::{GponError, Result};
use crate::topo::{Topology, TopologyShape};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopologyMetrics {
    pub shape: TopologyShape,
    pub terminals: usize,
    pub total_fiber_km: f64,
    pub avg_path_km: f64,
    pub max_path_km: f64,
    /// 平均单向传播时延（ms），已乘形态修正系数
    pub avg_latency_ms: f64,
    pub bandwidth_sharing_factor: f64,
    /// 上行容量 × 共享系数
    pub effective_capacity_per_terminal_mbps: f64,
}

pub fn analyze(topology: &Topology, profile: &AnalysisProfile) -> Result<TopologyMetrics> {
    let net = &topology.network;
    let routes = net.routes()?;
    let total_fiber_km: f64 = net.spans().iter().map(|s| s.length_km).sum();

    let mut paths = Vec::with_capacity(net.terminal_count());
    for (e, _) in net.terminals() {
        let spans = routes.spans_to(e.id).ok_or_else(|| {
            GponError::GraphInconsistency(format!("no path from head-end to terminal {}", e.name))
        })?;
        let km: f64 = spans
            .iter()
            .filter_map(|id| net.span(*id))
            .map(|s| s.length_km)
            .sum();
        paths.push(km);
    }

    let terminals = paths.len();
    let (avg_path_km, max_path_km) = if terminals == 0 {
        (0.0, 0.0)
    } else {
        (
            paths.iter().sum::<f64>() / terminals as f64,
            paths.iter().copied().fold(0.0, f64::max),
        )
    };

    let speed = profile.fiber_speed_km_per_s;
    let avg_latency_ms = if speed > 0.0 {
        avg_path_km / speed * 1000.0 * profile.latency_factors.get(topology.shape)
    } else {
        0.0
    };
    let bandwidth_sharing_factor = if terminals == 0 {
        0.0
    } else {
        profile.sharing_factors.get(topology.shape) / terminals as f64
    };
    let upstream = topology
        .head_end()
        .map(|h| h.upstream_capacity_mbps)
        .unwrap_or(0.0);

    Ok(TopologyMetrics {
        shape: topology.shape,
        terminals,
        total_fiber_km,
        avg_path_km,
        max_path_km,
        avg_latency_ms,
        bandwidth_sharing_factor,
        effective_capacity_per_terminal_mbps: upstream * bandwidth_sharing_factor,
    })
}
