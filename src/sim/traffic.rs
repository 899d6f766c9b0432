//! 流量仿真
//!
//! 单次快照模型：t=0 时按终端声明顺序为每个终端调度一次轮询事件，
//! 同一时刻的事件按入队顺序执行，因此授权严格先到先得；t=D 时的
//! 快照事件把授权折算为有效吞吐、字节数和包数。光链路不可用的终端
//! 仍参与授权，但有效吞吐为 0。

use tracing::{debug, info, warn};

use super::demand::{DemandModel, ServiceKind};
use super::event::Event;
use super::run::{Metric, MetricKind, SimulationRun, TerminalOutcome};
use super::simulator::Simulator;
use super::time::SimTime;
use crate::config::{SimProfile, TrafficProfile};
use crate::dba::{AllocationSummary, BandwidthAllocator, BandwidthRequest, Grant, allocator_for};
use crate::error::{GponError, Result};
use crate::net::ElementId;
use crate::topo::Topology;

/// 一个终端的输入：请求速率与光链路状态
#[derive(Debug, Clone)]
struct TerminalLoad {
    id: ElementId,
    name: String,
    requested_mbps: f64,
    synthesized: Option<ServiceKind>,
    is_valid: bool,
}

/// 流量仿真的世界状态
#[derive(Debug)]
pub struct TrafficWorld {
    traffic: TrafficProfile,
    duration_s: f64,
    allocator: Box<dyn BandwidthAllocator>,
    loads: Vec<TerminalLoad>,
    grants: Vec<Option<Grant>>,
    outcomes: Vec<TerminalOutcome>,
    metrics: Vec<Metric>,
    error: Option<GponError>,
}

/// t=0：轮询第 idx 个终端并授权
struct PollTerminal {
    idx: usize,
}

impl Event<TrafficWorld> for PollTerminal {
    fn execute(self: Box<Self>, _sim: &mut Simulator<TrafficWorld>, w: &mut TrafficWorld) {
        if w.error.is_some() {
            return;
        }
        let load = &w.loads[self.idx];
        let req = BandwidthRequest {
            terminal_id: load.id,
            requested_mbps: load.requested_mbps,
        };
        match w.allocator.grant(req) {
            Ok(g) => w.grants[self.idx] = Some(g),
            Err(e) => {
                warn!(terminal = %load.name, error = %e, "授权失败");
                w.error = Some(e);
            }
        }
    }
}

/// t=D：把授权折算为吞吐与包数
struct TakeSnapshot;

impl Event<TrafficWorld> for TakeSnapshot {
    fn execute(self: Box<Self>, sim: &mut Simulator<TrafficWorld>, w: &mut TrafficWorld) {
        if w.error.is_some() {
            return;
        }
        let d = w.duration_s;
        debug!(now = ?sim.now(), duration_s = d, "📸 采集指标快照");

        for (load, grant) in w.loads.iter().zip(&w.grants) {
            let (granted_mbps, utilization_pct) = grant
                .as_ref()
                .map(|g| (g.granted_mbps, g.utilization_pct))
                .unwrap_or((0.0, 0.0));
            let effective = if load.is_valid {
                effective_throughput_mbps(granted_mbps, w.traffic.overhead_fraction)
            } else {
                0.0
            };
            let bytes = bytes_sent(effective, d);
            let packets = packets_sent(bytes, w.traffic.average_packet_bytes);

            for (kind, value) in [
                (MetricKind::Throughput, effective),
                (MetricKind::PacketsSent, packets as f64),
                (MetricKind::BytesSent, bytes),
                (MetricKind::Utilization, utilization_pct),
            ] {
                w.metrics.push(Metric {
                    terminal_id: load.id,
                    kind,
                    value,
                    timestamp_s: d,
                });
            }

            w.outcomes.push(TerminalOutcome {
                terminal_id: load.id,
                terminal_name: load.name.clone(),
                synthesized: load.synthesized,
                requested_mbps: load.requested_mbps,
                granted_mbps,
                is_valid: load.is_valid,
                effective_throughput_mbps: effective,
                bytes_sent: bytes,
                packets_sent: packets,
            });
        }
    }
}

/// 扣除封装开销后的有效吞吐
pub fn effective_throughput_mbps(granted_mbps: f64, overhead_fraction: f64) -> f64 {
    granted_mbps * (1.0 - overhead_fraction.clamp(0.0, 1.0))
}

/// 在 `duration_s` 秒内以 `throughput_mbps` 发送的字节数
pub fn bytes_sent(throughput_mbps: f64, duration_s: f64) -> f64 {
    throughput_mbps * 1e6 * duration_s / 8.0
}

/// 按平均包长折算的整包数
pub fn packets_sent(bytes: f64, average_packet_bytes: f64) -> u64 {
    if average_packet_bytes <= 0.0 {
        return 0;
    }
    (bytes / average_packet_bytes).floor() as u64
}

/// 流量仿真器。只读访问拓扑，可在多个线程上并发运行。
#[derive(Debug, Clone, Default)]
pub struct TrafficSimulator {
    profile: SimProfile,
}

impl TrafficSimulator {
    pub fn new(profile: SimProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &SimProfile {
        &self.profile
    }

    /// 对拓扑运行 `duration_s` 秒的仿真
    #[tracing::instrument(skip(self, topology), fields(topology_id = topology.id, shape = %topology.shape))]
    pub fn run(&self, topology: &Topology, name: &str, duration_s: f64) -> Result<SimulationRun> {
        if !duration_s.is_finite() || duration_s <= 0.0 {
            return Err(GponError::InvalidDuration(duration_s));
        }
        let net = &topology.network;
        if net.terminal_count() == 0 {
            return Err(GponError::EmptyTopology(topology.id));
        }
        let head_end = topology
            .head_end()
            .ok_or_else(|| GponError::GraphInconsistency("topology has no head-end".into()))?;

        let traffic = self.profile.traffic;
        let mut demand = DemandModel::seeded(traffic.demand_seed);
        let loads: Vec<TerminalLoad> = net
            .terminals()
            .map(|(e, t)| {
                let (requested_mbps, synthesized) = match t.traffic_rate_mbps {
                    Some(rate) => (rate, None),
                    None => {
                        let (kind, rate) = demand.next_demand();
                        (rate, Some(kind))
                    }
                };
                TerminalLoad {
                    id: e.id,
                    name: e.name.clone(),
                    requested_mbps,
                    synthesized,
                    is_valid: t.is_valid,
                }
            })
            .collect();

        let n = loads.len();
        let mut world = TrafficWorld {
            traffic,
            duration_s,
            allocator: allocator_for(traffic.policy, head_end.upstream_capacity_mbps, n),
            loads,
            grants: vec![None; n],
            outcomes: Vec::with_capacity(n),
            metrics: Vec::with_capacity(n * 4),
            error: None,
        };

        let mut sim = Simulator::default();
        for idx in 0..n {
            sim.schedule(SimTime::ZERO, PollTerminal { idx });
        }
        sim.schedule(SimTime::from_secs_f64(duration_s), TakeSnapshot);
        sim.run(&mut world);
        debug!(events = sim.executed(), "事件执行完毕");

        if let Some(e) = world.error {
            return Err(e);
        }

        let grants: Vec<Grant> = world.grants.iter().flatten().copied().collect();
        let allocation = AllocationSummary::from_grants(
            grants,
            world.allocator.capacity_mbps(),
            world.allocator.remaining_mbps(),
        );
        let total_throughput_mbps: f64 = world
            .outcomes
            .iter()
            .map(|o| o.effective_throughput_mbps)
            .sum();
        // 单个终端的包数已饱和到 u64::MAX，累加同样饱和
        let total_packets = world
            .outcomes
            .iter()
            .map(|o| o.packets_sent)
            .fold(0u64, u64::saturating_add);
        let average_throughput_mbps = total_throughput_mbps / n as f64;

        info!(
            terminals = n,
            valid = world.outcomes.iter().filter(|o| o.is_valid).count(),
            total_throughput_mbps,
            total_packets,
            "✅ 流量仿真完成"
        );

        Ok(SimulationRun {
            id: 0,
            topology_id: topology.id,
            name: name.to_string(),
            duration_s,
            policy: traffic.policy,
            metrics: world.metrics,
            terminals: world.outcomes,
            allocation,
            total_throughput_mbps,
            average_throughput_mbps,
            total_packets,
        })
    }
}
