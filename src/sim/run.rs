//! 仿真结果
//!
//! 一次仿真运行产生的指标记录与汇总，计算完成后不再修改。

use serde::{Deserialize, Serialize};

use super::demand::ServiceKind;
use crate::config::AllocationPolicy;
use crate::dba::AllocationSummary;
use crate::net::ElementId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// 有效吞吐（Mbps）
    Throughput,
    PacketsSent,
    BytesSent,
    /// 授权 / 请求（%）
    Utilization,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub terminal_id: ElementId,
    pub kind: MetricKind,
    pub value: f64,
    /// 仿真时间戳（秒）
    pub timestamp_s: f64,
}

/// 单个终端在整次运行中的结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerminalOutcome {
    pub terminal_id: ElementId,
    pub terminal_name: String,
    /// None 表示使用了声明速率
    pub synthesized: Option<ServiceKind>,
    pub requested_mbps: f64,
    pub granted_mbps: f64,
    pub is_valid: bool,
    pub effective_throughput_mbps: f64,
    pub bytes_sent: f64,
    pub packets_sent: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRun {
    pub id: u64,
    pub topology_id: u64,
    pub name: String,
    pub duration_s: f64,
    pub policy: AllocationPolicy,
    pub metrics: Vec<Metric>,
    pub terminals: Vec<TerminalOutcome>,
    pub allocation: AllocationSummary,
    pub total_throughput_mbps: f64,
    pub average_throughput_mbps: f64,
    pub total_packets: u64,
}

impl SimulationRun {
    pub fn metrics_of(&self, kind: MetricKind) -> impl Iterator<Item = &Metric> {
        self.metrics.iter().filter(move |m| m.kind == kind)
    }
}
