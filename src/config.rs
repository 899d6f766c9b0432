//! 仿真参数配置
//!
//! 所有经验常数（安全余量、衰减系数、熔接间隔、封装开销、时延修正系数等）
//! 都集中在 `SimProfile` 中，可从 JSON 文件加载；缺省字段取 GPON 常用值。

use std::fs;
use std::path::Path;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::topo::TopologyShape;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimProfile {
    pub head_end: HeadEndSpec,
    pub optical: OpticalProfile,
    pub traffic: TrafficProfile,
    pub analysis: AnalysisProfile,
}

impl SimProfile {
    /// 从 JSON 文件读取配置，未出现的字段使用缺省值
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// 局端（OLT）光模块与容量参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadEndSpec {
    /// 发送光功率（dBm）
    pub tx_power_dbm: f64,
    /// 接收灵敏度（dBm）
    pub rx_sensitivity_dbm: f64,
    pub downstream_capacity_mbps: f64,
    pub upstream_capacity_mbps: f64,
}

impl Default for HeadEndSpec {
    fn default() -> Self {
        Self {
            tx_power_dbm: 2.5,
            rx_sensitivity_dbm: -27.0,
            downstream_capacity_mbps: 2500.0,
            upstream_capacity_mbps: 1250.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpticalProfile {
    pub safety_margin_db: f64,
    /// 新建光纤段的缺省衰减系数（dB/km）
    pub attenuation_db_per_km: f64,
    /// 每隔多少 km 计一个熔接点
    pub splice_interval_km: f64,
    pub splice_loss_db: f64,
    /// GPON class B+ 的功率预算上限，仅用于报告，不做截断
    pub class_ceiling_db: f64,
}

impl Default for OpticalProfile {
    fn default() -> Self {
        Self {
            safety_margin_db: 3.0,
            attenuation_db_per_km: 0.2,
            splice_interval_km: 2.0,
            splice_loss_db: 0.1,
            class_ceiling_db: 28.0,
        }
    }
}

/// 带宽分配策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum AllocationPolicy {
    /// 按到达顺序（FIFO）授权
    #[default]
    #[value(alias = "fifo")]
    Ipact,
    /// 每个请求者至多获得 capacity / n
    Fair,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrafficProfile {
    /// 帧封装开销比例（0..1）
    pub overhead_fraction: f64,
    pub average_packet_bytes: f64,
    /// 合成需求时使用的随机种子
    pub demand_seed: u64,
    pub policy: AllocationPolicy,
}

impl Default for TrafficProfile {
    fn default() -> Self {
        Self {
            overhead_fraction: 0.05,
            average_packet_bytes: 1500.0,
            demand_seed: 42,
            policy: AllocationPolicy::Ipact,
        }
    }
}

/// 每种拓扑形态一个取值
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapeFactors {
    pub star: f64,
    pub bus: f64,
    pub ring: f64,
    pub tree: f64,
}

impl ShapeFactors {
    pub fn get(&self, shape: TopologyShape) -> f64 {
        match shape {
            TopologyShape::Star => self.star,
            TopologyShape::Bus => self.bus,
            TopologyShape::Ring => self.ring,
            TopologyShape::Tree => self.tree,
        }
    }
}

/// 拓扑性能分析用的经验系数（来源未经推导，保持可配置）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisProfile {
    pub latency_factors: ShapeFactors,
    pub sharing_factors: ShapeFactors,
    /// 光在光纤中的传播速度（km/s）
    pub fiber_speed_km_per_s: f64,
}

impl Default for AnalysisProfile {
    fn default() -> Self {
        Self {
            latency_factors: ShapeFactors {
                star: 1.0,
                bus: 1.5,
                ring: 1.2,
                tree: 1.1,
            },
            sharing_factors: ShapeFactors {
                star: 1.0,
                bus: 1.5,
                ring: 1.1,
                tree: 1.2,
            },
            fiber_speed_km_per_s: 200_000.0,
        }
    }
}
