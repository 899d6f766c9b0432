//! 拓扑元素
//!
//! 局端（OLT）、分光器和终端（ONU）。三者放在同一个 arena 中，
//! 用 `ElementKind` 区分，避免对象之间互相持有引用。

use serde::{Deserialize, Serialize};

use super::id::ElementId;
use super::ratio::SplitRatio;
use crate::config::HeadEndSpec;

/// 局端（OLT），拓扑创建后不再改变
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeadEnd {
    pub tx_power_dbm: f64,
    pub rx_sensitivity_dbm: f64,
    pub downstream_capacity_mbps: f64,
    pub upstream_capacity_mbps: f64,
}

impl HeadEnd {
    /// 功率预算 = 发送功率 - 接收灵敏度（dB）
    pub fn power_budget_db(&self) -> f64 {
        self.tx_power_dbm - self.rx_sensitivity_dbm
    }
}

impl From<HeadEndSpec> for HeadEnd {
    fn from(spec: HeadEndSpec) -> Self {
        Self {
            tx_power_dbm: spec.tx_power_dbm,
            rx_sensitivity_dbm: spec.rx_sensitivity_dbm,
            downstream_capacity_mbps: spec.downstream_capacity_mbps,
            upstream_capacity_mbps: spec.upstream_capacity_mbps,
        }
    }
}

/// 分光器在拓扑中的角色，用于之后恢复遍历顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitterRole {
    Root,
    Intermediate,
    /// 总线上的级联分光器
    Chain,
    /// 环上的分光器
    RingMember,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Splitter {
    pub ratio: SplitRatio,
    pub role: SplitterRole,
}

impl Splitter {
    pub fn split_loss_db(&self) -> f64 {
        self.ratio.loss_db()
    }
}

/// 终端（ONU）
///
/// 光预算相关字段由 `optics::annotate` 在拓扑创建时写入。
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Terminal {
    /// 声明的业务速率（Mbps）；None 表示由仿真器合成需求
    pub traffic_rate_mbps: Option<f64>,
    pub total_loss_db: f64,
    pub available_power_db: f64,
    pub is_valid: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ElementKind {
    HeadEnd(HeadEnd),
    Splitter(Splitter),
    Terminal(Terminal),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: ElementId,
    pub name: String,
    #[serde(flatten)]
    pub kind: ElementKind,
}

impl Element {
    pub fn as_splitter(&self) -> Option<&Splitter> {
        match &self.kind {
            ElementKind::Splitter(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_terminal(&self) -> Option<&Terminal> {
        match &self.kind {
            ElementKind::Terminal(t) => Some(t),
            _ => None,
        }
    }

    pub fn is_splitter(&self) -> bool {
        matches!(self.kind, ElementKind::Splitter(_))
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, ElementKind::Terminal(_))
    }
}
