//! 光纤段
//!
//! 拓扑图中的有向边：从 `from` 元素指向 `to` 元素。

use serde::{Deserialize, Serialize};

use super::id::{ElementId, SpanId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiberSpan {
    pub id: SpanId,
    pub name: String,
    pub from: ElementId,
    pub to: ElementId,
    pub length_km: f64,
    /// 衰减系数（dB/km）
    pub attenuation_db_per_km: f64,
}

impl FiberSpan {
    /// 光纤本身的衰减（不含熔接）
    pub fn fiber_loss_db(&self) -> f64 {
        self.length_km * self.attenuation_db_per_km
    }
}
