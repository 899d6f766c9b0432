//! 合成业务需求
//!
//! 未声明速率的终端按 "triple play" 混合业务生成需求：视频、上网、语音各占一种，
//! 速率在各自区间内均匀取值。使用固定种子，同一配置多次运行结果相同。

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    Video,
    Internet,
    Voice,
}

impl ServiceKind {
    /// 速率区间（Mbps，左闭右开）
    pub fn rate_range_mbps(self) -> (f64, f64) {
        match self {
            ServiceKind::Video => (10.0, 25.0),
            ServiceKind::Internet => (5.0, 15.0),
            ServiceKind::Voice => (0.064, 0.1),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DemandModel {
    rng: StdRng,
}

impl DemandModel {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// 下一个终端的业务类型与请求速率
    pub fn next_demand(&mut self) -> (ServiceKind, f64) {
        let kind = match self.rng.random_range(0..3) {
            0 => ServiceKind::Video,
            1 => ServiceKind::Internet,
            _ => ServiceKind::Voice,
        };
        let (lo, hi) = kind.rate_range_mbps();
        (kind, self.rng.random_range(lo..hi))
    }
}
