//! 分光比
//!
//! "1:N" 形式的分光比；只接受 GPON 常用的 8/16/32/64 路，
//! 非法取值在创建拓扑时就被拒绝，不会拖到损耗计算阶段。

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GponError;

/// 标准分光路数
pub const STANDARD_OUTPUTS: [u32; 4] = [8, 16, 32, 64];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SplitRatio(u32);

impl SplitRatio {
    pub fn new(outputs: u32) -> Result<Self, GponError> {
        if STANDARD_OUTPUTS.contains(&outputs) {
            Ok(Self(outputs))
        } else {
            Err(GponError::InvalidSplitRatio(format!("1:{outputs}")))
        }
    }

    /// 能覆盖 `n` 路的最小标准分光比
    pub fn smallest_covering(n: usize) -> Option<Self> {
        STANDARD_OUTPUTS
            .iter()
            .copied()
            .find(|&k| k as usize >= n)
            .map(Self)
    }

    pub fn outputs(self) -> u32 {
        self.0
    }

    /// 分光损耗 10·log10(N)（dB）
    pub fn loss_db(self) -> f64 {
        10.0 * f64::from(self.0).log10()
    }
}

impl Default for SplitRatio {
    fn default() -> Self {
        Self(32)
    }
}

impl FromStr for SplitRatio {
    type Err = GponError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || GponError::InvalidSplitRatio(s.to_string());
        let (head, tail) = s.trim().split_once(':').ok_or_else(invalid)?;
        if head.trim() != "1" {
            return Err(invalid());
        }
        let outputs: u32 = tail.trim().parse().map_err(|_| invalid())?;
        Self::new(outputs).map_err(|_| invalid())
    }
}

impl TryFrom<String> for SplitRatio {
    type Error = GponError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SplitRatio> for String {
    fn from(value: SplitRatio) -> Self {
        value.to_string()
    }
}

impl fmt::Display for SplitRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "1:{}", self.0)
    }
}
