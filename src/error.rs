//! 错误类型
//!
//! 核心各组件共用的错误枚举，每个变体都带有稳定的错误码，供 facade 层返回给调用方。

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GponError {
    #[error("terminal count {requested} exceeds capacity {capacity} of {shape} topology with ratio {ratio}")]
    CapacityExceeded {
        requested: usize,
        capacity: usize,
        shape: String,
        ratio: String,
    },

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("invalid split ratio {0:?}: expected one of 1:8, 1:16, 1:32, 1:64")]
    InvalidSplitRatio(String),

    #[error("simulation duration must be a positive number of seconds, got {0}")]
    InvalidDuration(f64),

    #[error("topology {0} has no terminals")]
    EmptyTopology(u64),

    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: u64 },

    #[error("graph inconsistency: {0}")]
    GraphInconsistency(String),

    #[error("failed to read profile: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse profile: {0}")]
    Config(#[from] serde_json::Error),
}

impl GponError {
    /// 稳定错误码（跨版本不变）
    pub fn code(&self) -> &'static str {
        match self {
            GponError::CapacityExceeded { .. } => "CAPACITY_EXCEEDED",
            GponError::InvalidRequest(_) => "INVALID_REQUEST",
            GponError::InvalidSplitRatio(_) => "INVALID_SPLIT_RATIO",
            GponError::InvalidDuration(_) => "INVALID_DURATION",
            GponError::EmptyTopology(_) => "EMPTY_TOPOLOGY",
            GponError::NotFound { .. } => "NOT_FOUND",
            GponError::GraphInconsistency(_) => "GRAPH_INCONSISTENCY",
            GponError::Io(_) => "IO_ERROR",
            GponError::Config(_) => "INVALID_CONFIG",
        }
    }
}

pub type Result<T> = std::result::Result<T, GponError>;
