//! 分配器接口与一次分配周期的汇总

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{FairShareAllocator, IpactAllocator};
use crate::config::AllocationPolicy;
use crate::error::{GponError, Result};
use crate::net::ElementId;

/// 一个终端在本周期的带宽请求
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandwidthRequest {
    pub terminal_id: ElementId,
    pub requested_mbps: f64,
}

/// 授权结果
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Grant {
    pub terminal_id: ElementId,
    pub requested_mbps: f64,
    pub granted_mbps: f64,
    /// granted / requested * 100；请求为 0 时为 0
    pub utilization_pct: f64,
}

impl Grant {
    pub(crate) fn new(terminal_id: ElementId, requested_mbps: f64, granted_mbps: f64) -> Self {
        let utilization_pct = if requested_mbps > 0.0 {
            granted_mbps / requested_mbps * 100.0
        } else {
            0.0
        };
        Self {
            terminal_id,
            requested_mbps,
            granted_mbps,
            utilization_pct,
        }
    }
}

/// 带宽分配器
pub trait BandwidthAllocator: std::fmt::Debug + Send {
    /// 本周期的总容量（Mbps）
    fn capacity_mbps(&self) -> f64;

    /// 剩余容量（Mbps）
    fn remaining_mbps(&self) -> f64;

    /// 处理一个请求。负数或非有限值返回 `InvalidRequest`，不改变剩余容量。
    fn grant(&mut self, req: BandwidthRequest) -> Result<Grant>;
}

pub(crate) fn check_request(req: &BandwidthRequest) -> Result<()> {
    if !req.requested_mbps.is_finite() || req.requested_mbps < 0.0 {
        return Err(GponError::InvalidRequest(format!(
            "terminal {:?} requested {} Mbps",
            req.terminal_id, req.requested_mbps
        )));
    }
    Ok(())
}

/// 按策略创建一个新周期的分配器。`requesters` 仅公平分配使用。
pub fn allocator_for(
    policy: AllocationPolicy,
    capacity_mbps: f64,
    requesters: usize,
) -> Box<dyn BandwidthAllocator> {
    match policy {
        AllocationPolicy::Ipact => Box::new(IpactAllocator::new(capacity_mbps)),
        AllocationPolicy::Fair => Box::new(FairShareAllocator::new(capacity_mbps, requesters)),
    }
}

/// 一次分配周期的结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationSummary {
    pub grants: Vec<Grant>,
    pub total_requested_mbps: f64,
    pub total_granted_mbps: f64,
    pub total_capacity_mbps: f64,
    pub remaining_capacity_mbps: f64,
    /// total_granted / capacity * 100
    pub global_utilization_pct: f64,
}

impl AllocationSummary {
    pub fn from_grants(grants: Vec<Grant>, capacity_mbps: f64, remaining_mbps: f64) -> Self {
        let total_requested_mbps = grants.iter().map(|g| g.requested_mbps).sum();
        let total_granted_mbps: f64 = grants.iter().map(|g| g.granted_mbps).sum();
        let global_utilization_pct = if capacity_mbps > 0.0 {
            total_granted_mbps / capacity_mbps * 100.0
        } else {
            0.0
        };
        Self {
            grants,
            total_requested_mbps,
            total_granted_mbps,
            total_capacity_mbps: capacity_mbps,
            remaining_capacity_mbps: remaining_mbps,
            global_utilization_pct,
        }
    }
}

/// 按给定顺序处理整批请求。任何一个请求非法则整批失败。
#[tracing::instrument(skip(allocator, requests), fields(requests = requests.len(), capacity = allocator.capacity_mbps()))]
pub fn allocate(
    allocator: &mut dyn BandwidthAllocator,
    requests: &[BandwidthRequest],
) -> Result<AllocationSummary> {
    requests.iter().try_for_each(check_request)?;

    let grants = requests
        .iter()
        .map(|r| allocator.grant(*r))
        .collect::<Result<Vec<_>>>()?;
    let summary =
        AllocationSummary::from_grants(grants, allocator.capacity_mbps(), allocator.remaining_mbps());
    debug!(
        granted = summary.total_granted_mbps,
        remaining = summary.remaining_capacity_mbps,
        "分配周期完成"
    );
    Ok(summary)
}
