//! 公平分配：每个请求者至多 capacity / n

use super::allocator::{BandwidthAllocator, BandwidthRequest, Grant, check_request};
use crate::error::Result;

#[derive(Debug, Clone)]
pub struct FairShareAllocator {
    capacity_mbps: f64,
    remaining_mbps: f64,
    fair_share_mbps: f64,
}

impl FairShareAllocator {
    pub fn new(capacity_mbps: f64, requesters: usize) -> Self {
        let capacity_mbps = capacity_mbps.max(0.0);
        let fair_share_mbps = if requesters == 0 {
            capacity_mbps
        } else {
            capacity_mbps / requesters as f64
        };
        Self {
            capacity_mbps,
            remaining_mbps: capacity_mbps,
            fair_share_mbps,
        }
    }

    pub fn fair_share_mbps(&self) -> f64 {
        self.fair_share_mbps
    }
}

impl BandwidthAllocator for FairShareAllocator {
    fn capacity_mbps(&self) -> f64 {
        self.capacity_mbps
    }

    fn remaining_mbps(&self) -> f64 {
        self.remaining_mbps
    }

    fn grant(&mut self, req: BandwidthRequest) -> Result<Grant> {
        check_request(&req)?;
        // 请求者多于声明的 n 时也不会超出总容量
        let granted = req
            .requested_mbps
            .min(self.fair_share_mbps)
            .min(self.remaining_mbps);
        self.remaining_mbps -= granted;
        Ok(Grant::new(req.terminal_id, req.requested_mbps, granted))
    }
}
