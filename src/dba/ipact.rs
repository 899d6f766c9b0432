//! IPACT：按到达顺序轮询授权

use tracing::trace;

use super::allocator::{BandwidthAllocator, BandwidthRequest, Grant, check_request};
use crate::error::Result;

#[derive(Debug, Clone)]
pub struct IpactAllocator {
    capacity_mbps: f64,
    remaining_mbps: f64,
}

impl IpactAllocator {
    pub fn new(capacity_mbps: f64) -> Self {
        let capacity_mbps = capacity_mbps.max(0.0);
        Self {
            capacity_mbps,
            remaining_mbps: capacity_mbps,
        }
    }
}

impl BandwidthAllocator for IpactAllocator {
    fn capacity_mbps(&self) -> f64 {
        self.capacity_mbps
    }

    fn remaining_mbps(&self) -> f64 {
        self.remaining_mbps
    }

    fn grant(&mut self, req: BandwidthRequest) -> Result<Grant> {
        check_request(&req)?;
        let granted = req.requested_mbps.min(self.remaining_mbps);
        self.remaining_mbps -= granted;
        trace!(
            terminal = ?req.terminal_id,
            requested = req.requested_mbps,
            granted,
            remaining = self.remaining_mbps,
            "IPACT 授权"
        );
        Ok(Grant::new(req.terminal_id, req.requested_mbps, granted))
    }
}
