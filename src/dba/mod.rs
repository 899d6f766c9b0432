//! 动态带宽分配（DBA）
//!
//! 上行共享容量在一个分配周期内按请求逐个授权。IPACT 严格按到达顺序
//! 先到先得，容量耗尽后的请求者得到 0；公平分配则给每个请求者至多
//! capacity / n。两种策略实现同一个 `BandwidthAllocator` 接口。

mod allocator;
mod fair;
mod ipact;

pub use allocator::{
    AllocationSummary, BandwidthAllocator, BandwidthRequest, Grant, allocate, allocator_for,
};
pub use fair::FairShareAllocator;
pub use ipact::IpactAllocator;
