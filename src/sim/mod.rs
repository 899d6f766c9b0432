//! 仿真模块
//!
//! 事件驱动仿真核心（时间、事件、仿真器），以及在其上实现的 GPON 上行流量仿真。

// 子模块声明
mod demand;
mod event;
mod run;
mod scheduled_event;
mod simulator;
mod time;
mod traffic;

// 重新导出公共接口
pub use demand::{DemandModel, ServiceKind};
pub use event::Event;
pub use run::{Metric, MetricKind, SimulationRun, TerminalOutcome};
pub use scheduled_event::ScheduledEvent;
pub use simulator::Simulator;
pub use time::SimTime;
pub use traffic::{
    TrafficSimulator, TrafficWorld, bytes_sent, effective_throughput_mbps, packets_sent,
};
