//! 仿真服务层：facade、存储接口和请求 / 响应绑定

mod api;
mod facade;
mod store;

pub use api::{ErrorBody, Request, Response};
pub use facade::{CreateTopology, RunSimulation, SimulationService, TopologySummary};
pub use store::{MemoryStore, Store};
