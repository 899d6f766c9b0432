//! 存储接口
//!
//! 持久化引擎由外部提供；核心只依赖 `Store`。拓扑创建后不可变，
//! 以 `Arc` 共享给并发的仿真读取，写操作在锁内串行化。

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::sim::SimulationRun;
use crate::topo::Topology;

pub trait Store: Send + Sync {
    fn put_topology(&self, topology: Arc<Topology>);

    fn topology(&self, id: u64) -> Option<Arc<Topology>>;

    /// 按 id 升序
    fn topologies(&self) -> Vec<Arc<Topology>>;

    /// 删除拓扑并级联删除其仿真记录
    fn remove_topology(&self, id: u64) -> Option<Arc<Topology>>;

    /// 保存仿真记录；所属拓扑已不存在时返回 false 且不保存
    fn put_run(&self, run: Arc<SimulationRun>) -> bool;

    fn run(&self, id: u64) -> Option<Arc<SimulationRun>>;

    /// 某个拓扑的全部仿真记录，按 id 升序
    fn runs_for(&self, topology_id: u64) -> Vec<Arc<SimulationRun>>;
}

#[derive(Debug, Default)]
struct Tables {
    topologies: BTreeMap<u64, Arc<Topology>>,
    runs: BTreeMap<u64, Arc<SimulationRun>>,
}

/// 进程内存储
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn put_topology(&self, topology: Arc<Topology>) {
        let mut t = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        t.topologies.insert(topology.id, topology);
    }

    fn topology(&self, id: u64) -> Option<Arc<Topology>> {
        let t = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        t.topologies.get(&id).cloned()
    }

    fn topologies(&self) -> Vec<Arc<Topology>> {
        let t = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        t.topologies.values().cloned().collect()
    }

    fn remove_topology(&self, id: u64) -> Option<Arc<Topology>> {
        let mut t = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        let removed = t.topologies.remove(&id)?;
        t.runs.retain(|_, r| r.topology_id != id);
        Some(removed)
    }

    fn put_run(&self, run: Arc<SimulationRun>) -> bool {
        let mut t = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        if !t.topologies.contains_key(&run.topology_id) {
            return false;
        }
        t.runs.insert(run.id, run);
        true
    }

    fn run(&self, id: u64) -> Option<Arc<SimulationRun>> {
        let t = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        t.runs.get(&id).cloned()
    }

    fn runs_for(&self, topology_id: u64) -> Vec<Arc<SimulationRun>> {
        let t = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        t.runs
            .values()
            .filter(|r| r.topology_id == topology_id)
            .cloned()
            .collect()
    }
}
