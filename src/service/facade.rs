//! 仿真服务
//!
//! 编排拓扑构建、光预算、带宽分配与流量仿真，并负责分配 id 与持久化。
//! 所有方法都只需要 `&self`，可在多个线程间共享同一个服务实例。

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::thread;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::store::{MemoryStore, Store};
use crate::analysis::{TopologyMetrics, analyze};
use crate::config::{AllocationPolicy, SimProfile};
use crate::dba::{AllocationSummary, BandwidthRequest, allocate, allocator_for};
use crate::error::{GponError, Result};
use crate::net::SplitRatio;
use crate::optics::{TerminalBudget, compute_power_budget};
use crate::sim::{SimulationRun, TrafficSimulator};
use crate::topo::{SpanPlan, Topology, TopologyOpts, TopologyShape, build_topology};

fn default_topology_name() -> String {
    "GPON Network".to_string()
}

fn default_split_ratio() -> String {
    SplitRatio::default().to_string()
}

fn default_run_name() -> String {
    "Simulation".to_string()
}

/// 创建拓扑的请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTopology {
    #[serde(default = "default_topology_name")]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub terminal_count: usize,
    /// "1:N" 形式，在服务内解析以便返回 `InvalidSplitRatio`
    #[serde(default = "default_split_ratio")]
    pub split_ratio: String,
    #[serde(default)]
    pub shape: TopologyShape,
    #[serde(default)]
    pub span_plan: Option<SpanPlan>,
    #[serde(default)]
    pub traffic_rates: Vec<f64>,
}

impl Default for CreateTopology {
    fn default() -> Self {
        Self {
            name: default_topology_name(),
            description: String::new(),
            terminal_count: 32,
            split_ratio: default_split_ratio(),
            shape: TopologyShape::Star,
            span_plan: None,
            traffic_rates: Vec::new(),
        }
    }
}

/// 一次仿真的请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSimulation {
    pub topology_id: u64,
    #[serde(default = "default_run_name")]
    pub name: String,
    pub duration_seconds: f64,
}

/// 拓扑列表中的一项
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopologySummary {
    pub id: u64,
    pub name: String,
    pub description: String,
    pub shape: TopologyShape,
    pub split_ratio: SplitRatio,
    pub terminal_count: usize,
    pub valid_terminals: usize,
    pub simulations: usize,
}

/// 仿真服务，`S` 为外部提供的存储
#[derive(Debug)]
pub struct SimulationService<S: Store = MemoryStore> {
    store: S,
    simulator: TrafficSimulator,
    next_topology_id: AtomicU64,
    next_run_id: AtomicU64,
}

impl SimulationService<MemoryStore> {
    pub fn new(profile: SimProfile) -> Self {
        Self::with_store(MemoryStore::new(), profile)
    }
}

impl Default for SimulationService<MemoryStore> {
    fn default() -> Self {
        Self::new(SimProfile::default())
    }
}

impl<S: Store> SimulationService<S> {
    pub fn with_store(store: S, profile: SimProfile) -> Self {
        Self {
            store,
            simulator: TrafficSimulator::new(profile),
            next_topology_id: AtomicU64::new(1),
            next_run_id: AtomicU64::new(1),
        }
    }

    pub fn profile(&self) -> &SimProfile {
        self.simulator.profile()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    #[tracing::instrument(skip(self, req), fields(shape = %req.shape, terminals = req.terminal_count))]
    pub fn create_topology(&self, req: CreateTopology) -> Result<Arc<Topology>> {
        let split_ratio: SplitRatio = req.split_ratio.parse()?;
        let opts = TopologyOpts {
            name: req.name,
            description: req.description,
            shape: req.shape,
            terminal_count: req.terminal_count,
            split_ratio,
            head_end: self.profile().head_end,
            span_plan: req.span_plan,
            traffic_rates: req.traffic_rates,
        };
        let mut topology = build_topology(&opts, &self.profile().optical)?;
        topology.id = self.next_topology_id.fetch_add(1, Ordering::Relaxed);

        let topology = Arc::new(topology);
        self.store.put_topology(Arc::clone(&topology));
        info!(id = topology.id, name = %topology.name, "拓扑已创建");
        Ok(topology)
    }

    pub fn list_topologies(&self) -> Vec<TopologySummary> {
        self.store
            .topologies()
            .into_iter()
            .map(|t| TopologySummary {
                id: t.id,
                name: t.name.clone(),
                description: t.description.clone(),
                shape: t.shape,
                split_ratio: t.split_ratio,
                terminal_count: t.terminal_count,
                valid_terminals: t.network.terminals().filter(|(_, term)| term.is_valid).count(),
                simulations: self.store.runs_for(t.id).len(),
            })
            .collect()
    }

    pub fn get_topology(&self, id: u64) -> Result<Arc<Topology>> {
        self.store
            .topology(id)
            .ok_or(GponError::NotFound { kind: "topology", id })
    }

    /// 删除拓扑及其全部仿真记录
    pub fn delete_topology(&self, id: u64) -> Result<()> {
        self.store
            .remove_topology(id)
            .ok_or(GponError::NotFound { kind: "topology", id })?;
        info!(id, "🗑️ 拓扑已删除");
        Ok(())
    }

    pub fn get_power_budget(&self, topology_id: u64) -> Result<Vec<TerminalBudget>> {
        let topology = self.get_topology(topology_id)?;
        compute_power_budget(&topology.network, &self.profile().optical)
    }

    pub fn analyze_topology(&self, topology_id: u64) -> Result<TopologyMetrics> {
        let topology = self.get_topology(topology_id)?;
        analyze(&topology, &self.profile().analysis)
    }

    /// 运行一次仿真并保存结果
    ///
    /// 仿真期间只持有拓扑的 `Arc`，不持有存储的锁；仿真结束前拓扑被删除时
    /// 结果不会保存，返回 `NotFound`。
    #[tracing::instrument(skip(self, name))]
    pub fn run_simulation(
        &self,
        topology_id: u64,
        name: &str,
        duration_s: f64,
    ) -> Result<Arc<SimulationRun>> {
        let topology = self.get_topology(topology_id)?;
        let mut run = self.simulator.run(&topology, name, duration_s)?;
        run.id = self.next_run_id.fetch_add(1, Ordering::Relaxed);

        let run = Arc::new(run);
        if !self.store.put_run(Arc::clone(&run)) {
            warn!(topology_id, run_id = run.id, "仿真期间拓扑已被删除，结果丢弃");
            return Err(GponError::NotFound {
                kind: "topology",
                id: topology_id,
            });
        }
        Ok(run)
    }

    /// 在工作线程池上并发执行一批仿真，结果与输入顺序一一对应
    pub fn run_batch(&self, jobs: &[RunSimulation]) -> Vec<Result<Arc<SimulationRun>>> {
        let workers = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
            .min(jobs.len().max(1));
        let next = AtomicUsize::new(0);
        debug!(jobs = jobs.len(), workers, "批量仿真开始");

        let mut results: Vec<(usize, Result<Arc<SimulationRun>>)> = thread::scope(|s| {
            let handles: Vec<_> = (0..workers)
                .map(|_| {
                    s.spawn(|| {
                        let mut done = Vec::new();
                        loop {
                            let idx = next.fetch_add(1, Ordering::Relaxed);
                            let Some(job) = jobs.get(idx) else { break };
                            let res =
                                self.run_simulation(job.topology_id, &job.name, job.duration_seconds);
                            done.push((idx, res));
                        }
                        done
                    })
                })
                .collect();
            handles
                .into_iter()
                .flat_map(|h| h.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
                .collect()
        });

        results.sort_by_key(|(idx, _)| *idx);
        results.into_iter().map(|(_, r)| r).collect()
    }

    pub fn get_simulation(&self, id: u64) -> Result<Arc<SimulationRun>> {
        self.store
            .run(id)
            .ok_or(GponError::NotFound { kind: "simulation", id })
    }

    pub fn list_simulations(&self, topology_id: u64) -> Result<Vec<Arc<SimulationRun>>> {
        self.get_topology(topology_id)?;
        Ok(self.store.runs_for(topology_id))
    }

    /// 单独运行一个分配周期，容量缺省为局端上行容量，策略缺省取配置
    pub fn allocate_bandwidth(
        &self,
        requests: &[BandwidthRequest],
        total_capacity_mbps: Option<f64>,
        policy: Option<AllocationPolicy>,
    ) -> Result<AllocationSummary> {
        let capacity = total_capacity_mbps.unwrap_or(self.profile().head_end.upstream_capacity_mbps);
        if !capacity.is_finite() || capacity < 0.0 {
            return Err(GponError::InvalidRequest(format!(
                "total capacity must be a non-negative number, got {capacity}"
            )));
        }
        let policy = policy.unwrap_or(self.profile().traffic.policy);
        let mut allocator = allocator_for(policy, capacity, requests.len());
        allocate(allocator.as_mut(), requests)
    }
}
