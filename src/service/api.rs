//! 请求 / 响应绑定
//!
//! 与传输无关的 JSON 形式：请求按 `op` 字段区分操作，响应统一带
//! `success` 标志，失败时附带稳定错误码和可读信息。

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, warn};

use super::facade::{CreateTopology, RunSimulation, SimulationService};
use super::store::Store;
use crate::config::AllocationPolicy;
use crate::dba::BandwidthRequest;
use crate::error::GponError;
use crate::net::Traversal;
use crate::topo::Topology;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    Health,
    CreateTopology(CreateTopology),
    ListTopologies,
    GetTopology {
        id: u64,
    },
    DeleteTopology {
        id: u64,
    },
    GetPowerBudget {
        topology_id: u64,
    },
    AnalyzeTopology {
        topology_id: u64,
    },
    RunSimulation(RunSimulation),
    RunBatch {
        jobs: Vec<RunSimulation>,
    },
    GetSimulation {
        id: u64,
    },
    ListSimulations {
        topology_id: u64,
    },
    AllocateBandwidth {
        requests: Vec<BandwidthRequest>,
        #[serde(default)]
        total_capacity_mbps: Option<f64>,
        #[serde(default)]
        policy: Option<AllocationPolicy>,
    },
}

impl Request {
    pub fn op(&self) -> &'static str {
        match self {
            Request::Health => "health",
            Request::CreateTopology(_) => "create_topology",
            Request::ListTopologies => "list_topologies",
            Request::GetTopology { .. } => "get_topology",
            Request::DeleteTopology { .. } => "delete_topology",
            Request::GetPowerBudget { .. } => "get_power_budget",
            Request::AnalyzeTopology { .. } => "analyze_topology",
            Request::RunSimulation(_) => "run_simulation",
            Request::RunBatch { .. } => "run_batch",
            Request::GetSimulation { .. } => "get_simulation",
            Request::ListSimulations { .. } => "list_simulations",
            Request::AllocateBandwidth { .. } => "allocate_bandwidth",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl Response {
    pub fn ok<T: Serialize + ?Sized>(data: &T) -> Self {
        match serde_json::to_value(data) {
            Ok(v) => Self {
                success: true,
                data: Some(v),
                error: None,
            },
            Err(e) => Self::failure("INTERNAL", e.to_string()),
        }
    }

    pub fn err(e: &GponError) -> Self {
        Self::failure(e.code(), e.to_string())
    }

    fn failure(code: &str, message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ErrorBody {
                code: code.to_string(),
                message,
            }),
        }
    }

    pub fn error_code(&self) -> Option<&str> {
        self.error.as_ref().map(|e| e.code.as_str())
    }
}

/// 拓扑详情：完整的图加上分光器遍历顺序
#[derive(Debug, Serialize)]
struct TopologyDetail<'a> {
    topology: &'a Topology,
    splitter_order: Traversal,
}

impl<S: Store> SimulationService<S> {
    /// 处理一个请求，错误不会向上传播，全部转为失败响应
    #[tracing::instrument(skip(self, req), fields(op = req.op()))]
    pub fn handle(&self, req: Request) -> Response {
        let res = match req {
            Request::Health => Ok(Response::ok(&json!({
                "status": "healthy",
                "service": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION"),
            }))),
            Request::CreateTopology(c) => self.create_topology(c).map(|t| Response::ok(&*t)),
            Request::ListTopologies => Ok(Response::ok(&self.list_topologies())),
            Request::GetTopology { id } => self.get_topology(id).map(|t| {
                Response::ok(&TopologyDetail {
                    topology: &t,
                    splitter_order: t.splitter_order(),
                })
            }),
            Request::DeleteTopology { id } => self
                .delete_topology(id)
                .map(|()| Response::ok(&json!({ "deleted": id }))),
            Request::GetPowerBudget { topology_id } => self
                .get_power_budget(topology_id)
                .map(|b| Response::ok(&b)),
            Request::AnalyzeTopology { topology_id } => self
                .analyze_topology(topology_id)
                .map(|m| Response::ok(&m)),
            Request::RunSimulation(r) => self
                .run_simulation(r.topology_id, &r.name, r.duration_seconds)
                .map(|run| Response::ok(&*run)),
            Request::RunBatch { jobs } => {
                let items: Vec<Response> = self
                    .run_batch(&jobs)
                    .into_iter()
                    .map(|r| match r {
                        Ok(run) => Response::ok(&*run),
                        Err(e) => Response::err(&e),
                    })
                    .collect();
                Ok(Response::ok(&items))
            }
            Request::GetSimulation { id } => self.get_simulation(id).map(|r| Response::ok(&*r)),
            Request::ListSimulations { topology_id } => {
                self.list_simulations(topology_id).map(|runs| {
                    let runs: Vec<_> = runs.iter().map(|r| &**r).collect();
                    Response::ok(&runs)
                })
            }
            Request::AllocateBandwidth {
                requests,
                total_capacity_mbps,
                policy,
            } => self
                .allocate_bandwidth(&requests, total_capacity_mbps, policy)
                .map(|s| Response::ok(&s)),
        };

        res.unwrap_or_else(|e| {
            warn!(code = e.code(), error = %e, "请求失败");
            Response::err(&e)
        })
    }

    /// 解析一行 JSON 请求并处理
    pub fn handle_json(&self, raw: &str) -> Response {
        match serde_json::from_str::<Request>(raw) {
            Ok(req) => self.handle(req),
            Err(e) => {
                debug!(error = %e, "请求解析失败");
                Response::err(&GponError::InvalidRequest(e.to_string()))
            }
        }
    }
}
