//! 拓扑构建
//!
//! 四种形态（星形、总线、环形、树形）共用一个入口 `build_topology`：
//! 先按形态检查容量，再由各自的构建函数生成元素和光纤段，
//! 最后统一校验图结构并写入每个终端的光预算。

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::{HeadEndSpec, OpticalProfile};
use crate::error::{GponError, Result};
use crate::net::{ElementId, HeadEnd, Network, SplitRatio, Terminal, Traversal, traversal_order};
use crate::optics;

pub mod bus;
pub mod ring;
pub mod star;
pub mod tree;

/// 拓扑形态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopologyShape {
    #[default]
    Star,
    Bus,
    Ring,
    Tree,
}

impl TopologyShape {
    pub const ALL: [TopologyShape; 4] = [
        TopologyShape::Star,
        TopologyShape::Bus,
        TopologyShape::Ring,
        TopologyShape::Tree,
    ];

    /// 给定分光比下该形态最多能接入的终端数
    pub fn capacity(self, ratio: SplitRatio) -> usize {
        let k = ratio.outputs() as usize;
        match self {
            TopologyShape::Star | TopologyShape::Ring => k,
            TopologyShape::Bus => k * (k - 1),
            TopologyShape::Tree => k * k,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TopologyShape::Star => "star",
            TopologyShape::Bus => "bus",
            TopologyShape::Ring => "ring",
            TopologyShape::Tree => "tree",
        }
    }
}

impl fmt::Display for TopologyShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TopologyShape {
    type Err = GponError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "star" => Ok(TopologyShape::Star),
            "bus" => Ok(TopologyShape::Bus),
            "ring" => Ok(TopologyShape::Ring),
            "tree" => Ok(TopologyShape::Tree),
            other => Err(GponError::InvalidRequest(format!(
                "unknown topology shape {other:?}"
            ))),
        }
    }
}

/// 光纤段长度规划（km）
///
/// `trunk_km` 的含义随形态不同：总线为相邻分光器间距，环形为整个环的周长
/// （平均分给各段），树形为根到第一个中间分光器的距离。
/// 第 i 条分支 / 引入段的长度为 `base + i * step`。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpanPlan {
    pub feeder_km: f64,
    pub trunk_km: f64,
    pub trunk_step_km: f64,
    pub drop_km: f64,
    pub drop_step_km: f64,
}

impl SpanPlan {
    pub fn for_shape(shape: TopologyShape) -> Self {
        match shape {
            TopologyShape::Star => Self {
                feeder_km: 2.0,
                trunk_km: 0.0,
                trunk_step_km: 0.0,
                drop_km: 3.0,
                drop_step_km: 0.1,
            },
            TopologyShape::Bus => Self {
                feeder_km: 1.0,
                trunk_km: 0.5,
                trunk_step_km: 0.0,
                drop_km: 0.2,
                drop_step_km: 0.0,
            },
            TopologyShape::Ring => Self {
                feeder_km: 2.0,
                trunk_km: 5.0,
                trunk_step_km: 0.0,
                drop_km: 0.5,
                drop_step_km: 0.0,
            },
            TopologyShape::Tree => Self {
                feeder_km: 2.0,
                trunk_km: 2.0,
                trunk_step_km: 0.3,
                drop_km: 1.5,
                drop_step_km: 0.2,
            },
        }
    }

    /// 所有长度和步长都必须是非负有限数
    pub fn check(&self) -> Result<()> {
        for (field, v) in [
            ("feeder_km", self.feeder_km),
            ("trunk_km", self.trunk_km),
            ("trunk_step_km", self.trunk_step_km),
            ("drop_km", self.drop_km),
            ("drop_step_km", self.drop_step_km),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(GponError::InvalidRequest(format!(
                    "span plan {field} must be a non-negative number, got {v}"
                )));
            }
        }
        Ok(())
    }

    pub fn drop_len(&self, i: usize) -> f64 {
        self.drop_km + i as f64 * self.drop_step_km
    }

    pub fn trunk_len(&self, i: usize) -> f64 {
        self.trunk_km + i as f64 * self.trunk_step_km
    }
}

/// 拓扑构建参数
#[derive(Debug, Clone)]
pub struct TopologyOpts {
    pub name: String,
    pub description: String,
    pub shape: TopologyShape,
    pub terminal_count: usize,
    pub split_ratio: SplitRatio,
    pub head_end: HeadEndSpec,
    /// None 表示使用该形态的缺省规划
    pub span_plan: Option<SpanPlan>,
    /// 按终端顺序给出的业务速率（Mbps），可以少于终端数
    pub traffic_rates: Vec<f64>,
}

impl Default for TopologyOpts {
    fn default() -> Self {
        Self {
            name: "GPON Network".to_string(),
            description: String::new(),
            shape: TopologyShape::Star,
            terminal_count: 32,
            split_ratio: SplitRatio::default(),
            head_end: HeadEndSpec::default(),
            span_plan: None,
            traffic_rates: Vec::new(),
        }
    }
}

impl TopologyOpts {
    pub fn plan(&self) -> SpanPlan {
        self.span_plan.unwrap_or_else(|| SpanPlan::for_shape(self.shape))
    }
}

/// 各形态构建函数共享的上下文
pub struct BuildCtx<'a> {
    pub opts: &'a TopologyOpts,
    pub plan: SpanPlan,
    pub head_end: ElementId,
    pub attenuation_db_per_km: f64,
}

impl BuildCtx<'_> {
    /// 第 `idx` 个终端（从 0 开始）
    pub fn terminal(&self, idx: usize) -> Terminal {
        Terminal {
            traffic_rate_mbps: self.opts.traffic_rates.get(idx).copied(),
            ..Terminal::default()
        }
    }

    pub fn terminal_name(idx: usize) -> String {
        format!("ONU-{}", idx + 1)
    }
}

/// 一个完整的拓扑：局端 + 分光器 + 光纤段 + 终端。创建后不可变。
#[derive(Debug, Clone, Serialize)]
pub struct Topology {
    pub id: u64,
    pub name: String,
    pub description: String,
    pub shape: TopologyShape,
    pub split_ratio: SplitRatio,
    pub terminal_count: usize,
    pub network: Network,
}

impl Topology {
    pub fn head_end(&self) -> Option<&HeadEnd> {
        self.network.head_end().map(|(_, h)| h)
    }

    /// 分光器沿链路的先后顺序（链 / 环按连接方向，树按层序）
    pub fn splitter_order(&self) -> Traversal {
        let members: Vec<ElementId> = self.network.splitters().map(|(e, _)| e.id).collect();
        match self.network.head_end() {
            Some((start, _)) => traversal_order(&self.network.links(), start, &members),
            None => Traversal {
                order: members,
                fell_back: true,
            },
        }
    }
}

/// 构建拓扑
///
/// 终端数超过该形态容量时返回 `CapacityExceeded`；光纤段使用
/// `optical.attenuation_db_per_km`，构建完成后终端带有光预算标注。
#[tracing::instrument(skip(opts, optical), fields(shape = %opts.shape, terminals = opts.terminal_count, ratio = %opts.split_ratio))]
pub fn build_topology(opts: &TopologyOpts, optical: &OpticalProfile) -> Result<Topology> {
    let capacity = opts.shape.capacity(opts.split_ratio);
    if opts.terminal_count > capacity {
        return Err(GponError::CapacityExceeded {
            requested: opts.terminal_count,
            capacity,
            shape: opts.shape.to_string(),
            ratio: opts.split_ratio.to_string(),
        });
    }
    if opts.traffic_rates.len() > opts.terminal_count {
        return Err(GponError::InvalidRequest(format!(
            "{} traffic rates given for {} terminals",
            opts.traffic_rates.len(),
            opts.terminal_count
        )));
    }
    if let Some(bad) = opts
        .traffic_rates
        .iter()
        .find(|r| !r.is_finite() || **r < 0.0)
    {
        return Err(GponError::InvalidRequest(format!(
            "traffic rate must be a non-negative number, got {bad}"
        )));
    }

    let plan = opts.plan();
    plan.check()?;

    let mut net = Network::default();
    let head_end = net.add_head_end("OLT-1", HeadEnd::from(opts.head_end));
    let ctx = BuildCtx {
        opts,
        plan,
        head_end,
        attenuation_db_per_km: optical.attenuation_db_per_km,
    };

    match opts.shape {
        TopologyShape::Star => star::build_star(&mut net, &ctx),
        TopologyShape::Bus => bus::build_bus(&mut net, &ctx),
        TopologyShape::Ring => ring::build_ring(&mut net, &ctx),
        TopologyShape::Tree => tree::build_tree(&mut net, &ctx),
    }

    net.validate(opts.shape == TopologyShape::Ring)?;
    optics::annotate(&mut net, optical)?;

    info!(
        elements = net.elements().len(),
        spans = net.spans().len(),
        "🏗️  拓扑构建完成"
    );

    Ok(Topology {
        id: 0,
        name: opts.name.clone(),
        description: opts.description.clone(),
        shape: opts.shape,
        split_ratio: opts.split_ratio,
        terminal_count: opts.terminal_count,
        network: net,
    })
}
