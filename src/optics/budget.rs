//! 光预算计算
//!
//! available = (tx - rx_sensitivity) - (fiber + splice + splitter) - margin，
//! 其中熔接点个数按整条路径长度计：floor(L / interval) + 1。

use serde::Serialize;
use tracing::{debug, trace};

use crate::config::OpticalProfile;
use crate::error::{GponError, Result};
use crate::net::{ElementId, FiberSpan, HeadEnd, Network, RouteTable, SpanId, SplitRatio};

/// 路径长度恰好落在熔接间隔整数倍上时，吸收浮点累加误差
const SPLICE_EPS: f64 = 1e-9;

/// 分光损耗 10·log10(N)
pub fn splitter_loss_db(ratio: SplitRatio) -> f64 {
    ratio.loss_db()
}

/// 熔接点个数：每 `interval_km` 一个，外加一个基础熔接点
pub fn splice_count(path_km: f64, interval_km: f64) -> u32 {
    if interval_km <= 0.0 || !path_km.is_finite() || path_km <= 0.0 {
        return 1;
    }
    (path_km / interval_km + SPLICE_EPS).floor() as u32 + 1
}

/// 一条路径的损耗汇总
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinkBudget {
    pub power_budget_db: f64,
    pub splitter_loss_db: f64,
    pub fiber_loss_db: f64,
    pub path_length_km: f64,
    pub splice_count: u32,
    pub splice_loss_db: f64,
    pub total_loss_db: f64,
    pub safety_margin_db: f64,
    pub available_power_db: f64,
    pub is_valid: bool,
}

/// 核心公式。`splitters` 为路径上经过的每个分光器（各计一次），`spans` 为路径上的光纤段。
pub fn link_budget<'a>(
    head_end: &HeadEnd,
    splitters: &[SplitRatio],
    spans: impl IntoIterator<Item = &'a FiberSpan>,
    optical: &OpticalProfile,
) -> LinkBudget {
    let power_budget_db = head_end.power_budget_db();
    let splitter_loss_db: f64 = splitters.iter().map(|r| splitter_loss_db(*r)).sum();

    let (fiber_loss_db, path_length_km) = spans
        .into_iter()
        .fold((0.0, 0.0), |(loss, len), s| (loss + s.fiber_loss_db(), len + s.length_km));

    let splice_count = splice_count(path_length_km, optical.splice_interval_km);
    let splice_loss_db = optical.splice_loss_db * f64::from(splice_count);
    let total_loss_db = fiber_loss_db + splice_loss_db + splitter_loss_db;
    let available_power_db = power_budget_db - total_loss_db - optical.safety_margin_db;

    LinkBudget {
        power_budget_db,
        splitter_loss_db,
        fiber_loss_db,
        path_length_km,
        splice_count,
        splice_loss_db,
        total_loss_db,
        safety_margin_db: optical.safety_margin_db,
        available_power_db,
        is_valid: available_power_db >= 0.0,
    }
}

/// 路径上单条光纤段的损耗明细
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpanLoss {
    pub span_id: SpanId,
    pub name: String,
    pub from: ElementId,
    pub to: ElementId,
    pub length_km: f64,
    pub attenuation_db_per_km: f64,
    pub fiber_loss_db: f64,
}

/// 单个终端的光预算报告
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TerminalBudget {
    pub terminal_id: ElementId,
    pub terminal_name: String,
    pub tx_power_dbm: f64,
    pub rx_sensitivity_dbm: f64,
    pub splitters_traversed: usize,
    pub span_losses: Vec<SpanLoss>,
    #[serde(flatten)]
    pub budget: LinkBudget,
    /// 功率预算超过 class B+ 上限（仅提示，不影响 is_valid）
    pub exceeds_class_ceiling: bool,
}

impl TerminalBudget {
    pub fn total_loss_db(&self) -> f64 {
        self.budget.total_loss_db
    }

    pub fn available_power_db(&self) -> f64 {
        self.budget.available_power_db
    }

    pub fn is_valid(&self) -> bool {
        self.budget.is_valid
    }
}

/// 计算单个终端的光预算；路径无法解析时返回 `GraphInconsistency`
pub fn compute_terminal_budget(
    net: &Network,
    routes: &RouteTable,
    terminal: ElementId,
    optical: &OpticalProfile,
) -> Result<TerminalBudget> {
    let (_, head_end) = net
        .head_end()
        .ok_or_else(|| GponError::GraphInconsistency("topology has no head-end".into()))?;
    let element = net
        .element(terminal)
        .filter(|e| e.is_terminal())
        .ok_or_else(|| {
            GponError::GraphInconsistency(format!("{terminal:?} is not a terminal"))
        })?;

    let unresolved = || {
        GponError::GraphInconsistency(format!(
            "no path from head-end to terminal {}",
            element.name
        ))
    };
    let span_ids = routes.spans_to(terminal).ok_or_else(unresolved)?;
    let nodes = routes.elements_to(terminal).ok_or_else(unresolved)?;

    let spans = span_ids
        .iter()
        .map(|id| net.span(*id).ok_or_else(unresolved))
        .collect::<Result<Vec<&FiberSpan>>>()?;
    let ratios: Vec<SplitRatio> = nodes
        .iter()
        .filter_map(|id| net.element(*id).and_then(|e| e.as_splitter()))
        .map(|s| s.ratio)
        .collect();

    let budget = link_budget(head_end, &ratios, spans.iter().copied(), optical);
    trace!(
        terminal = %element.name,
        total_loss_db = budget.total_loss_db,
        available_power_db = budget.available_power_db,
        "终端光预算"
    );

    Ok(TerminalBudget {
        terminal_id: terminal,
        terminal_name: element.name.clone(),
        tx_power_dbm: head_end.tx_power_dbm,
        rx_sensitivity_dbm: head_end.rx_sensitivity_dbm,
        splitters_traversed: ratios.len(),
        span_losses: spans
            .iter()
            .map(|s| SpanLoss {
                span_id: s.id,
                name: s.name.clone(),
                from: s.from,
                to: s.to,
                length_km: s.length_km,
                attenuation_db_per_km: s.attenuation_db_per_km,
                fiber_loss_db: s.fiber_loss_db(),
            })
            .collect(),
        budget,
        exceeds_class_ceiling: budget.power_budget_db > optical.class_ceiling_db,
    })
}

/// 计算拓扑中所有终端的光预算（按终端声明顺序）
#[tracing::instrument(skip_all, fields(terminals = net.terminal_count()))]
pub fn compute_power_budget(net: &Network, optical: &OpticalProfile) -> Result<Vec<TerminalBudget>> {
    let routes = net.routes()?;
    let report = net
        .terminals()
        .map(|(e, _)| compute_terminal_budget(net, &routes, e.id, optical))
        .collect::<Result<Vec<_>>>()?;
    debug!(
        valid = report.iter().filter(|b| b.is_valid()).count(),
        total = report.len(),
        "光预算计算完成"
    );
    Ok(report)
}

/// 把光预算结果写回各终端
pub fn annotate(net: &mut Network, optical: &OpticalProfile) -> Result<()> {
    for b in compute_power_budget(net, optical)? {
        if let Some(t) = net.terminal_mut(b.terminal_id) {
            t.total_loss_db = b.budget.total_loss_db;
            t.available_power_db = b.budget.available_power_db;
            t.is_valid = b.budget.is_valid;
        }
    }
    Ok(())
}
