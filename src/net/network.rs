//! 光网络拓扑图
//!
//! 节点表 + 边表：元素放在 arena 中用 `ElementId` 引用，光纤段是有向边。
//! 环形拓扑中的回环只是一条普通的边，不会产生循环所有权。

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, trace};

use super::element::{Element, ElementKind, HeadEnd, Splitter, SplitterRole, Terminal};
use super::id::{ElementId, SpanId};
use super::routing::RouteTable;
use super::span::FiberSpan;
use crate::error::{GponError, Result};

/// 光网络拓扑
#[derive(Debug, Clone, Default, Serialize)]
pub struct Network {
    elements: Vec<Element>,
    spans: Vec<FiberSpan>,
    #[serde(skip)]
    edges: HashMap<(ElementId, ElementId), SpanId>,
}

impl Network {
    fn push_element(&mut self, name: impl Into<String>, kind: ElementKind) -> ElementId {
        let id = ElementId(self.elements.len());
        self.elements.push(Element {
            id,
            name: name.into(),
            kind,
        });
        id
    }

    /// 添加局端
    pub fn add_head_end(&mut self, name: impl Into<String>, head_end: HeadEnd) -> ElementId {
        self.push_element(name, ElementKind::HeadEnd(head_end))
    }

    /// 添加分光器
    pub fn add_splitter(&mut self, name: impl Into<String>, splitter: Splitter) -> ElementId {
        self.push_element(name, ElementKind::Splitter(splitter))
    }

    /// 添加终端
    pub fn add_terminal(&mut self, name: impl Into<String>, terminal: Terminal) -> ElementId {
        self.push_element(name, ElementKind::Terminal(terminal))
    }

    /// 连接两个元素（创建单向光纤段）
    pub fn connect(
        &mut self,
        name: impl Into<String>,
        from: ElementId,
        to: ElementId,
        length_km: f64,
        attenuation_db_per_km: f64,
    ) -> SpanId {
        let id = SpanId(self.spans.len());
        let name = name.into();
        trace!(span = %name, ?from, ?to, length_km, "添加光纤段");
        self.spans.push(FiberSpan {
            id,
            name,
            from,
            to,
            length_km,
            attenuation_db_per_km,
        });
        self.edges.insert((from, to), id);
        id
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn spans(&self) -> &[FiberSpan] {
        &self.spans
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id.0)
    }

    pub fn span(&self, id: SpanId) -> Option<&FiberSpan> {
        self.spans.get(id.0)
    }

    pub fn span_between(&self, from: ElementId, to: ElementId) -> Option<&FiberSpan> {
        self.edges.get(&(from, to)).and_then(|id| self.span(*id))
    }

    pub(crate) fn terminal_mut(&mut self, id: ElementId) -> Option<&mut Terminal> {
        match self.elements.get_mut(id.0).map(|e| &mut e.kind) {
            Some(ElementKind::Terminal(t)) => Some(t),
            _ => None,
        }
    }

    /// 唯一的局端
    pub fn head_end(&self) -> Option<(ElementId, &HeadEnd)> {
        self.elements.iter().find_map(|e| match &e.kind {
            ElementKind::HeadEnd(h) => Some((e.id, h)),
            _ => None,
        })
    }

    pub fn terminals(&self) -> impl Iterator<Item = (&Element, &Terminal)> {
        self.elements.iter().filter_map(|e| e.as_terminal().map(|t| (e, t)))
    }

    pub fn splitters(&self) -> impl Iterator<Item = (&Element, &Splitter)> {
        self.elements.iter().filter_map(|e| e.as_splitter().map(|s| (e, s)))
    }

    pub fn terminal_count(&self) -> usize {
        self.terminals().count()
    }

    /// 光纤段的 (from, to) 对，按声明顺序
    pub fn links(&self) -> Vec<(ElementId, ElementId)> {
        self.spans.iter().map(|s| (s.from, s.to)).collect()
    }

    /// `adj[from]` 为 from 的出边 (邻居, 光纤段)；越界引用被跳过，由 `validate` 报告
    pub fn adjacency(&self) -> Vec<Vec<(ElementId, SpanId)>> {
        let n = self.elements.len();
        let mut adj = vec![Vec::new(); n];
        for s in &self.spans {
            if s.from.0 < n && s.to.0 < n {
                adj[s.from.0].push((s.to, s.id));
            }
        }
        adj
    }

    /// 以局端为起点的路径表
    pub fn routes(&self) -> Result<RouteTable> {
        let (origin, _) = self
            .head_end()
            .ok_or_else(|| GponError::GraphInconsistency("topology has no head-end".into()))?;
        Ok(RouteTable::build(origin, &self.adjacency()))
    }

    /// 检查图的结构不变量：
    /// - 恰好一个局端，光纤段不引用未知元素；
    /// - 每个终端恰好由一条来自分光器的光纤段接入，且局端可达；
    /// - 每个分光器局端可达；
    /// - 除 `allow_ring` 时允许的一个由 root/ring_member 分光器组成的环外，图无环。
    #[tracing::instrument(skip(self), fields(elements = self.elements.len(), spans = self.spans.len()))]
    pub fn validate(&self, allow_ring: bool) -> Result<()> {
        let n = self.elements.len();
        let head_ends = self
            .elements
            .iter()
            .filter(|e| matches!(e.kind, ElementKind::HeadEnd(_)))
            .count();
        if head_ends != 1 {
            return Err(GponError::GraphInconsistency(format!(
                "expected exactly one head-end, found {head_ends}"
            )));
        }

        for s in &self.spans {
            if s.from.0 >= n || s.to.0 >= n {
                return Err(GponError::GraphInconsistency(format!(
                    "span {} references unknown element ({:?} -> {:?})",
                    s.name, s.from, s.to
                )));
            }
        }

        let routes = self.routes()?;
        for e in &self.elements {
            match &e.kind {
                ElementKind::Terminal(_) => {
                    let feeders: Vec<&FiberSpan> =
                        self.spans.iter().filter(|s| s.to == e.id).collect();
                    let from_splitter = feeders.len() == 1
                        && self.elements[feeders[0].from.0].is_splitter();
                    if !from_splitter {
                        return Err(GponError::GraphInconsistency(format!(
                            "terminal {} must hang off exactly one splitter, has {} feeder span(s)",
                            e.name,
                            feeders.len()
                        )));
                    }
                    if !routes.is_reachable(e.id) {
                        return Err(GponError::GraphInconsistency(format!(
                            "terminal {} is unreachable from the head-end",
                            e.name
                        )));
                    }
                }
                ElementKind::Splitter(_) if !routes.is_reachable(e.id) => {
                    return Err(GponError::GraphInconsistency(format!(
                        "splitter {} is unreachable from the head-end",
                        e.name
                    )));
                }
                _ => {}
            }
        }

        let cycles = self.cycles();
        debug!(cycles = cycles.len(), allow_ring, "环检测完成");
        match cycles.as_slice() {
            [] => Ok(()),
            [cycle] if allow_ring => {
                let ring_only = cycle.iter().all(|id| {
                    matches!(
                        self.elements[id.0].as_splitter().map(|s| s.role),
                        Some(SplitterRole::Root | SplitterRole::RingMember)
                    )
                });
                if ring_only {
                    Ok(())
                } else {
                    Err(GponError::GraphInconsistency(
                        "ring cycle passes through a non-ring element".into(),
                    ))
                }
            }
            _ => Err(GponError::GraphInconsistency(format!(
                "unexpected cycle(s) in topology: found {}",
                cycles.len()
            ))),
        }
    }

    /// 用迭代式 DFS 找出每条回边对应的环（环上元素按遍历顺序）
    fn cycles(&self) -> Vec<Vec<ElementId>> {
        const WHITE: u8 = 0;
        const GRAY: u8 = 1;
        const BLACK: u8 = 2;

        let adj = self.adjacency();
        let n = adj.len();
        let mut color = vec![WHITE; n];
        let mut cycles = Vec::new();

        let roots = self
            .head_end()
            .map(|(id, _)| id)
            .into_iter()
            .chain((0..n).map(ElementId));

        for root in roots {
            if color[root.0] != WHITE {
                continue;
            }
            color[root.0] = GRAY;
            let mut stack: Vec<(ElementId, usize)> = vec![(root, 0)];

            while let Some(&(v, i)) = stack.last() {
                if let Some(&(w, _)) = adj[v.0].get(i) {
                    if let Some(top) = stack.last_mut() {
                        top.1 += 1;
                    }
                    match color[w.0] {
                        WHITE => {
                            color[w.0] = GRAY;
                            stack.push((w, 0));
                        }
                        GRAY => {
                            let start = stack.iter().position(|&(x, _)| x == w).unwrap_or(0);
                            cycles.push(stack[start..].iter().map(|&(x, _)| x).collect());
                        }
                        _ => {}
                    }
                } else {
                    color[v.0] = BLACK;
                    stack.pop();
                }
            }
        }

        cycles
    }
}
