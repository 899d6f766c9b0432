//! 局端到各元素的路径
//!
//! 拓扑是有向图（环形拓扑允许一个环），局端到任一终端的光路取
//! 有向边上跳数最少的那条。路径表在局端上做一次 BFS 得到：
//! 为每个可达元素记录进入它的那条光纤段，回溯即得完整路径。

use std::collections::VecDeque;

use super::id::{ElementId, SpanId};

#[derive(Debug, Default, Clone)]
pub struct RouteTable {
    origin: Option<ElementId>,
    /// parent[e] = 进入 e 的光纤段及其上游元素
    parent: Vec<Option<(SpanId, ElementId)>>,
}

impl RouteTable {
    /// `adj[from]` 为从 `from` 出发的 (邻居, 光纤段)，按光纤段声明顺序排列
    pub fn build(origin: ElementId, adj: &[Vec<(ElementId, SpanId)>]) -> Self {
        let n = adj.len();
        let mut parent = vec![None; n];
        let mut seen = vec![false; n];
        let mut q: VecDeque<ElementId> = VecDeque::new();

        if origin.0 < n {
            seen[origin.0] = true;
            q.push_back(origin);
        }

        while let Some(v) = q.pop_front() {
            for &(next, span) in &adj[v.0] {
                if next.0 >= n || seen[next.0] {
                    continue;
                }
                seen[next.0] = true;
                parent[next.0] = Some((span, v));
                q.push_back(next);
            }
        }

        Self {
            origin: Some(origin),
            parent,
        }
    }

    pub fn is_reachable(&self, to: ElementId) -> bool {
        Some(to) == self.origin || self.parent.get(to.0).is_some_and(|p| p.is_some())
    }

    /// 局端到 `to` 依次经过的光纤段；不可达返回 None
    pub fn spans_to(&self, to: ElementId) -> Option<Vec<SpanId>> {
        let origin = self.origin?;
        let mut spans = Vec::new();
        let mut cur = to;
        while cur != origin {
            let (span, up) = (*self.parent.get(cur.0)?)?;
            spans.push(span);
            cur = up;
        }
        spans.reverse();
        Some(spans)
    }

    /// 局端到 `to` 依次经过的元素（含两端）；不可达返回 None
    pub fn elements_to(&self, to: ElementId) -> Option<Vec<ElementId>> {
        let origin = self.origin?;
        let mut nodes = vec![to];
        let mut cur = to;
        while cur != origin {
            let (_, up) = (*self.parent.get(cur.0)?)?;
            nodes.push(up);
            cur = up;
        }
        nodes.reverse();
        Some(nodes)
    }
}
