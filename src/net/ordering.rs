//! 遍历顺序重建
//!
//! 总线、环、树中分光器的先后顺序只由光纤段的 (from, to) 决定，
//! 不依赖数组顺序。这里从起点出发做带 visited 集合的图遍历恢复顺序；
//! 链接缺失或不完整时，无法解析的部分退回到原始声明顺序，而不是报错，
//! 因为顺序只影响展示，不影响光预算和仿真结果。

use std::collections::{HashMap, HashSet, VecDeque};

use serde::Serialize;
use tracing::debug;

use super::id::ElementId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Traversal {
    pub order: Vec<ElementId>,
    /// 是否有成员没能通过链接解析，按声明顺序补在末尾
    pub fell_back: bool,
}

/// 从 `start` 出发，沿 `links` 只经过 `members` 中的元素做广度优先遍历。
///
/// - `start` 本身是成员时排在最前；
/// - 邻居按 `links` 中出现的先后访问，链与环因此按连接方向排开，
///   树按层序排开；
/// - 指向未知元素的链接被忽略；
/// - 遍历不到的成员按 `members` 的声明顺序追加。
pub fn traversal_order(
    links: &[(ElementId, ElementId)],
    start: ElementId,
    members: &[ElementId],
) -> Traversal {
    let member_set: HashSet<ElementId> = members.iter().copied().collect();
    let mut adj: HashMap<ElementId, Vec<ElementId>> = HashMap::new();
    for &(from, to) in links {
        adj.entry(from).or_default().push(to);
    }

    let mut visited: HashSet<ElementId> = HashSet::new();
    let mut order = Vec::with_capacity(members.len());
    let mut q = VecDeque::new();
    visited.insert(start);
    if member_set.contains(&start) {
        order.push(start);
    }
    q.push_back(start);

    while let Some(cur) = q.pop_front() {
        let Some(nexts) = adj.get(&cur) else {
            continue;
        };
        for &next in nexts {
            if member_set.contains(&next) && visited.insert(next) {
                order.push(next);
                q.push_back(next);
            }
        }
    }

    let fell_back = order.len() < member_set.len();
    if fell_back {
        debug!(
            resolved = order.len(),
            members = member_set.len(),
            "部分链接无法解析，剩余成员按声明顺序补齐"
        );
        for &m in members {
            if visited.insert(m) {
                order.push(m);
            }
        }
    }

    Traversal { order, fell_back }
}
