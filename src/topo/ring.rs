//! 环形拓扑构建
//!
//! OLT -> 根分光器 -> r1 -> r2 -> ... -> rN -> 根分光器。
//! 每个环上分光器接一个 ONU；环的周长平均分给 N 段环路光纤。

use super::BuildCtx;
use crate::net::{ElementId, Network, Splitter, SplitterRole};

pub fn build_ring(net: &mut Network, ctx: &BuildCtx<'_>) {
    let n = ctx.opts.terminal_count;
    let root = net.add_splitter(
        "SPLIT-RING-0",
        Splitter {
            ratio: ctx.opts.split_ratio,
            role: SplitterRole::Root,
        },
    );
    net.connect(
        "FIBER-FEEDER",
        ctx.head_end,
        root,
        ctx.plan.feeder_km,
        ctx.attenuation_db_per_km,
    );
    if n == 0 {
        return;
    }

    let segment_km = ctx.plan.trunk_km / n as f64;
    let mut prev: ElementId = root;
    for i in 0..n {
        let member = net.add_splitter(
            format!("SPLIT-RING-{}", i + 1),
            Splitter {
                ratio: ctx.opts.split_ratio,
                role: SplitterRole::RingMember,
            },
        );
        net.connect(
            format!("FIBER-RING-{i}"),
            prev,
            member,
            segment_km,
            ctx.attenuation_db_per_km,
        );

        let onu = net.add_terminal(BuildCtx::terminal_name(i), ctx.terminal(i));
        net.connect(
            format!("FIBER-DROP-{}", i + 1),
            member,
            onu,
            ctx.plan.drop_len(i),
            ctx.attenuation_db_per_km,
        );
        prev = member;
    }

    // 闭合环路
    net.connect(
        "FIBER-RING-CLOSE",
        prev,
        root,
        segment_km,
        ctx.attenuation_db_per_km,
    );
}
