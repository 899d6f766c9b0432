//! 总线拓扑构建
//!
//! OLT -> b1 -> b2 -> ... 级联的 1:K 分光器。每个分光器留一个端口继续
//! 主干，其余 K-1 个端口依次接入 ONU，接满后换到下一个分光器。
//! 链上的先后关系完全由主干光纤段的 (from, to) 表达。

use super::BuildCtx;
use crate::net::{ElementId, Network, Splitter, SplitterRole};

/// 需要的级联分光器个数（至少一个）
pub fn chain_len(terminals: usize, outputs: u32) -> usize {
    let per = (outputs as usize).saturating_sub(1).max(1);
    terminals.div_ceil(per).max(1)
}

pub fn build_bus(net: &mut Network, ctx: &BuildCtx<'_>) {
    let outputs = ctx.opts.split_ratio.outputs();
    let per = (outputs as usize).saturating_sub(1).max(1);
    let count = chain_len(ctx.opts.terminal_count, outputs);

    let mut chain: Vec<ElementId> = Vec::with_capacity(count);
    for k in 0..count {
        let id = net.add_splitter(
            format!("SPLIT-BUS-{}", k + 1),
            Splitter {
                ratio: ctx.opts.split_ratio,
                role: SplitterRole::Chain,
            },
        );
        match chain.last() {
            None => {
                net.connect(
                    "FIBER-FEEDER",
                    ctx.head_end,
                    id,
                    ctx.plan.feeder_km,
                    ctx.attenuation_db_per_km,
                );
            }
            Some(&prev) => {
                net.connect(
                    format!("FIBER-TRUNK-{k}"),
                    prev,
                    id,
                    ctx.plan.trunk_len(k - 1),
                    ctx.attenuation_db_per_km,
                );
            }
        }
        chain.push(id);
    }

    for i in 0..ctx.opts.terminal_count {
        let tap = chain[i / per];
        let onu = net.add_terminal(BuildCtx::terminal_name(i), ctx.terminal(i));
        net.connect(
            format!("FIBER-DROP-{}", i + 1),
            tap,
            onu,
            ctx.plan.drop_len(i % per),
            ctx.attenuation_db_per_km,
        );
    }
}
