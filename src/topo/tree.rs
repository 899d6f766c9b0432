//! 树形拓扑构建
//!
//! OLT -> 根分光器 -> 中间分光器 -> ONU 两级结构。
//! 终端数不超过 K 时不建中间级，ONU 直接挂在根上；
//! 否则建 ceil(N/K) 个中间分光器，ONU 按向上取整平均分配。

use super::BuildCtx;
use crate::net::{Network, Splitter, SplitterRole};

/// (中间分光器个数, 每个中间分光器最多接入的终端数)
pub fn fan_out(terminals: usize, outputs: u32) -> (usize, usize) {
    let k = outputs as usize;
    if terminals <= k {
        return (0, terminals);
    }
    let intermediates = terminals.div_ceil(k);
    (intermediates, terminals.div_ceil(intermediates))
}

pub fn build_tree(net: &mut Network, ctx: &BuildCtx<'_>) {
    let n = ctx.opts.terminal_count;
    let root = net.add_splitter(
        "SPLIT-ROOT",
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

    let (intermediates, per) = fan_out(n, ctx.opts.split_ratio.outputs());
    if intermediates == 0 {
        for i in 0..n {
            let onu = net.add_terminal(BuildCtx::terminal_name(i), ctx.terminal(i));
            net.connect(
                format!("FIBER-DROP-{}", i + 1),
                root,
                onu,
                ctx.plan.drop_len(i),
                ctx.attenuation_db_per_km,
            );
        }
        return;
    }

    let mut next_onu = 0;
    for b in 0..intermediates {
        let inter = net.add_splitter(
            format!("SPLIT-INTER-{}", b + 1),
            Splitter {
                ratio: ctx.opts.split_ratio,
                role: SplitterRole::Intermediate,
            },
        );
        net.connect(
            format!("FIBER-BRANCH-{}", b + 1),
            root,
            inter,
            ctx.plan.trunk_len(b),
            ctx.attenuation_db_per_km,
        );

        for j in 0..per {
            if next_onu >= n {
                break;
            }
            let onu = net.add_terminal(BuildCtx::terminal_name(next_onu), ctx.terminal(next_onu));
            net.connect(
                format!("FIBER-DROP-{}", next_onu + 1),
                inter,
                onu,
                ctx.plan.drop_len(j),
                ctx.attenuation_db_per_km,
            );
            next_onu += 1;
        }
    }
}
