//! 星形拓扑构建
//!
//! OLT -> 1:K 分光器 -> 各 ONU。每个 ONU 的引入段长度不同。

use super::BuildCtx;
use crate::net::{Network, Splitter, SplitterRole};

pub fn build_star(net: &mut Network, ctx: &BuildCtx<'_>) {
    let splitter = net.add_splitter(
        "SPLIT-1",
        Splitter {
            ratio: ctx.opts.split_ratio,
            role: SplitterRole::Root,
        },
    );
    net.connect(
        "FIBER-FEEDER",
        ctx.head_end,
        splitter,
        ctx.plan.feeder_km,
        ctx.attenuation_db_per_km,
    );

    for i in 0..ctx.opts.terminal_count {
        let onu = net.add_terminal(BuildCtx::terminal_name(i), ctx.terminal(i));
        net.connect(
            format!("FIBER-DROP-{}", i + 1),
            splitter,
            onu,
            ctx.plan.drop_len(i),
            ctx.attenuation_db_per_km,
        );
    }
}
