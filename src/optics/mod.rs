//! 光功率预算
//!
//! 纯函数：由局端收发参数、路径上的分光器与光纤段计算每个终端的
//! 可用功率余量和是否可用。结果不做四舍五入，显示精度由客户端决定。

mod budget;

pub use budget::{
    LinkBudget, SpanLoss, TerminalBudget, annotate, compute_power_budget,
    compute_terminal_budget, link_budget, splice_count, splitter_loss_db,
};
