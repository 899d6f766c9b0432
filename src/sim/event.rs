//! 事件 trait
//!
//! 定义仿真事件接口。

use super::simulator::Simulator;

/// 事件：在某个仿真时刻作用于世界 `W`。使用 `self: Box<Self>` 以支持所有权转移。
pub trait Event<W>: Send + 'static {
    fn execute(self: Box<Self>, sim: &mut Simulator<W>, world: &mut W);
}
