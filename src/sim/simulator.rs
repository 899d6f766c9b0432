//! 仿真器
//!
//! 事件驱动仿真器，维护当前时间与事件队列；世界类型 `W` 由调用方决定。

use super::event::Event;
use super::scheduled_event::ScheduledEvent;
use super::time::SimTime;
use std::collections::BinaryHeap;
use tracing::{debug, trace};

pub struct Simulator<W> {
    now: SimTime,
    next_seq: u64,
    executed: u64,
    q: BinaryHeap<ScheduledEvent<W>>,
}

impl<W> Default for Simulator<W> {
    fn default() -> Self {
        Self {
            now: SimTime::ZERO,
            next_seq: 0,
            executed: 0,
            q: BinaryHeap::new(),
        }
    }
}

impl<W: 'static> Simulator<W> {
    /// 获取当前仿真时间
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// 已执行的事件数
    pub fn executed(&self) -> u64 {
        self.executed
    }

    /// 调度事件在指定时间执行；早于当前时间的事件按当前时间执行
    pub fn schedule<E: Event<W>>(&mut self, at: SimTime, ev: E) {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        let at = at.max(self.now);
        trace!(event_type = std::any::type_name::<E>(), ?at, seq, "调度事件");
        self.q.push(ScheduledEvent {
            at,
            seq,
            ev: Box::new(ev),
        });
    }

    fn step(&mut self, world: &mut W) -> bool {
        let Some(item) = self.q.pop() else {
            return false;
        };
        self.now = item.at;
        self.executed += 1;
        item.ev.execute(self, world);
        true
    }

    /// 运行所有事件直到队列为空。
    pub fn run(&mut self, world: &mut W) {
        while self.step(world) {}
        debug!(
            total_events = self.executed,
            final_time = ?self.now,
            "仿真事件队列已清空"
        );
    }
}
