//! 光网络拓扑模块
//!
//! 此模块包含拓扑图的核心组件：局端、分光器、终端、光纤段，以及路径表和遍历顺序重建。

// 子模块声明
mod element;
mod id;
mod network;
mod ordering;
mod ratio;
mod routing;
mod span;

// 重新导出公共接口
pub use element::{Element, ElementKind, HeadEnd, Splitter, SplitterRole, Terminal};
pub use id::{ElementId, SpanId};
pub use network::Network;
pub use ordering::{Traversal, traversal_order};
pub use ratio::{STANDARD_OUTPUTS, SplitRatio};
pub use routing::RouteTable;
pub use span::FiberSpan;
