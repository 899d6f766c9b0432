//! 标识符类型
//!
//! 定义拓扑元素与光纤段的唯一标识符（arena 下标）。

use serde::{Deserialize, Serialize};

/// 元素标识符（局端、分光器、终端共用一个编号空间）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ElementId(pub usize);

/// 光纤段标识符
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SpanId(pub usize);
