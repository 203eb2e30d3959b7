//! StreamSQL - 流式 SQL 方言的抽象语法树与通用重写器
//!
//! 本 crate 提供：
//! - 不可变的 AST 节点模型，相等性与源码位置无关
//! - 以穷尽匹配分派的重写器，支持按节点类型覆盖或按规则表替换

pub mod config;
pub mod core;
pub mod query;
pub mod utils;

pub use crate::core::{AstError, AstResult, RewriteError, RewriteResult};
