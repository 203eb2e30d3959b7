//! 统一错误处理
//!
//! 1. **构造期校验**：节点构造函数发现非法参数时立即返回 `AstError`，不做延迟校验
//! 2. **重写期契约违例**：子节点重写结果类型不符、递归过深等属于编程错误，
//!    以 `RewriteError` 立即返回，不重试也不吞掉

use crate::query::ast::NodeKind;
use thiserror::Error;

/// AST 节点构造错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AstError {
    #[error("非法参数: {0}")]
    IllegalArgument(String),
}

impl AstError {
    pub fn illegal_argument<T: Into<String>>(message: T) -> Self {
        AstError::IllegalArgument(message.into())
    }
}

/// AST 构造结果类型
pub type AstResult<T> = Result<T, AstError>;

/// 树重写错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RewriteError {
    #[error("重写结果类型不匹配: 期望 {expected}, 实际为 {actual}")]
    UnexpectedNode {
        expected: &'static str,
        actual: NodeKind,
    },

    #[error("重写递归深度超过上限 {limit}")]
    DepthLimitExceeded { limit: usize },

    #[error("重写生成了非法节点: {0}")]
    InvalidNode(#[from] AstError),
}

impl RewriteError {
    pub fn unexpected(expected: &'static str, actual: NodeKind) -> Self {
        RewriteError::UnexpectedNode { expected, actual }
    }
}

/// 重写结果类型
pub type RewriteResult<T> = Result<T, RewriteError>;
