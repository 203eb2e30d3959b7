pub mod error;
pub mod types;

// 错误和结果类型
pub use error::{AstError, AstResult, RewriteError, RewriteResult};

// 源码位置
pub use types::{Location, NodeLocation};
