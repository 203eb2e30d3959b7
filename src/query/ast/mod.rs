//! 流式 SQL 抽象语法树
//!
//! 节点按族组织：语句、表达式、关系、查询结构、窗口和表元素。
//! 所有节点不可变、可克隆，相等性和哈希与源码位置无关。

mod macros;

pub mod expression;
pub mod literal;
pub mod node;
pub mod properties;
pub mod query;
pub mod relation;
pub mod stmt;
pub mod table_element;
pub mod types;
pub mod window;

pub use expression::*;
pub use literal::Literal;
pub use node::{AstNode, NodeKind};
pub use properties::PropertyMap;
pub use query::*;
pub use relation::*;
pub use stmt::*;
pub use table_element::{Namespace, TableElement, TableElements};
pub use types::*;
pub use window::{KsqlWindowExpression, WindowExpression, WindowKind};
