// 查询层
//
// - ast: 流式 SQL 的抽象语法树
// - visitor: 基于 AST 的通用重写器

pub mod ast;
pub mod visitor;

pub use ast::{AstNode, NodeKind, Statement};
pub use visitor::{AstRewriter, DefaultRewriter, RewriteRules, RuleBasedRewriter};
