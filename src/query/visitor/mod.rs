//! AST 重写器模块
//! 用于在保持树结构的前提下转换语句和表达式

mod ast_rewriter;
mod rewrite_visitor;
mod rule_rewriter;

pub use ast_rewriter::{rewrite, AstRewriter, DefaultRewriter};
pub use rewrite_visitor::{ExpressionRewriteVisitor, Matcher, Rewriter};
pub use rule_rewriter::{EnterRule, ExitRule, RewriteRules, RuleBasedRewriter};
