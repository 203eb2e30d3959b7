//! ExpressionRewriteVisitor - 按匹配器替换表达式的访问器
//!
//! 主要功能：
//! - 使用 Matcher 函数判断表达式是否需要重写
//! - 使用 Rewriter 函数生成替换表达式
//! - 前序匹配，替换结果不再下降
//! - 可作用于任意 AST 节点中出现的表达式

use super::ast_rewriter::AstRewriter;
use crate::core::RewriteResult;
use crate::query::ast::{AstNode, Expression};

/// 匹配器类型：判断表达式是否需要重写
pub type Matcher = fn(&Expression) -> bool;

/// 重写器类型：执行表达式重写
pub type Rewriter = fn(&Expression) -> Expression;

/// 表达式重写访问器
#[derive(Debug, Clone)]
pub struct ExpressionRewriteVisitor {
    matcher: Matcher,
    rewriter: Rewriter,
    /// 已替换的表达式数量
    rewritten: usize,
}

impl ExpressionRewriteVisitor {
    pub fn new(matcher: Matcher, rewriter: Rewriter) -> Self {
        Self {
            matcher,
            rewriter,
            rewritten: 0,
        }
    }

    /// 静态方法：转换单个表达式
    pub fn transform(
        expr: &Expression,
        matcher: Matcher,
        rewriter: Rewriter,
    ) -> RewriteResult<Expression> {
        let mut visitor = Self::new(matcher, rewriter);
        let result = visitor.rewrite(&AstNode::Expression(expr.clone()), &())?;
        Expression::try_from(result)
    }

    /// 转换整棵树中的表达式
    pub fn transform_tree(
        root: &AstNode,
        matcher: Matcher,
        rewriter: Rewriter,
    ) -> RewriteResult<AstNode> {
        Self::new(matcher, rewriter).rewrite(root, &())
    }

    pub fn matcher(&self) -> Matcher {
        self.matcher
    }

    pub fn rewriter(&self) -> Rewriter {
        self.rewriter
    }

    pub fn rewritten_count(&self) -> usize {
        self.rewritten
    }
}

impl AstRewriter<()> for ExpressionRewriteVisitor {
    fn process(&mut self, node: AstNode, ctx: &()) -> RewriteResult<AstNode> {
        if let AstNode::Expression(ref expr) = node {
            if (self.matcher)(expr) {
                self.rewritten += 1;
                return Ok(AstNode::Expression((self.rewriter)(expr)));
            }
        }
        self.dispatch(node, ctx)
    }
}
