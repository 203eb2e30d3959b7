//! 基于规则表的重写器
//!
//! 规则按 `NodeKind` 注册：
//! - 进入规则：返回 `Some` 时直接替换该节点，不再下降
//! - 退出规则：对默认重建后的节点做后处理
//!
//! 未注册规则的节点走默认的逐子节点重建。递归深度受 `RewriteConfig::max_depth` 限制。

use super::ast_rewriter::AstRewriter;
use crate::config::RewriteConfig;
use crate::core::{RewriteError, RewriteResult};
use crate::query::ast::{AstNode, NodeKind};
use log::{trace, warn};
use std::collections::HashMap;
use std::fmt;

/// 进入规则
pub type EnterRule<C> = Box<dyn Fn(&AstNode, &C) -> Option<AstNode> + Send + Sync>;

/// 退出规则
pub type ExitRule<C> = Box<dyn Fn(AstNode, &C) -> RewriteResult<AstNode> + Send + Sync>;

/// 规则表
pub struct RewriteRules<C> {
    enter: HashMap<NodeKind, EnterRule<C>>,
    exit: HashMap<NodeKind, ExitRule<C>>,
}

impl<C> RewriteRules<C> {
    pub fn new() -> Self {
        Self {
            enter: HashMap::new(),
            exit: HashMap::new(),
        }
    }

    /// 注册进入规则，同类型已有规则会被替换
    pub fn on_enter<F>(mut self, kind: NodeKind, rule: F) -> Self
    where
        F: Fn(&AstNode, &C) -> Option<AstNode> + Send + Sync + 'static,
    {
        if self.enter.insert(kind, Box::new(rule)).is_some() {
            warn!("{} 的进入规则被替换", kind);
        }
        self
    }

    /// 注册退出规则，同类型已有规则会被替换
    pub fn on_exit<F>(mut self, kind: NodeKind, rule: F) -> Self
    where
        F: Fn(AstNode, &C) -> RewriteResult<AstNode> + Send + Sync + 'static,
    {
        if self.exit.insert(kind, Box::new(rule)).is_some() {
            warn!("{} 的退出规则被替换", kind);
        }
        self
    }

    pub fn has_rules_for(&self, kind: NodeKind) -> bool {
        self.enter.contains_key(&kind) || self.exit.contains_key(&kind)
    }

    pub fn len(&self) -> usize {
        self.enter.len() + self.exit.len()
    }

    pub fn is_empty(&self) -> bool {
        self.enter.is_empty() && self.exit.is_empty()
    }
}

impl<C> Default for RewriteRules<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for RewriteRules<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut enter: Vec<_> = self.enter.keys().collect();
        enter.sort();
        let mut exit: Vec<_> = self.exit.keys().collect();
        exit.sort();
        f.debug_struct("RewriteRules")
            .field("enter", &enter)
            .field("exit", &exit)
            .finish()
    }
}

/// 规则驱动的重写器
#[derive(Debug)]
pub struct RuleBasedRewriter<C> {
    rules: RewriteRules<C>,
    max_depth: usize,
    depth: usize,
}

impl<C> RuleBasedRewriter<C> {
    pub fn new(rules: RewriteRules<C>) -> Self {
        Self::with_config(rules, &RewriteConfig::default())
    }

    pub fn with_config(rules: RewriteRules<C>, config: &RewriteConfig) -> Self {
        Self {
            rules,
            max_depth: config.max_depth,
            depth: 0,
        }
    }

    pub fn rules(&self) -> &RewriteRules<C> {
        &self.rules
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}

impl<C> AstRewriter<C> for RuleBasedRewriter<C> {
    fn process(&mut self, node: AstNode, ctx: &C) -> RewriteResult<AstNode> {
        let kind = node.kind();
        if let Some(rule) = self.rules.enter.get(&kind) {
            if let Some(replacement) = rule(&node, ctx) {
                trace!("进入规则替换了 {} 节点, 新节点类型: {}", kind, replacement.kind());
                return Ok(replacement);
            }
        }

        if self.depth >= self.max_depth {
            warn!("重写深度达到上限 {}, 当前节点类型: {}", self.max_depth, kind);
            return Err(RewriteError::DepthLimitExceeded {
                limit: self.max_depth,
            });
        }

        self.depth += 1;
        let rebuilt = self.dispatch(node, ctx);
        self.depth -= 1;
        let rebuilt = rebuilt?;

        match self.rules.exit.get(&kind) {
            Some(rule) => {
                let result = rule(rebuilt, ctx)?;
                trace!("退出规则处理了 {} 节点, 新节点类型: {}", kind, result.kind());
                Ok(result)
            }
            None => Ok(rebuilt),
        }
    }
}
