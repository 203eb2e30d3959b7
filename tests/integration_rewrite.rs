//! AST 重写模块集成测试
//!
//! 测试范围:
//! - DefaultRewriter - 恒等重写是不动点
//! - 重建恰好一次：数量与可选字段保持一致
//! - 语句顺序保持
//! - RuleBasedRewriter - 规则表、深度限制
//! - ExpressionRewriteVisitor - 匹配替换

mod common;

use common::assertions::{assert_count, assert_ok};
use common::data_fixtures::*;
use streamsql::config::{Config, RewriteConfig};
use streamsql::core::{RewriteError, RewriteResult};
use streamsql::query::ast::*;
use streamsql::query::visitor::{
    rewrite, AstRewriter, DefaultRewriter, ExpressionRewriteVisitor, RewriteRules,
    RuleBasedRewriter,
};

/// 把字符串字面量转成大写的进入规则
fn uppercase_literal(node: &AstNode, _ctx: &()) -> Option<AstNode> {
    match node {
        AstNode::Expression(Expression::Literal(literal)) => match literal.value() {
            Literal::String(s) => Some(Expression::literal(s.to_uppercase()).into()),
            _ => None,
        },
        _ => None,
    }
}

fn uppercase_rules() -> RewriteRules<()> {
    RewriteRules::new().on_enter(NodeKind::Literal, uppercase_literal)
}

// ==================== 恒等重写 ====================

#[test]
fn test_identity_rewrite_is_fixed_point() {
    let roots: Vec<AstNode> = vec![
        windowed_join_query().into(),
        Statement::from(three_statement_script()).into(),
        Statement::from(s3_sink_connector()).into(),
        Statement::from(pageviews_stream()).into(),
    ];
    for root in roots {
        let result = assert_ok(rewrite(&root, &()));
        assert_eq!(result, root);
        assert_eq!(result.kind(), root.kind());
    }
}

#[test]
fn test_rewrite_does_not_touch_input() {
    let root: AstNode = windowed_join_query().into();
    let snapshot = root.clone();
    let mut rewriter = RuleBasedRewriter::new(uppercase_rules());
    let _ = assert_ok(rewriter.rewrite(&root, &()));
    assert_eq!(root, snapshot);
}

// ==================== 重建恰好一次 ====================

#[test]
fn test_query_shape_preserved() {
    let input = windowed_join_query();
    let mut rewriter = RuleBasedRewriter::new(uppercase_rules());
    let output = Query::try_from(assert_ok(rewriter.rewrite(&input.clone().into(), &())))
        .expect("根节点仍是查询");

    assert_count(
        output.select().select_items(),
        input.select().select_items().len(),
        "选择项",
    );
    let input_group_by = input.group_by().expect("输入有 GROUP BY");
    let output_group_by = output.group_by().expect("输出有 GROUP BY");
    assert_count(
        output_group_by.grouping_elements(),
        input_group_by.grouping_elements().len(),
        "分组元素",
    );
    assert_eq!(output.window().is_some(), input.window().is_some());
    assert_eq!(output.where_clause().is_some(), input.where_clause().is_some());
    assert_eq!(output.having().is_some(), input.having().is_some());
    assert_eq!(output.limit(), input.limit());
}

#[test]
fn test_absent_optionals_stay_absent() {
    let input = Query::simple(
        Select::new(vec![AllColumns::new(None).into()]),
        table("t"),
    );
    let output = Query::try_from(assert_ok(DefaultRewriter.rewrite(&input.clone().into(), &())))
        .expect("根节点仍是查询");
    assert!(output.window().is_none());
    assert!(output.where_clause().is_none());
    assert!(output.group_by().is_none());
    assert!(output.having().is_none());
    assert!(output.limit().is_none());
}

// ==================== 语句顺序 ====================

#[test]
fn test_statement_order_preserved() {
    let script = three_statement_script();
    let mut rewriter = RuleBasedRewriter::new(uppercase_rules());
    let result = assert_ok(rewriter.rewrite_statement(&script.clone().into(), &()));

    let statements = match result {
        Statement::Statements(statements) => statements,
        other => panic!("期望 Statements, 实际为 {}", other.kind()),
    };
    let kinds: Vec<NodeKind> = statements.statements().iter().map(Statement::kind).collect();
    assert_eq!(
        kinds,
        vec![NodeKind::CreateStream, NodeKind::CreateStreamAsSelect, NodeKind::DropTable]
    );
    // 无字符串字面量可改写，结构保持一致
    assert_eq!(statements, script);
}

// ==================== 连接器配置 ====================

#[test]
fn test_connector_config_not_descended() {
    let connector = Statement::from(s3_sink_connector());
    let mut rewriter = RuleBasedRewriter::new(uppercase_rules());
    let result = assert_ok(rewriter.rewrite_statement(&connector, &()));

    assert_eq!(result, connector);
    match result {
        Statement::CreateConnector(c) => {
            assert_eq!(c.name(), "s3sink");
            assert_eq!(c.connector_type(), ConnectorType::Sink);
            assert_eq!(c.config().get("connector.class"), Some(&Literal::from("S3")));
        }
        other => panic!("期望 CreateConnector, 实际为 {}", other.kind()),
    }
}

#[test]
fn test_literals_in_query_are_rewritten() {
    let query = Query::new(
        Select::new(vec![aliased(Expression::literal("x"), "tag")]),
        table("t"),
        None,
        Some(
            LikePredicate::new(col("name"), Expression::literal("ab%")).into(),
        ),
        None,
        None,
        None,
    );
    let mut rewriter = RuleBasedRewriter::new(uppercase_rules());
    let result = assert_ok(rewriter.rewrite(&query.into(), &()));
    assert_eq!(
        result.to_string(),
        "SELECT 'X' AS tag FROM t WHERE (name LIKE 'AB%')"
    );
}

// ==================== 类型检查与深度 ====================

#[test]
fn test_rule_returning_wrong_family_fails() {
    let rules = RewriteRules::new().on_enter(NodeKind::Table, |_node: &AstNode, _ctx: &()| {
        Some(Expression::literal(0).into())
    });
    let mut rewriter = RuleBasedRewriter::new(rules);
    let result = rewriter.rewrite(&windowed_join_query().into(), &());
    assert_eq!(
        result,
        Err(RewriteError::UnexpectedNode {
            expected: "Relation",
            actual: NodeKind::Literal,
        })
    );
}

#[test]
fn test_exit_rule_error_propagates() {
    let rules = RewriteRules::new().on_exit(
        NodeKind::DropTable,
        |_node: AstNode, _ctx: &()| -> RewriteResult<AstNode> {
            Err(RewriteError::InvalidNode(
                streamsql::core::AstError::illegal_argument("不允许删除表"),
            ))
        },
    );
    let mut rewriter = RuleBasedRewriter::new(rules);
    let result = rewriter.rewrite(&Statement::from(three_statement_script()).into(), &());
    assert!(matches!(result, Err(RewriteError::InvalidNode(_))));
}

#[test]
fn test_depth_limit_from_config() {
    let mut config = Config::default();
    config.rewrite = RewriteConfig { max_depth: 3 };
    let mut rewriter = RuleBasedRewriter::<()>::with_config(RewriteRules::new(), &config.rewrite);
    assert_eq!(rewriter.max_depth(), 3);

    let result = rewriter.rewrite(&windowed_join_query().into(), &());
    assert_eq!(result, Err(RewriteError::DepthLimitExceeded { limit: 3 }));
}

// ==================== 表达式匹配替换 ====================

fn is_region(expr: &Expression) -> bool {
    expr == &col("region")
}

fn to_country(_expr: &Expression) -> Expression {
    col("country")
}

#[test]
fn test_expression_visitor_rewrites_select_and_group_by() {
    let root: AstNode = windowed_join_query().into();
    let mut visitor = ExpressionRewriteVisitor::new(is_region, to_country);
    let result = Query::try_from(assert_ok(visitor.rewrite(&root, &()))).expect("根节点仍是查询");

    assert_eq!(visitor.rewritten_count(), 2);
    let group_by = result.group_by().expect("有 GROUP BY");
    let sets = group_by.enumerate_grouping_sets().expect("可展开");
    assert!(sets[0].contains(&col("country")));
    assert!(!sets[0].contains(&col("region")));
}
