//! 测试数据生成模块
//!
//! 提供各种 AST 测试数据的生成函数

use streamsql::query::ast::*;

/// 创建列引用
pub fn col(name: &str) -> Expression {
    Expression::column([name]).expect("有效的列名")
}

/// 创建限定列引用，例如 `o.id`
pub fn qualified_col(prefix: &str, name: &str) -> Expression {
    Expression::column([prefix, name]).expect("有效的列名")
}

/// 创建单段名称
pub fn name(value: &str) -> QualifiedName {
    QualifiedName::simple(value).expect("有效的名称")
}

/// 创建数据源引用
pub fn table(value: &str) -> Relation {
    Table::new(name(value)).into()
}

/// 创建带别名的列
pub fn aliased(expression: Expression, alias: &str) -> SelectItem {
    SingleColumn::new(expression, Some(alias.to_string())).into()
}

/// 订单与用户的窗口聚合查询：三个选择项、带 WITHIN 的 LEFT JOIN、
/// 滚动窗口、WHERE、两列 GROUP BY、HAVING 和 LIMIT
pub fn windowed_join_query() -> Query {
    let orders = AliasedRelation::new(table("orders"), "o").expect("有效的别名");
    let users = AliasedRelation::new(table("users"), "u").expect("有效的别名");
    let join = Join::new(
        JoinType::Left,
        orders.into(),
        users.into(),
        JoinCriteria::On(
            ComparisonExpression::new(
                ComparisonOperator::Equal,
                qualified_col("o", "user_id"),
                qualified_col("u", "id"),
            )
            .into(),
        ),
        Some(WithinExpression::symmetric(1, TimeUnit::Hours)),
    );

    let count_all: Expression = FunctionCall::new(name("COUNT"), vec![]).into();

    Query::new(
        Select::new(vec![
            SingleColumn::new(qualified_col("o", "user_id"), None).into(),
            aliased(count_all.clone(), "cnt"),
            SingleColumn::new(col("region"), None).into(),
        ]),
        join.into(),
        Some(WindowExpression::new(
            None,
            KsqlWindowExpression::tumbling(TimeSpan::new(30, TimeUnit::Seconds)),
        )),
        Some(
            ComparisonExpression::new(
                ComparisonOperator::GreaterThan,
                qualified_col("o", "amount"),
                Expression::literal(100),
            )
            .into(),
        ),
        Some(GroupBy::new(vec![SimpleGroupBy::new(vec![
            qualified_col("o", "user_id"),
            col("region"),
        ])
        .into()])),
        Some(
            ComparisonExpression::new(
                ComparisonOperator::GreaterThan,
                count_all,
                Expression::literal(1),
            )
            .into(),
        ),
        Some(10),
    )
}

/// `CREATE STREAM pageviews (ID STRING KEY, url STRING, viewtime BIGINT) WITH (...)`
pub fn pageviews_stream() -> CreateStream {
    CreateStream::new(
        name("pageviews"),
        TableElements::of(vec![
            TableElement::new(Namespace::Key, "ID", SqlType::String).expect("有效的列"),
            TableElement::value("url", SqlType::String).expect("有效的列"),
            TableElement::value("viewtime", SqlType::Bigint).expect("有效的列"),
        ]),
        true,
        PropertyMap::of([("kafka_topic", "pageviews"), ("value_format", "json")]),
    )
}

/// `CREATE SINK CONNECTOR s3sink WITH ("connector.class"='S3')`
pub fn s3_sink_connector() -> CreateConnector {
    CreateConnector::new(
        "s3sink",
        PropertyMap::of([("connector.class", "S3")]),
        ConnectorType::Sink,
    )
    .expect("有效的连接器")
}

/// 由三条语句组成的脚本：建流、派生流、删表
pub fn three_statement_script() -> Statements {
    let csas = CreateStreamAsSelect::new(
        name("enriched"),
        Query::simple(
            Select::new(vec![AllColumns::new(None).into()]),
            table("pageviews"),
        ),
        false,
        PropertyMap::new(),
        Some(col("url")),
    );
    Statements::new(vec![
        pageviews_stream().into(),
        csas.into(),
        DropTable::new(name("legacy"), true, true).into(),
    ])
}
