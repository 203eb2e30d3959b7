//! AST 模型集成测试
//!
//! 测试范围:
//! - 位置无关的相等性与哈希
//! - 分组集合展开
//! - 格式化输出
//! - serde 序列化

mod common;

use common::assertions::{assert_count, assert_err_with};
use common::data_fixtures::*;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use streamsql::core::NodeLocation;
use streamsql::query::ast::*;

fn hash_of<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

// ==================== 相等性 ====================

#[test]
fn test_create_table_equality_groups() {
    let elements = TableElements::of(vec![
        TableElement::value("Bob", SqlType::String).expect("有效的列"),
    ]);
    let props = PropertyMap::of([("value_format", "json"), ("kafka_topic", "foo")]);
    let other_props = PropertyMap::of([
        ("value_format", "json"),
        ("kafka_topic", "foo"),
        ("timestamp", "foo"),
    ]);

    let base = CreateTable::new(name("bob"), elements.clone(), true, props.clone());
    let same_group = [
        CreateTable::new(name("bob"), elements.clone(), true, props.clone()),
        base.clone().with_location(NodeLocation::new(0, 0)),
        base.clone().with_location(NodeLocation::new(1, 0)),
    ];
    for other in &same_group {
        assert_eq!(&base, other);
        assert_eq!(hash_of(&base), hash_of(other));
    }

    let different = [
        CreateTable::new(name("jim"), elements.clone(), true, props.clone()),
        CreateTable::new(name("bob"), TableElements::of(vec![]), true, props.clone()),
        CreateTable::new(name("bob"), elements.clone(), false, props.clone()),
        CreateTable::new(name("bob"), elements, true, other_props),
    ];
    for other in &different {
        assert_ne!(&base, other);
    }
}

#[test]
fn test_whole_query_equality_ignores_locations() {
    let plain = windowed_join_query();
    let located = plain.clone().with_location(NodeLocation::new(12, 3));
    assert_eq!(plain, located);
    assert_eq!(hash_of(&plain), hash_of(&located));
    assert_eq!(located.location(), Some(NodeLocation::new(12, 3)));
    assert_eq!(plain.location(), None);
}

// ==================== 分组集合 ====================

#[test]
fn test_simple_group_by_yields_single_set() {
    let element: GroupingElement = SimpleGroupBy::new(vec![col("a"), col("b")]).into();
    let sets = element.enumerate_grouping_sets().expect("可展开");
    assert_count(&sets, 1, "分组集合");
    assert!(sets[0].contains(&col("a")));
    assert!(sets[0].contains(&col("b")));
    assert_eq!(sets[0].len(), 2);
}

#[test]
fn test_group_by_with_cube_and_rollup() {
    let group_by = GroupBy::new(vec![
        Cube::new(vec![col("a"), col("b")]).expect("列数在上限内").into(),
        Rollup::new(vec![col("c")]).into(),
    ]);
    let sets = group_by.enumerate_grouping_sets().expect("可展开");
    // 4 (CUBE) x 2 (ROLLUP)
    assert_count(&sets, 8, "分组集合");
    assert!(sets.iter().any(|set| set.is_empty()));
    assert_eq!(
        group_by.to_string(),
        "GROUP BY CUBE (a, b), ROLLUP (c)"
    );
}

#[test]
fn test_grouping_sets_format() {
    let element: GroupingElement =
        GroupingSets::new(vec![vec![col("a"), col("b")], vec![col("a")], vec![]]).into();
    assert_eq!(element.format(), "GROUPING SETS ((a, b), (a), ())");
    assert_count(&element.enumerate_grouping_sets().expect("可展开"), 3, "分组集合");
}

// ==================== 构造校验 ====================

#[test]
fn test_validating_constructors() {
    assert_err_with(QualifiedName::of(Vec::<String>::new()), "非法参数");
    assert_err_with(
        CreateConnector::new("", PropertyMap::new(), ConnectorType::Sink),
        "非法参数",
    );
    assert_err_with(InListExpression::new(vec![]), "非法参数");
    assert_err_with(AliasedRelation::new(table("t"), ""), "非法参数");
    assert_err_with(SqlType::decimal(2, 3), "非法参数");
    assert_err_with(Literal::decimal("1.2.3"), "非法参数");
}

// ==================== 格式化 ====================

#[test]
fn test_query_format() {
    let query = windowed_join_query();
    assert_eq!(
        query.to_string(),
        "SELECT o.user_id, COUNT() AS cnt, region \
         FROM orders AS o LEFT JOIN users AS u WITHIN 1 HOURS ON (o.user_id = u.id) \
         WINDOW TUMBLING (SIZE 30 SECONDS) \
         WHERE (o.amount > 100) \
         GROUP BY o.user_id, region \
         HAVING (COUNT() > 1) \
         LIMIT 10"
    );
}

#[test]
fn test_script_format() {
    let script = Statement::from(three_statement_script());
    assert_eq!(
        script.to_string(),
        "CREATE STREAM IF NOT EXISTS pageviews (ID STRING KEY, url STRING, viewtime BIGINT) \
         WITH (kafka_topic='pageviews', value_format='json');\n\
         CREATE STREAM enriched AS SELECT * FROM pageviews PARTITION BY url;\n\
         DROP TABLE IF EXISTS legacy DELETE TOPIC"
    );
}

// ==================== 序列化 ====================

#[test]
fn test_json_serialization_drops_nothing() {
    let statement = Statement::from(windowed_join_query());
    let json = serde_json::to_string(&statement).expect("序列化成功");
    let decoded: Statement = serde_json::from_str(&json).expect("反序列化成功");
    assert_eq!(decoded, statement);
    assert_eq!(decoded.to_string(), statement.to_string());
}

#[test]
fn test_deserialization_runs_constructor_checks() {
    let element = TableElement::value("url", SqlType::String)
        .expect("有效的列")
        .with_location(NodeLocation::new(3, 7));
    let mut json = serde_json::to_value(&element).expect("序列化成功");
    let decoded: TableElement = serde_json::from_value(json.clone()).expect("反序列化成功");
    assert_eq!(decoded, element);
    assert_eq!(decoded.location(), Some(NodeLocation::new(3, 7)));

    json["name"] = serde_json::Value::String(String::new());
    let error = serde_json::from_value::<TableElement>(json).expect_err("空列名");
    assert!(error.to_string().contains("列名不能为空"));

    let in_list = serde_json::json!({ "location": null, "values": [] });
    assert!(serde_json::from_value::<InListExpression>(in_list).is_err());

    let connector = serde_json::json!({
        "location": null,
        "name": "",
        "config": {},
        "connector_type": "Sink",
    });
    assert!(serde_json::from_value::<CreateConnector>(connector).is_err());
}

#[test]
fn test_deserialization_rejects_invalid_nested_node() {
    let statement = Statement::from(windowed_join_query());
    let mut json = serde_json::to_value(&statement).expect("序列化成功");
    // FROM orders AS o：把别名清空
    json["Query"]["from"]["Join"]["left"]["Aliased"]["alias"] =
        serde_json::Value::String(String::new());
    assert!(serde_json::from_value::<Statement>(json).is_err());
}
