//! 关系（FROM 子句）AST 定义

use super::expression::Expression;
use super::macros::{impl_located, validated_serde};
use super::types::*;
use crate::core::{AstError, AstResult, Location, NodeLocation};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 关系枚举
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Relation {
    Table(Table),
    Aliased(AliasedRelation),
    Join(Join),
}

impl Relation {
    pub fn location(&self) -> Option<NodeLocation> {
        match self {
            Relation::Table(r) => r.location(),
            Relation::Aliased(r) => r.location(),
            Relation::Join(r) => r.location(),
        }
    }
}

/// 数据源引用（流或表的名称）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Table {
    pub(crate) location: Location,
    pub(crate) name: QualifiedName,
}

impl Table {
    pub fn new(name: QualifiedName) -> Self {
        Self {
            location: Location::NONE,
            name,
        }
    }

    pub fn name(&self) -> &QualifiedName {
        &self.name
    }
}

/// 带别名的关系，例如 `orders AS o`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "AliasedRelationSerde")]
pub struct AliasedRelation {
    pub(crate) location: Location,
    pub(crate) relation: Box<Relation>,
    pub(crate) alias: String,
}

impl AliasedRelation {
    pub fn new<S: Into<String>>(relation: Relation, alias: S) -> AstResult<Self> {
        let alias = alias.into();
        if alias.is_empty() {
            return Err(AstError::illegal_argument("关系别名不能为空"));
        }
        Ok(Self {
            location: Location::NONE,
            relation: Box::new(relation),
            alias,
        })
    }

    pub fn relation(&self) -> &Relation {
        &self.relation
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }
}

validated_serde!(AliasedRelation as AliasedRelationSerde {
    relation: Box<Relation>,
    alias: String,
} => |raw| AliasedRelation::new(*raw.relation, raw.alias));

/// 连接条件
///
/// 不是 AST 节点：重写时与操作符一样原样复制。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JoinCriteria {
    On(Expression),
}

impl fmt::Display for JoinCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinCriteria::On(expression) => write!(f, "ON {}", expression),
        }
    }
}

/// 流连接的时间窗口：`WITHIN 10 SECONDS` 或 `WITHIN (1 MINUTES, 2 HOURS)`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WithinExpression {
    pub(crate) location: Location,
    pub(crate) before: TimeSpan,
    pub(crate) after: TimeSpan,
}

impl WithinExpression {
    pub fn new(before: TimeSpan, after: TimeSpan) -> Self {
        Self {
            location: Location::NONE,
            before,
            after,
        }
    }

    /// 前后对称的窗口
    pub fn symmetric(size: u64, unit: TimeUnit) -> Self {
        let span = TimeSpan::new(size, unit);
        Self::new(span, span)
    }

    pub fn before(&self) -> TimeSpan {
        self.before
    }

    pub fn after(&self) -> TimeSpan {
        self.after
    }

    pub fn before_millis(&self) -> u64 {
        self.before.to_millis()
    }

    pub fn after_millis(&self) -> u64 {
        self.after.to_millis()
    }
}

impl fmt::Display for WithinExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.before == self.after {
            write!(f, "WITHIN {}", self.before)
        } else {
            write!(f, "WITHIN ({}, {})", self.before, self.after)
        }
    }
}

/// 连接，恰好两个操作数
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Join {
    pub(crate) location: Location,
    pub(crate) join_type: JoinType,
    pub(crate) left: Box<Relation>,
    pub(crate) right: Box<Relation>,
    pub(crate) criteria: JoinCriteria,
    pub(crate) within: Option<WithinExpression>,
}

impl Join {
    pub fn new(
        join_type: JoinType,
        left: Relation,
        right: Relation,
        criteria: JoinCriteria,
        within: Option<WithinExpression>,
    ) -> Self {
        Self {
            location: Location::NONE,
            join_type,
            left: Box::new(left),
            right: Box::new(right),
            criteria,
            within,
        }
    }

    pub fn join_type(&self) -> JoinType {
        self.join_type
    }

    pub fn left(&self) -> &Relation {
        &self.left
    }

    pub fn right(&self) -> &Relation {
        &self.right
    }

    pub fn criteria(&self) -> &JoinCriteria {
        &self.criteria
    }

    pub fn within(&self) -> Option<&WithinExpression> {
        self.within.as_ref()
    }
}

impl_located!(Table, AliasedRelation, WithinExpression, Join);

impl From<Table> for Relation {
    fn from(node: Table) -> Self {
        Relation::Table(node)
    }
}

impl From<AliasedRelation> for Relation {
    fn from(node: AliasedRelation) -> Self {
        Relation::Aliased(node)
    }
}

impl From<Join> for Relation {
    fn from(node: Join) -> Self {
        Relation::Join(node)
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Relation::Table(table) => write!(f, "{}", table.name),
            Relation::Aliased(aliased) => write!(f, "{} AS {}", aliased.relation, aliased.alias),
            Relation::Join(join) => {
                write!(f, "{} {} JOIN {}", join.left, join.join_type, join.right)?;
                if let Some(ref within) = join.within {
                    write!(f, " {}", within)?;
                }
                write!(f, " {}", join.criteria)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(name: &str) -> Relation {
        Table::new(QualifiedName::simple(name).expect("valid name")).into()
    }

    #[test]
    fn test_join_display() {
        let criteria = JoinCriteria::On(
            Expression::column(["o", "id"]).expect("valid column"),
        );
        let join: Relation = Join::new(
            JoinType::Left,
            AliasedRelation::new(table("orders"), "o").expect("valid alias").into(),
            table("shipments"),
            criteria,
            Some(WithinExpression::symmetric(1, TimeUnit::Hours)),
        )
        .into();
        assert_eq!(
            join.to_string(),
            "orders AS o LEFT JOIN shipments WITHIN 1 HOURS ON o.id"
        );
    }

    #[test]
    fn test_within_expression() {
        let within = WithinExpression::new(
            TimeSpan::new(10, TimeUnit::Seconds),
            TimeSpan::new(2, TimeUnit::Minutes),
        );
        assert_eq!(within.to_string(), "WITHIN (10 SECONDS, 2 MINUTES)");
        assert_eq!(within.before_millis(), 10_000);
        assert_eq!(within.after_millis(), 120_000);
    }

    #[test]
    fn test_alias_validation() {
        assert!(AliasedRelation::new(table("orders"), "").is_err());
    }
}
