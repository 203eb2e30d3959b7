//! AST 节点总类型
//!
//! `AstNode` 把各个节点族合并为一个和类型，重写器以它为统一的输入输出。
//! `NodeKind` 是所有具体节点的扁平判别值，用于规则注册和错误报告。

use super::expression::*;
use super::query::*;
use super::relation::*;
use super::stmt::*;
use super::table_element::TableElement;
use super::window::{KsqlWindowExpression, WindowExpression};
use crate::core::{NodeLocation, RewriteError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 具体节点类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeKind {
    // 语句
    Statements,
    CreateStream,
    CreateTable,
    CreateStreamAsSelect,
    CreateTableAsSelect,
    InsertInto,
    DropTable,
    CreateConnector,
    Query,
    // 表达式
    ArithmeticBinary,
    ArithmeticUnary,
    Comparison,
    LogicalBinary,
    Between,
    InPredicate,
    InList,
    Like,
    IsNull,
    IsNotNull,
    Not,
    FunctionCall,
    Cast,
    Dereference,
    Subscript,
    SimpleCase,
    SearchedCase,
    WhenClause,
    QualifiedNameReference,
    Literal,
    // 关系
    Table,
    AliasedRelation,
    Join,
    // 查询结构
    Select,
    SingleColumn,
    AllColumns,
    GroupBy,
    SimpleGroupBy,
    Rollup,
    Cube,
    GroupingSets,
    WindowExpression,
    KsqlWindowExpression,
    WithinExpression,
    TableElement,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// AST 节点
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AstNode {
    Statement(Statement),
    Expression(Expression),
    Relation(Relation),
    Select(Select),
    SelectItem(SelectItem),
    GroupBy(GroupBy),
    GroupingElement(GroupingElement),
    WindowExpression(WindowExpression),
    KsqlWindowExpression(KsqlWindowExpression),
    WithinExpression(WithinExpression),
    TableElement(TableElement),
}

impl AstNode {
    pub fn kind(&self) -> NodeKind {
        match self {
            AstNode::Statement(s) => s.kind(),
            AstNode::Expression(e) => e.kind(),
            AstNode::Relation(r) => match r {
                Relation::Table(_) => NodeKind::Table,
                Relation::Aliased(_) => NodeKind::AliasedRelation,
                Relation::Join(_) => NodeKind::Join,
            },
            AstNode::Select(_) => NodeKind::Select,
            AstNode::SelectItem(item) => match item {
                SelectItem::Single(_) => NodeKind::SingleColumn,
                SelectItem::All(_) => NodeKind::AllColumns,
            },
            AstNode::GroupBy(_) => NodeKind::GroupBy,
            AstNode::GroupingElement(element) => match element {
                GroupingElement::Simple(_) => NodeKind::SimpleGroupBy,
                GroupingElement::Rollup(_) => NodeKind::Rollup,
                GroupingElement::Cube(_) => NodeKind::Cube,
                GroupingElement::GroupingSets(_) => NodeKind::GroupingSets,
            },
            AstNode::WindowExpression(_) => NodeKind::WindowExpression,
            AstNode::KsqlWindowExpression(_) => NodeKind::KsqlWindowExpression,
            AstNode::WithinExpression(_) => NodeKind::WithinExpression,
            AstNode::TableElement(_) => NodeKind::TableElement,
        }
    }

    pub fn location(&self) -> Option<NodeLocation> {
        match self {
            AstNode::Statement(n) => n.location(),
            AstNode::Expression(n) => n.location(),
            AstNode::Relation(n) => n.location(),
            AstNode::Select(n) => n.location(),
            AstNode::SelectItem(n) => n.location(),
            AstNode::GroupBy(n) => n.location(),
            AstNode::GroupingElement(n) => n.location(),
            AstNode::WindowExpression(n) => n.location(),
            AstNode::KsqlWindowExpression(n) => n.location(),
            AstNode::WithinExpression(n) => n.location(),
            AstNode::TableElement(n) => n.location(),
        }
    }
}

impl Expression {
    pub fn kind(&self) -> NodeKind {
        match self {
            Expression::ArithmeticBinary(_) => NodeKind::ArithmeticBinary,
            Expression::ArithmeticUnary(_) => NodeKind::ArithmeticUnary,
            Expression::Comparison(_) => NodeKind::Comparison,
            Expression::LogicalBinary(_) => NodeKind::LogicalBinary,
            Expression::Between(_) => NodeKind::Between,
            Expression::In(_) => NodeKind::InPredicate,
            Expression::InList(_) => NodeKind::InList,
            Expression::Like(_) => NodeKind::Like,
            Expression::IsNull(_) => NodeKind::IsNull,
            Expression::IsNotNull(_) => NodeKind::IsNotNull,
            Expression::Not(_) => NodeKind::Not,
            Expression::FunctionCall(_) => NodeKind::FunctionCall,
            Expression::Cast(_) => NodeKind::Cast,
            Expression::Dereference(_) => NodeKind::Dereference,
            Expression::Subscript(_) => NodeKind::Subscript,
            Expression::SimpleCase(_) => NodeKind::SimpleCase,
            Expression::SearchedCase(_) => NodeKind::SearchedCase,
            Expression::WhenClause(_) => NodeKind::WhenClause,
            Expression::QualifiedNameReference(_) => NodeKind::QualifiedNameReference,
            Expression::Literal(_) => NodeKind::Literal,
        }
    }
}

impl fmt::Display for AstNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AstNode::Statement(n) => write!(f, "{}", n),
            AstNode::Expression(n) => write!(f, "{}", n),
            AstNode::Relation(n) => write!(f, "{}", n),
            AstNode::Select(n) => write!(f, "{}", n),
            AstNode::SelectItem(n) => write!(f, "{}", n),
            AstNode::GroupBy(n) => write!(f, "{}", n),
            AstNode::GroupingElement(n) => write!(f, "{}", n),
            AstNode::WindowExpression(n) => write!(f, "{}", n),
            AstNode::KsqlWindowExpression(n) => write!(f, "{}", n),
            AstNode::WithinExpression(n) => write!(f, "{}", n),
            AstNode::TableElement(n) => write!(f, "{}", n),
        }
    }
}

macro_rules! impl_node_family {
    ($($family:ident),+ $(,)?) => {
        $(
            impl From<$family> for AstNode {
                fn from(node: $family) -> Self {
                    AstNode::$family(node)
                }
            }

            impl TryFrom<AstNode> for $family {
                type Error = RewriteError;

                fn try_from(node: AstNode) -> Result<Self, Self::Error> {
                    match node {
                        AstNode::$family(inner) => Ok(inner),
                        other => Err(RewriteError::unexpected(stringify!($family), other.kind())),
                    }
                }
            }
        )+
    };
}

impl_node_family!(
    Statement,
    Expression,
    Relation,
    Select,
    SelectItem,
    GroupBy,
    GroupingElement,
    WindowExpression,
    KsqlWindowExpression,
    WithinExpression,
    TableElement,
);

impl From<Query> for AstNode {
    fn from(node: Query) -> Self {
        AstNode::Statement(Statement::Query(node))
    }
}

impl TryFrom<AstNode> for Query {
    type Error = RewriteError;

    fn try_from(node: AstNode) -> Result<Self, Self::Error> {
        match node {
            AstNode::Statement(Statement::Query(query)) => Ok(query),
            other => Err(RewriteError::unexpected("Query", other.kind())),
        }
    }
}

impl From<WhenClause> for AstNode {
    fn from(node: WhenClause) -> Self {
        AstNode::Expression(Expression::WhenClause(node))
    }
}

impl TryFrom<AstNode> for WhenClause {
    type Error = RewriteError;

    fn try_from(node: AstNode) -> Result<Self, Self::Error> {
        match node {
            AstNode::Expression(Expression::WhenClause(clause)) => Ok(clause),
            other => Err(RewriteError::unexpected("WhenClause", other.kind())),
        }
    }
}

impl From<InListExpression> for AstNode {
    fn from(node: InListExpression) -> Self {
        AstNode::Expression(Expression::InList(node))
    }
}

impl TryFrom<AstNode> for InListExpression {
    type Error = RewriteError;

    fn try_from(node: AstNode) -> Result<Self, Self::Error> {
        match node {
            AstNode::Expression(Expression::InList(list)) => Ok(list),
            other => Err(RewriteError::unexpected("InListExpression", other.kind())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::ast::types::QualifiedName;

    #[test]
    fn test_kind_of_each_family() {
        let table: AstNode =
            Relation::Table(Table::new(QualifiedName::simple("t").expect("valid"))).into();
        assert_eq!(table.kind(), NodeKind::Table);

        let literal: AstNode = Expression::literal(1).into();
        assert_eq!(literal.kind(), NodeKind::Literal);

        let all: AstNode = SelectItem::from(AllColumns::new(None)).into();
        assert_eq!(all.kind(), NodeKind::AllColumns);
    }

    #[test]
    fn test_checked_cast() {
        let literal: AstNode = Expression::literal("x").into();
        assert!(Expression::try_from(literal.clone()).is_ok());

        let err = Relation::try_from(literal).expect_err("should not cast");
        assert_eq!(
            err.to_string(),
            "重写结果类型不匹配: 期望 Relation, 实际为 Literal"
        );
    }

    #[test]
    fn test_query_is_a_statement() {
        let query = Query::simple(
            Select::new(vec![AllColumns::new(None).into()]),
            Relation::Table(Table::new(QualifiedName::simple("t").expect("valid"))),
        );
        let node = AstNode::from(query.clone());
        assert_eq!(node.kind(), NodeKind::Query);
        assert!(matches!(node, AstNode::Statement(Statement::Query(_))));
        assert_eq!(Query::try_from(node).expect("query"), query);
    }

    #[test]
    fn test_node_kind_display() {
        assert_eq!(NodeKind::CreateConnector.to_string(), "CreateConnector");
    }
}
