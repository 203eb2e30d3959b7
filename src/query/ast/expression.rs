//! 表达式 AST 定义
//!
//! 基于枚举的表达式定义。每个变体对应一个不可变结构体，
//! 子节点在构造时一次性拥有，之后只能通过访问器读取。

use super::literal::Literal;
use super::macros::{impl_located, validated_serde};
use super::types::*;
use crate::core::{AstError, AstResult, Location, NodeLocation};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 表达式枚举 - 核心 AST 节点
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Expression {
    ArithmeticBinary(ArithmeticBinaryExpression),
    ArithmeticUnary(ArithmeticUnaryExpression),
    Comparison(ComparisonExpression),
    LogicalBinary(LogicalBinaryExpression),
    Between(BetweenPredicate),
    In(InPredicate),
    InList(InListExpression),
    Like(LikePredicate),
    IsNull(IsNullPredicate),
    IsNotNull(IsNotNullPredicate),
    Not(NotExpression),
    FunctionCall(FunctionCall),
    Cast(Cast),
    Dereference(DereferenceExpression),
    Subscript(SubscriptExpression),
    SimpleCase(SimpleCaseExpression),
    SearchedCase(SearchedCaseExpression),
    WhenClause(WhenClause),
    QualifiedNameReference(QualifiedNameReference),
    Literal(LiteralExpression),
}

impl Expression {
    /// 获取表达式的位置信息
    pub fn location(&self) -> Option<NodeLocation> {
        match self {
            Expression::ArithmeticBinary(e) => e.location(),
            Expression::ArithmeticUnary(e) => e.location(),
            Expression::Comparison(e) => e.location(),
            Expression::LogicalBinary(e) => e.location(),
            Expression::Between(e) => e.location(),
            Expression::In(e) => e.location(),
            Expression::InList(e) => e.location(),
            Expression::Like(e) => e.location(),
            Expression::IsNull(e) => e.location(),
            Expression::IsNotNull(e) => e.location(),
            Expression::Not(e) => e.location(),
            Expression::FunctionCall(e) => e.location(),
            Expression::Cast(e) => e.location(),
            Expression::Dereference(e) => e.location(),
            Expression::Subscript(e) => e.location(),
            Expression::SimpleCase(e) => e.location(),
            Expression::SearchedCase(e) => e.location(),
            Expression::WhenClause(e) => e.location(),
            Expression::QualifiedNameReference(e) => e.location(),
            Expression::Literal(e) => e.location(),
        }
    }

    /// 字面量表达式
    pub fn literal<L: Into<Literal>>(value: L) -> Self {
        Expression::Literal(LiteralExpression::new(value.into()))
    }

    /// 列引用表达式，`parts` 为限定名的各部分
    pub fn column<I, S>(parts: I) -> AstResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Expression::QualifiedNameReference(
            QualifiedNameReference::new(QualifiedName::of(parts)?),
        ))
    }

    /// 检查表达式是否为字面量
    pub fn is_literal(&self) -> bool {
        matches!(self, Expression::Literal(_))
    }
}

/// 字面量表达式
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LiteralExpression {
    pub(crate) location: Location,
    pub(crate) value: Literal,
}

impl LiteralExpression {
    pub fn new(value: Literal) -> Self {
        Self {
            location: Location::NONE,
            value,
        }
    }

    pub fn value(&self) -> &Literal {
        &self.value
    }
}

/// 限定名引用表达式，例如 `o.id`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QualifiedNameReference {
    pub(crate) location: Location,
    pub(crate) name: QualifiedName,
}

impl QualifiedNameReference {
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

/// 算术二元表达式
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArithmeticBinaryExpression {
    pub(crate) location: Location,
    pub(crate) operator: ArithmeticOperator,
    pub(crate) left: Box<Expression>,
    pub(crate) right: Box<Expression>,
}

impl ArithmeticBinaryExpression {
    pub fn new(operator: ArithmeticOperator, left: Expression, right: Expression) -> Self {
        Self {
            location: Location::NONE,
            operator,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn operator(&self) -> ArithmeticOperator {
        self.operator
    }

    pub fn left(&self) -> &Expression {
        &self.left
    }

    pub fn right(&self) -> &Expression {
        &self.right
    }
}

/// 算术一元表达式
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArithmeticUnaryExpression {
    pub(crate) location: Location,
    pub(crate) sign: Sign,
    pub(crate) value: Box<Expression>,
}

impl ArithmeticUnaryExpression {
    pub fn new(sign: Sign, value: Expression) -> Self {
        Self {
            location: Location::NONE,
            sign,
            value: Box::new(value),
        }
    }

    pub fn sign(&self) -> Sign {
        self.sign
    }

    pub fn value(&self) -> &Expression {
        &self.value
    }
}

/// 比较表达式
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComparisonExpression {
    pub(crate) location: Location,
    pub(crate) operator: ComparisonOperator,
    pub(crate) left: Box<Expression>,
    pub(crate) right: Box<Expression>,
}

impl ComparisonExpression {
    pub fn new(operator: ComparisonOperator, left: Expression, right: Expression) -> Self {
        Self {
            location: Location::NONE,
            operator,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn operator(&self) -> ComparisonOperator {
        self.operator
    }

    pub fn left(&self) -> &Expression {
        &self.left
    }

    pub fn right(&self) -> &Expression {
        &self.right
    }
}

/// 逻辑二元表达式（AND / OR）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LogicalBinaryExpression {
    pub(crate) location: Location,
    pub(crate) operator: LogicalOperator,
    pub(crate) left: Box<Expression>,
    pub(crate) right: Box<Expression>,
}

impl LogicalBinaryExpression {
    pub fn new(operator: LogicalOperator, left: Expression, right: Expression) -> Self {
        Self {
            location: Location::NONE,
            operator,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn and(left: Expression, right: Expression) -> Self {
        Self::new(LogicalOperator::And, left, right)
    }

    pub fn or(left: Expression, right: Expression) -> Self {
        Self::new(LogicalOperator::Or, left, right)
    }

    pub fn operator(&self) -> LogicalOperator {
        self.operator
    }

    pub fn left(&self) -> &Expression {
        &self.left
    }

    pub fn right(&self) -> &Expression {
        &self.right
    }
}

/// BETWEEN 谓词
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BetweenPredicate {
    pub(crate) location: Location,
    pub(crate) value: Box<Expression>,
    pub(crate) min: Box<Expression>,
    pub(crate) max: Box<Expression>,
}

impl BetweenPredicate {
    pub fn new(value: Expression, min: Expression, max: Expression) -> Self {
        Self {
            location: Location::NONE,
            value: Box::new(value),
            min: Box::new(min),
            max: Box::new(max),
        }
    }

    pub fn value(&self) -> &Expression {
        &self.value
    }

    pub fn min(&self) -> &Expression {
        &self.min
    }

    pub fn max(&self) -> &Expression {
        &self.max
    }
}

/// IN 列表，至少包含一个值
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "InListExpressionSerde")]
pub struct InListExpression {
    pub(crate) location: Location,
    pub(crate) values: Vec<Expression>,
}

impl InListExpression {
    pub fn new(values: Vec<Expression>) -> AstResult<Self> {
        if values.is_empty() {
            return Err(AstError::illegal_argument("IN 列表不能为空"));
        }
        Ok(Self {
            location: Location::NONE,
            values,
        })
    }

    pub fn values(&self) -> &[Expression] {
        &self.values
    }
}

validated_serde!(InListExpression as InListExpressionSerde {
    values: Vec<Expression>,
} => |raw| InListExpression::new(raw.values));

/// IN 谓词
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InPredicate {
    pub(crate) location: Location,
    pub(crate) value: Box<Expression>,
    pub(crate) value_list: InListExpression,
}

impl InPredicate {
    pub fn new(value: Expression, value_list: InListExpression) -> Self {
        Self {
            location: Location::NONE,
            value: Box::new(value),
            value_list,
        }
    }

    pub fn value(&self) -> &Expression {
        &self.value
    }

    pub fn value_list(&self) -> &InListExpression {
        &self.value_list
    }
}

/// LIKE 谓词
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LikePredicate {
    pub(crate) location: Location,
    pub(crate) value: Box<Expression>,
    pub(crate) pattern: Box<Expression>,
}

impl LikePredicate {
    pub fn new(value: Expression, pattern: Expression) -> Self {
        Self {
            location: Location::NONE,
            value: Box::new(value),
            pattern: Box::new(pattern),
        }
    }

    pub fn value(&self) -> &Expression {
        &self.value
    }

    pub fn pattern(&self) -> &Expression {
        &self.pattern
    }
}

/// IS NULL 谓词
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IsNullPredicate {
    pub(crate) location: Location,
    pub(crate) value: Box<Expression>,
}

impl IsNullPredicate {
    pub fn new(value: Expression) -> Self {
        Self {
            location: Location::NONE,
            value: Box::new(value),
        }
    }

    pub fn value(&self) -> &Expression {
        &self.value
    }
}

/// IS NOT NULL 谓词
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IsNotNullPredicate {
    pub(crate) location: Location,
    pub(crate) value: Box<Expression>,
}

impl IsNotNullPredicate {
    pub fn new(value: Expression) -> Self {
        Self {
            location: Location::NONE,
            value: Box::new(value),
        }
    }

    pub fn value(&self) -> &Expression {
        &self.value
    }
}

/// NOT 表达式
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NotExpression {
    pub(crate) location: Location,
    pub(crate) value: Box<Expression>,
}

impl NotExpression {
    pub fn new(value: Expression) -> Self {
        Self {
            location: Location::NONE,
            value: Box::new(value),
        }
    }

    pub fn value(&self) -> &Expression {
        &self.value
    }
}

/// 函数调用表达式
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionCall {
    pub(crate) location: Location,
    pub(crate) name: QualifiedName,
    pub(crate) arguments: Vec<Expression>,
}

impl FunctionCall {
    pub fn new(name: QualifiedName, arguments: Vec<Expression>) -> Self {
        Self {
            location: Location::NONE,
            name,
            arguments,
        }
    }

    pub fn name(&self) -> &QualifiedName {
        &self.name
    }

    pub fn arguments(&self) -> &[Expression] {
        &self.arguments
    }
}

/// CAST 表达式
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cast {
    pub(crate) location: Location,
    pub(crate) expression: Box<Expression>,
    pub(crate) target_type: SqlType,
}

impl Cast {
    pub fn new(expression: Expression, target_type: SqlType) -> Self {
        Self {
            location: Location::NONE,
            expression: Box::new(expression),
            target_type,
        }
    }

    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    pub fn target_type(&self) -> &SqlType {
        &self.target_type
    }
}

/// 结构体字段访问，例如 `address->city`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "DereferenceExpressionSerde")]
pub struct DereferenceExpression {
    pub(crate) location: Location,
    pub(crate) base: Box<Expression>,
    pub(crate) field_name: String,
}

impl DereferenceExpression {
    pub fn new<S: Into<String>>(base: Expression, field_name: S) -> AstResult<Self> {
        let field_name = field_name.into();
        if field_name.is_empty() {
            return Err(AstError::illegal_argument("字段名不能为空"));
        }
        Ok(Self {
            location: Location::NONE,
            base: Box::new(base),
            field_name,
        })
    }

    pub fn base(&self) -> &Expression {
        &self.base
    }

    pub fn field_name(&self) -> &str {
        &self.field_name
    }
}

validated_serde!(DereferenceExpression as DereferenceExpressionSerde {
    base: Box<Expression>,
    field_name: String,
} => |raw| DereferenceExpression::new(*raw.base, raw.field_name));

/// 下标表达式，例如 `arr[0]`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptExpression {
    pub(crate) location: Location,
    pub(crate) base: Box<Expression>,
    pub(crate) index: Box<Expression>,
}

impl SubscriptExpression {
    pub fn new(base: Expression, index: Expression) -> Self {
        Self {
            location: Location::NONE,
            base: Box::new(base),
            index: Box::new(index),
        }
    }

    pub fn base(&self) -> &Expression {
        &self.base
    }

    pub fn index(&self) -> &Expression {
        &self.index
    }
}

/// WHEN ... THEN ... 子句
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WhenClause {
    pub(crate) location: Location,
    pub(crate) operand: Box<Expression>,
    pub(crate) result: Box<Expression>,
}

impl WhenClause {
    pub fn new(operand: Expression, result: Expression) -> Self {
        Self {
            location: Location::NONE,
            operand: Box::new(operand),
            result: Box::new(result),
        }
    }

    pub fn operand(&self) -> &Expression {
        &self.operand
    }

    pub fn result(&self) -> &Expression {
        &self.result
    }
}

/// 简单 CASE：`CASE x WHEN 1 THEN ... END`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SimpleCaseExpression {
    pub(crate) location: Location,
    pub(crate) operand: Box<Expression>,
    pub(crate) when_clauses: Vec<WhenClause>,
    pub(crate) default_value: Option<Box<Expression>>,
}

impl SimpleCaseExpression {
    pub fn new(
        operand: Expression,
        when_clauses: Vec<WhenClause>,
        default_value: Option<Expression>,
    ) -> Self {
        Self {
            location: Location::NONE,
            operand: Box::new(operand),
            when_clauses,
            default_value: default_value.map(Box::new),
        }
    }

    pub fn operand(&self) -> &Expression {
        &self.operand
    }

    pub fn when_clauses(&self) -> &[WhenClause] {
        &self.when_clauses
    }

    pub fn default_value(&self) -> Option<&Expression> {
        self.default_value.as_deref()
    }
}

/// 搜索 CASE：`CASE WHEN cond THEN ... END`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchedCaseExpression {
    pub(crate) location: Location,
    pub(crate) when_clauses: Vec<WhenClause>,
    pub(crate) default_value: Option<Box<Expression>>,
}

impl SearchedCaseExpression {
    pub fn new(when_clauses: Vec<WhenClause>, default_value: Option<Expression>) -> Self {
        Self {
            location: Location::NONE,
            when_clauses,
            default_value: default_value.map(Box::new),
        }
    }

    pub fn when_clauses(&self) -> &[WhenClause] {
        &self.when_clauses
    }

    pub fn default_value(&self) -> Option<&Expression> {
        self.default_value.as_deref()
    }
}

impl_located!(
    LiteralExpression,
    QualifiedNameReference,
    ArithmeticBinaryExpression,
    ArithmeticUnaryExpression,
    ComparisonExpression,
    LogicalBinaryExpression,
    BetweenPredicate,
    InListExpression,
    InPredicate,
    LikePredicate,
    IsNullPredicate,
    IsNotNullPredicate,
    NotExpression,
    FunctionCall,
    Cast,
    DereferenceExpression,
    SubscriptExpression,
    WhenClause,
    SimpleCaseExpression,
    SearchedCaseExpression,
);

macro_rules! impl_from_for_expression {
    ($($node:ident => $variant:ident),+ $(,)?) => {
        $(
            impl From<$node> for Expression {
                fn from(node: $node) -> Self {
                    Expression::$variant(node)
                }
            }
        )+
    };
}

impl_from_for_expression!(
    ArithmeticBinaryExpression => ArithmeticBinary,
    ArithmeticUnaryExpression => ArithmeticUnary,
    ComparisonExpression => Comparison,
    LogicalBinaryExpression => LogicalBinary,
    BetweenPredicate => Between,
    InPredicate => In,
    InListExpression => InList,
    LikePredicate => Like,
    IsNullPredicate => IsNull,
    IsNotNullPredicate => IsNotNull,
    NotExpression => Not,
    FunctionCall => FunctionCall,
    Cast => Cast,
    DereferenceExpression => Dereference,
    SubscriptExpression => Subscript,
    SimpleCaseExpression => SimpleCase,
    SearchedCaseExpression => SearchedCase,
    WhenClause => WhenClause,
    QualifiedNameReference => QualifiedNameReference,
    LiteralExpression => Literal,
);

fn join_expressions(expressions: &[Expression]) -> String {
    expressions
        .iter()
        .map(|expression| expression.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn write_case_tail(
    f: &mut fmt::Formatter<'_>,
    when_clauses: &[WhenClause],
    default_value: Option<&Expression>,
) -> fmt::Result {
    for clause in when_clauses {
        write!(f, " {}", clause)?;
    }
    if let Some(default_value) = default_value {
        write!(f, " ELSE {}", default_value)?;
    }
    write!(f, " END)")
}

impl fmt::Display for WhenClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WHEN {} THEN {}", self.operand, self.result)
    }
}

impl fmt::Display for InListExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", join_expressions(&self.values))
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::ArithmeticBinary(e) => {
                write!(f, "({} {} {})", e.left, e.operator, e.right)
            }
            Expression::ArithmeticUnary(e) => write!(f, "{}{}", e.sign, e.value),
            Expression::Comparison(e) => write!(f, "({} {} {})", e.left, e.operator, e.right),
            Expression::LogicalBinary(e) => {
                write!(f, "({} {} {})", e.left, e.operator, e.right)
            }
            Expression::Between(e) => {
                write!(f, "({} BETWEEN {} AND {})", e.value, e.min, e.max)
            }
            Expression::In(e) => write!(f, "({} IN {})", e.value, e.value_list),
            Expression::InList(e) => write!(f, "{}", e),
            Expression::Like(e) => write!(f, "({} LIKE {})", e.value, e.pattern),
            Expression::IsNull(e) => write!(f, "({} IS NULL)", e.value),
            Expression::IsNotNull(e) => write!(f, "({} IS NOT NULL)", e.value),
            Expression::Not(e) => write!(f, "(NOT {})", e.value),
            Expression::FunctionCall(e) => {
                write!(f, "{}({})", e.name, join_expressions(&e.arguments))
            }
            Expression::Cast(e) => write!(f, "CAST({} AS {})", e.expression, e.target_type),
            Expression::Dereference(e) => write!(f, "{}->{}", e.base, e.field_name),
            Expression::Subscript(e) => write!(f, "{}[{}]", e.base, e.index),
            Expression::SimpleCase(e) => {
                write!(f, "(CASE {}", e.operand)?;
                write_case_tail(f, &e.when_clauses, e.default_value())
            }
            Expression::SearchedCase(e) => {
                write!(f, "(CASE")?;
                write_case_tail(f, &e.when_clauses, e.default_value())
            }
            Expression::WhenClause(e) => write!(f, "{}", e),
            Expression::QualifiedNameReference(e) => write!(f, "{}", e.name),
            Expression::Literal(e) => write!(f, "{}", e.value),
        }
    }
}
