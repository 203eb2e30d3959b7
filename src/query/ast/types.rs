//! AST 基础类型定义
//!
//! 本模块定义 AST 共用的非节点类型：限定名、SQL 数据类型、时间单位以及各种操作符。
//! 这些值在重写时原样复制，不参与递归。

use crate::core::{AstError, AstResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 限定名，例如 `db.orders` 或 `o.id`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "QualifiedNameSerde")]
pub struct QualifiedName {
    parts: Vec<String>,
}

/// 反序列化辅助结构，经 `QualifiedName::of` 校验
#[derive(Deserialize)]
struct QualifiedNameSerde {
    parts: Vec<String>,
}

impl TryFrom<QualifiedNameSerde> for QualifiedName {
    type Error = AstError;

    fn try_from(raw: QualifiedNameSerde) -> AstResult<Self> {
        Self::of(raw.parts)
    }
}

impl QualifiedName {
    /// 由若干部分构造限定名，至少一部分且每部分非空
    pub fn of<I, S>(parts: I) -> AstResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let parts: Vec<String> = parts.into_iter().map(Into::into).collect();
        if parts.is_empty() {
            return Err(AstError::illegal_argument("qualified name 不能为空"));
        }
        if parts.iter().any(|part| part.is_empty()) {
            return Err(AstError::illegal_argument(format!(
                "qualified name 含有空的部分: {:?}",
                parts
            )));
        }
        Ok(Self { parts })
    }

    /// 单段名称
    pub fn simple<S: Into<String>>(name: S) -> AstResult<Self> {
        Self::of([name.into()])
    }

    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    /// 最后一段名称
    pub fn suffix(&self) -> &str {
        // 构造时已保证非空
        self.parts.last().map(String::as_str).unwrap_or_default()
    }

    /// 去掉最后一段后的前缀
    pub fn prefix(&self) -> Option<QualifiedName> {
        if self.parts.len() <= 1 {
            return None;
        }
        Some(Self {
            parts: self.parts[..self.parts.len() - 1].to_vec(),
        })
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.parts.join("."))
    }
}

/// SQL 数据类型
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "SqlTypeSerde")]
pub enum SqlType {
    Boolean,
    Integer,
    Bigint,
    Double,
    String,
    Decimal { precision: u32, scale: u32 },
    Array(Box<SqlType>),
    /// 键固定为 STRING
    Map(Box<SqlType>),
    Struct(Vec<StructField>),
}

/// 反序列化辅助结构：与 `SqlType` 同形，DECIMAL 参数经 `SqlType::decimal` 校验
#[derive(Deserialize)]
#[serde(rename = "SqlType")]
enum SqlTypeSerde {
    Boolean,
    Integer,
    Bigint,
    Double,
    String,
    Decimal { precision: u32, scale: u32 },
    Array(Box<SqlType>),
    Map(Box<SqlType>),
    Struct(Vec<StructField>),
}

impl TryFrom<SqlTypeSerde> for SqlType {
    type Error = AstError;

    fn try_from(raw: SqlTypeSerde) -> AstResult<Self> {
        Ok(match raw {
            SqlTypeSerde::Boolean => SqlType::Boolean,
            SqlTypeSerde::Integer => SqlType::Integer,
            SqlTypeSerde::Bigint => SqlType::Bigint,
            SqlTypeSerde::Double => SqlType::Double,
            SqlTypeSerde::String => SqlType::String,
            SqlTypeSerde::Decimal { precision, scale } => SqlType::decimal(precision, scale)?,
            SqlTypeSerde::Array(element) => SqlType::Array(element),
            SqlTypeSerde::Map(value) => SqlType::Map(value),
            SqlTypeSerde::Struct(fields) => SqlType::Struct(fields),
        })
    }
}

/// STRUCT 类型的字段
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StructField {
    pub name: String,
    pub field_type: SqlType,
}

impl SqlType {
    /// DECIMAL 类型，要求 `1 <= precision` 且 `scale <= precision`
    pub fn decimal(precision: u32, scale: u32) -> AstResult<Self> {
        if precision == 0 {
            return Err(AstError::illegal_argument(
                "DECIMAL precision 必须大于 0",
            ));
        }
        if scale > precision {
            return Err(AstError::illegal_argument(format!(
                "DECIMAL scale ({}) 不能大于 precision ({})",
                scale, precision
            )));
        }
        Ok(SqlType::Decimal { precision, scale })
    }

    pub fn array(element: SqlType) -> Self {
        SqlType::Array(Box::new(element))
    }

    pub fn map(value: SqlType) -> Self {
        SqlType::Map(Box::new(value))
    }

    pub fn struct_of<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = (S, SqlType)>,
        S: Into<String>,
    {
        SqlType::Struct(
            fields
                .into_iter()
                .map(|(name, field_type)| StructField {
                    name: name.into(),
                    field_type,
                })
                .collect(),
        )
    }

    /// 是否为基础（非嵌套）类型
    pub fn is_primitive(&self) -> bool {
        !matches!(
            self,
            SqlType::Array(_) | SqlType::Map(_) | SqlType::Struct(_)
        )
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlType::Boolean => write!(f, "BOOLEAN"),
            SqlType::Integer => write!(f, "INT"),
            SqlType::Bigint => write!(f, "BIGINT"),
            SqlType::Double => write!(f, "DOUBLE"),
            SqlType::String => write!(f, "STRING"),
            SqlType::Decimal { precision, scale } => {
                write!(f, "DECIMAL({}, {})", precision, scale)
            }
            SqlType::Array(element) => write!(f, "ARRAY<{}>", element),
            SqlType::Map(value) => write!(f, "MAP<STRING, {}>", value),
            SqlType::Struct(fields) => {
                let fields_str = fields
                    .iter()
                    .map(|field| format!("{} {}", field.name, field.field_type))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "STRUCT<{}>", fields_str)
            }
        }
    }
}

/// 时间单位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeUnit {
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    /// 将 `size` 个当前单位换算为毫秒，溢出时饱和
    pub fn to_millis(&self, size: u64) -> u64 {
        let factor: u64 = match self {
            TimeUnit::Milliseconds => 1,
            TimeUnit::Seconds => 1_000,
            TimeUnit::Minutes => 60_000,
            TimeUnit::Hours => 3_600_000,
            TimeUnit::Days => 86_400_000,
        };
        size.saturating_mul(factor)
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeUnit::Milliseconds => write!(f, "MILLISECONDS"),
            TimeUnit::Seconds => write!(f, "SECONDS"),
            TimeUnit::Minutes => write!(f, "MINUTES"),
            TimeUnit::Hours => write!(f, "HOURS"),
            TimeUnit::Days => write!(f, "DAYS"),
        }
    }
}

/// 带单位的时长，例如 `10 SECONDS`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeSpan {
    pub size: u64,
    pub unit: TimeUnit,
}

impl TimeSpan {
    pub fn new(size: u64, unit: TimeUnit) -> Self {
        Self { size, unit }
    }

    pub fn to_millis(&self) -> u64 {
        self.unit.to_millis(self.size)
    }
}

impl fmt::Display for TimeSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.size, self.unit)
    }
}

/// 算术二元操作符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArithmeticOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulus,
}

impl fmt::Display for ArithmeticOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArithmeticOperator::Add => write!(f, "+"),
            ArithmeticOperator::Subtract => write!(f, "-"),
            ArithmeticOperator::Multiply => write!(f, "*"),
            ArithmeticOperator::Divide => write!(f, "/"),
            ArithmeticOperator::Modulus => write!(f, "%"),
        }
    }
}

/// 一元符号
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sign {
    Plus,
    Minus,
}

impl fmt::Display for Sign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sign::Plus => write!(f, "+"),
            Sign::Minus => write!(f, "-"),
        }
    }
}

/// 比较操作符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComparisonOperator {
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    IsDistinctFrom,
}

impl ComparisonOperator {
    /// 交换左右操作数后等价的操作符
    pub fn flip(&self) -> Self {
        match self {
            ComparisonOperator::LessThan => ComparisonOperator::GreaterThan,
            ComparisonOperator::LessThanOrEqual => ComparisonOperator::GreaterThanOrEqual,
            ComparisonOperator::GreaterThan => ComparisonOperator::LessThan,
            ComparisonOperator::GreaterThanOrEqual => ComparisonOperator::LessThanOrEqual,
            other => *other,
        }
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComparisonOperator::Equal => write!(f, "="),
            ComparisonOperator::NotEqual => write!(f, "<>"),
            ComparisonOperator::LessThan => write!(f, "<"),
            ComparisonOperator::LessThanOrEqual => write!(f, "<="),
            ComparisonOperator::GreaterThan => write!(f, ">"),
            ComparisonOperator::GreaterThanOrEqual => write!(f, ">="),
            ComparisonOperator::IsDistinctFrom => write!(f, "IS DISTINCT FROM"),
        }
    }
}

/// 逻辑二元操作符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicalOperator {
    And,
    Or,
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalOperator::And => write!(f, "AND"),
            LogicalOperator::Or => write!(f, "OR"),
        }
    }
}

/// 连接类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JoinType {
    Inner,
    Left,
    Outer,
}

impl fmt::Display for JoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinType::Inner => write!(f, "INNER"),
            JoinType::Left => write!(f, "LEFT"),
            JoinType::Outer => write!(f, "FULL OUTER"),
        }
    }
}
