//! 字面量值
//!
//! `Literal` 是终结值：既作为 `Expression::Literal` 的内容，也作为
//! `WITH (...)` 属性和连接器配置的取值。

use crate::core::{AstError, AstResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// 字面量
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "LiteralSerde")]
pub enum Literal {
    Null,
    Boolean(bool),
    Integer(i32),
    Long(i64),
    Double(f64),
    /// 保留原始文本，避免精度损失
    Decimal(String),
    String(String),
}

/// 反序列化辅助结构，DECIMAL 文本经 `Literal::decimal` 校验
#[derive(Deserialize)]
#[serde(rename = "Literal")]
enum LiteralSerde {
    Null,
    Boolean(bool),
    Integer(i32),
    Long(i64),
    Double(f64),
    Decimal(String),
    String(String),
}

impl TryFrom<LiteralSerde> for Literal {
    type Error = AstError;

    fn try_from(raw: LiteralSerde) -> AstResult<Self> {
        Ok(match raw {
            LiteralSerde::Null => Literal::Null,
            LiteralSerde::Boolean(value) => Literal::Boolean(value),
            LiteralSerde::Integer(value) => Literal::Integer(value),
            LiteralSerde::Long(value) => Literal::Long(value),
            LiteralSerde::Double(value) => Literal::Double(value),
            LiteralSerde::Decimal(text) => Literal::decimal(text)?,
            LiteralSerde::String(value) => Literal::String(value),
        })
    }
}

impl Literal {
    pub fn string<S: Into<String>>(value: S) -> Self {
        Literal::String(value.into())
    }

    /// DECIMAL 字面量，文本必须形如 `-12.340`
    pub fn decimal<S: Into<String>>(text: S) -> AstResult<Self> {
        let text = text.into();
        if !is_decimal_text(&text) {
            return Err(AstError::illegal_argument(format!(
                "非法的 DECIMAL 字面量: '{}'",
                text
            )));
        }
        Ok(Literal::Decimal(text))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Literal::Null)
    }

    /// 字符串字面量的内容
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Literal::String(value) => Some(value),
            _ => None,
        }
    }

    /// 整数类字面量的值
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Literal::Integer(value) => Some(i64::from(*value)),
            Literal::Long(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Literal::Boolean(value) => Some(*value),
            _ => None,
        }
    }
}

fn is_decimal_text(text: &str) -> bool {
    let digits = text.strip_prefix(['-', '+']).unwrap_or(text);
    let mut parts = digits.splitn(2, '.');
    let integral = parts.next().unwrap_or_default();
    let fractional = parts.next();

    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    match fractional {
        Some(fractional) => {
            (!integral.is_empty() || !fractional.is_empty())
                && all_digits(integral)
                && all_digits(fractional)
        }
        None => !integral.is_empty() && all_digits(integral),
    }
}

// 手动实现PartialEq以正确处理f64比较
impl PartialEq for Literal {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Literal::Null, Literal::Null) => true,
            (Literal::Boolean(a), Literal::Boolean(b)) => a == b,
            (Literal::Integer(a), Literal::Integer(b)) => a == b,
            (Literal::Long(a), Literal::Long(b)) => a == b,
            (Literal::Double(a), Literal::Double(b)) => (a == b) || (a.is_nan() && b.is_nan()),
            (Literal::Decimal(a), Literal::Decimal(b)) => a == b,
            (Literal::String(a), Literal::String(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Literal {}

impl Hash for Literal {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Literal::Null => 0u8.hash(state),
            Literal::Boolean(b) => {
                1u8.hash(state);
                b.hash(state);
            }
            Literal::Integer(i) => {
                2u8.hash(state);
                i.hash(state);
            }
            Literal::Long(l) => {
                3u8.hash(state);
                l.hash(state);
            }
            Literal::Double(d) => {
                4u8.hash(state);
                if d.is_nan() {
                    // 所有NaN哈希到相同的值
                    f64::NAN.to_bits().hash(state);
                } else if *d == 0.0 {
                    // +0.0 和 -0.0 相等，哈希也必须相同
                    0.0_f64.to_bits().hash(state);
                } else {
                    d.to_bits().hash(state);
                }
            }
            Literal::Decimal(s) => {
                5u8.hash(state);
                s.hash(state);
            }
            Literal::String(s) => {
                6u8.hash(state);
                s.hash(state);
            }
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Null => write!(f, "null"),
            Literal::Boolean(value) => write!(f, "{}", value),
            Literal::Integer(value) => write!(f, "{}", value),
            Literal::Long(value) => write!(f, "{}", value),
            Literal::Double(value) => {
                if value.is_finite() && value.fract() == 0.0 {
                    write!(f, "{:.1}", value)
                } else {
                    write!(f, "{}", value)
                }
            }
            Literal::Decimal(value) => write!(f, "{}", value),
            Literal::String(value) => write!(f, "'{}'", value.replace('\'', "''")),
        }
    }
}

impl From<bool> for Literal {
    fn from(value: bool) -> Self {
        Literal::Boolean(value)
    }
}

impl From<i32> for Literal {
    fn from(value: i32) -> Self {
        Literal::Integer(value)
    }
}

impl From<i64> for Literal {
    fn from(value: i64) -> Self {
        Literal::Long(value)
    }
}

impl From<f64> for Literal {
    fn from(value: f64) -> Self {
        Literal::Double(value)
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Literal::String(value.to_string())
    }
}

impl From<String> for Literal {
    fn from(value: String) -> Self {
        Literal::String(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_double_equality_and_hash() {
        let mut set = HashSet::new();
        set.insert(Literal::Double(0.0));
        set.insert(Literal::Double(-0.0));
        set.insert(Literal::Double(f64::NAN));
        set.insert(Literal::Double(f64::NAN));
        assert_eq!(set.len(), 2);
        assert_ne!(Literal::Double(1.0), Literal::Integer(1));
    }

    #[test]
    fn test_decimal_validation() {
        assert!(Literal::decimal("12.50").is_ok());
        assert!(Literal::decimal("-0.5").is_ok());
        assert!(Literal::decimal(".5").is_ok());
        assert!(Literal::decimal("7").is_ok());
        assert!(Literal::decimal("").is_err());
        assert!(Literal::decimal(".").is_err());
        assert!(Literal::decimal("1.2.3").is_err());
        assert!(Literal::decimal("abc").is_err());
    }

    #[test]
    fn test_deserialize_checks_decimal_text() {
        assert!(serde_json::from_str::<Literal>(r#"{"Decimal":"1.2.3"}"#).is_err());
        assert_eq!(
            serde_json::from_str::<Literal>(r#"{"Decimal":"-12.50"}"#).expect("valid decimal"),
            Literal::Decimal("-12.50".to_string())
        );
        assert_eq!(
            serde_json::from_str::<Literal>(r#""Null""#).expect("null literal"),
            Literal::Null
        );
    }

    #[test]
    fn test_literal_display() {
        assert_eq!(Literal::Null.to_string(), "null");
        assert_eq!(Literal::from("it's").to_string(), "'it''s'");
        assert_eq!(Literal::Double(3.0).to_string(), "3.0");
        assert_eq!(Literal::Double(2.5).to_string(), "2.5");
        assert_eq!(Literal::Long(42).to_string(), "42");
        assert_eq!(Literal::from(true).to_string(), "true");
    }

    #[test]
    fn test_accessors() {
        assert_eq!(Literal::from("json").as_str(), Some("json"));
        assert_eq!(Literal::Integer(3).as_i64(), Some(3));
        assert_eq!(Literal::Boolean(false).as_bool(), Some(false));
        assert!(Literal::Null.is_null());
        assert_eq!(Literal::Null.as_str(), None);
    }
}
