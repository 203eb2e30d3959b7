//! 表元素（列声明）

use super::macros::{impl_located, validated_serde};
use super::types::SqlType;
use crate::core::{AstError, AstResult, Location};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 列所在的命名空间
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Namespace {
    Value,
    Key,
    Header,
}

impl Namespace {
    pub fn is_key(&self) -> bool {
        matches!(self, Namespace::Key)
    }
}

/// 列声明：命名空间 + 名称 + 类型
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "TableElementSerde")]
pub struct TableElement {
    pub(crate) location: Location,
    pub(crate) namespace: Namespace,
    pub(crate) name: String,
    pub(crate) element_type: SqlType,
}

impl TableElement {
    pub fn new<S: Into<String>>(
        namespace: Namespace,
        name: S,
        element_type: SqlType,
    ) -> AstResult<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(AstError::illegal_argument("列名不能为空"));
        }
        Ok(Self {
            location: Location::NONE,
            namespace,
            name,
            element_type,
        })
    }

    /// VALUE 命名空间的列
    pub fn value<S: Into<String>>(name: S, element_type: SqlType) -> AstResult<Self> {
        Self::new(Namespace::Value, name, element_type)
    }

    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn element_type(&self) -> &SqlType {
        &self.element_type
    }
}

validated_serde!(TableElement as TableElementSerde {
    namespace: Namespace,
    name: String,
    element_type: SqlType,
} => |raw| TableElement::new(raw.namespace, raw.name, raw.element_type));

impl_located!(TableElement);

impl fmt::Display for TableElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.element_type)?;
        match self.namespace {
            Namespace::Value => Ok(()),
            Namespace::Key => write!(f, " KEY"),
            Namespace::Header => write!(f, " HEADER"),
        }
    }
}

/// 按声明顺序排列的列声明
///
/// 名称唯一性由语义分析检查，这里不做约束。
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableElements {
    elements: Vec<TableElement>,
}

impl TableElements {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn of<I: IntoIterator<Item = TableElement>>(elements: I) -> Self {
        Self {
            elements: elements.into_iter().collect(),
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TableElement> {
        self.elements.iter()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// 按名称查找第一个匹配的列
    pub fn find(&self, name: &str) -> Option<&TableElement> {
        self.elements.iter().find(|element| element.name == name)
    }

    pub fn as_slice(&self) -> &[TableElement] {
        &self.elements
    }
}

impl FromIterator<TableElement> for TableElements {
    fn from_iter<T: IntoIterator<Item = TableElement>>(iter: T) -> Self {
        Self::of(iter)
    }
}

impl IntoIterator for TableElements {
    type Item = TableElement;
    type IntoIter = std::vec::IntoIter<TableElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.into_iter()
    }
}

impl<'a> IntoIterator for &'a TableElements {
    type Item = &'a TableElement;
    type IntoIter = std::slice::Iter<'a, TableElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

impl fmt::Display for TableElements {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let elements = self
            .elements
            .iter()
            .map(|element| element.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "({})", elements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_element_display() {
        let key = TableElement::new(Namespace::Key, "ID", SqlType::String).expect("valid");
        assert_eq!(key.to_string(), "ID STRING KEY");

        let header = TableElement::new(Namespace::Header, "col", SqlType::String).expect("valid");
        assert_eq!(header.to_string(), "col STRING HEADER");

        let value = TableElement::value("amount", SqlType::Double).expect("valid");
        assert_eq!(value.to_string(), "amount DOUBLE");
    }

    #[test]
    fn test_empty_name_rejected() {
        assert!(TableElement::new(Namespace::Value, "", SqlType::Integer).is_err());
    }

    #[test]
    fn test_elements_keep_declaration_order() {
        let elements = TableElements::of(vec![
            TableElement::value("b", SqlType::Integer).expect("valid"),
            TableElement::value("a", SqlType::Integer).expect("valid"),
        ]);
        let names: Vec<&str> = elements.iter().map(TableElement::name).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(elements.to_string(), "(b INT, a INT)");
        assert!(elements.find("a").is_some());
        assert!(elements.find("c").is_none());
    }
}
