//! 属性映射
//!
//! `WITH (...)` 子句和连接器配置使用的不可变、保序的 `名称 -> 字面量` 映射。

use super::literal::Literal;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// 不可变属性映射
///
/// 保留声明顺序；相等性与顺序无关，哈希按键排序后计算以保持一致。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyMap {
    entries: IndexMap<String, Literal>,
}

impl PropertyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// 由键值对构造，重复键以最后一次出现的值为准，位置保持首次出现处
    pub fn of<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Literal>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Literal> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Literal)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl Hash for PropertyMap {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // 通过排序后的键值对哈希映射
        let mut pairs: Vec<_> = self.entries.iter().collect();
        pairs.sort_by_key(|&(key, _)| key);
        pairs.len().hash(state);
        for (key, value) in pairs {
            key.hash(state);
            value.hash(state);
        }
    }
}

impl<K: Into<String>, V: Into<Literal>> FromIterator<(K, V)> for PropertyMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::of(iter)
    }
}

/// 属性名不是普通标识符时加双引号
pub(crate) fn format_property_key(key: &str) -> String {
    let is_identifier = !key.is_empty()
        && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !key.starts_with(|c: char| c.is_ascii_digit());
    if is_identifier {
        key.to_string()
    } else {
        format!("\"{}\"", key.replace('"', "\"\""))
    }
}

impl fmt::Display for PropertyMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pairs = self
            .entries
            .iter()
            .map(|(key, value)| format!("{}={}", format_property_key(key), value))
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "({})", pairs)
    }
}
