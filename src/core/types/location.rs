//! 源码位置类型定义
//!
//! 本模块定义 AST 节点携带的源码位置。位置只用于格式化和诊断，
//! 不参与节点的相等性比较和哈希计算。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// 源码位置
///
/// 表示源码中的一个点位置，包含行号和列号。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeLocation {
    /// 行号（从 0 开始）
    pub line: usize,
    /// 列号（从 0 开始）
    pub column: usize,
}

impl NodeLocation {
    /// 创建新位置
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for NodeLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// 节点的可选源码位置
///
/// 任意两个 `Location` 都视为相等，哈希时不写入任何内容，
/// 因此包含它的节点可以直接派生 `PartialEq`/`Hash` 而不受位置影响。
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Location(Option<NodeLocation>);

impl Location {
    /// 无位置信息（用于重写器内部生成的节点）
    pub const NONE: Location = Location(None);

    pub fn new(location: Option<NodeLocation>) -> Self {
        Self(location)
    }

    pub fn at(line: usize, column: usize) -> Self {
        Self(Some(NodeLocation::new(line, column)))
    }

    pub fn get(&self) -> Option<NodeLocation> {
        self.0
    }

    pub fn is_present(&self) -> bool {
        self.0.is_some()
    }
}

impl From<NodeLocation> for Location {
    fn from(location: NodeLocation) -> Self {
        Self(Some(location))
    }
}

impl From<Option<NodeLocation>> for Location {
    fn from(location: Option<NodeLocation>) -> Self {
        Self(location)
    }
}

impl PartialEq for Location {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for Location {}

impl Hash for Location {
    fn hash<H: Hasher>(&self, _state: &mut H) {}
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(location) => write!(f, "{}", location),
            None => write!(f, "unknown location"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of<T: Hash>(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_location_equality_ignores_position() {
        assert_eq!(Location::at(1, 0), Location::at(7, 3));
        assert_eq!(Location::at(1, 0), Location::NONE);
        assert_eq!(hash_of(&Location::at(1, 0)), hash_of(&Location::NONE));
    }

    #[test]
    fn test_location_accessors() {
        let location = Location::at(3, 14);
        assert!(location.is_present());
        assert_eq!(location.get(), Some(NodeLocation::new(3, 14)));
        assert!(!Location::NONE.is_present());
        assert_eq!(location.to_string(), "line 3, column 14");
    }

    #[test]
    fn test_origin_is_a_real_location() {
        // 行列从 0 开始计数
        let origin = Location::at(0, 0);
        assert!(origin.is_present());
        assert_eq!(origin.get(), Some(NodeLocation::new(0, 0)));
        assert_eq!(origin.to_string(), "line 0, column 0");
    }
}
