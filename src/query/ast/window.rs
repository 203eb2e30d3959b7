//! 窗口 AST 定义

use super::macros::impl_located;
use super::types::TimeSpan;
use crate::core::Location;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 流式窗口定义
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KsqlWindowExpression {
    pub(crate) location: Location,
    pub(crate) kind: WindowKind,
}

/// 窗口类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WindowKind {
    /// 固定大小、互不重叠
    Tumbling { size: TimeSpan },
    /// 固定大小、按 `advance_by` 滑动
    Hopping { size: TimeSpan, advance_by: TimeSpan },
    /// 按不活跃间隔切分
    Session { gap: TimeSpan },
}

impl KsqlWindowExpression {
    pub fn new(kind: WindowKind) -> Self {
        Self {
            location: Location::NONE,
            kind,
        }
    }

    pub fn tumbling(size: TimeSpan) -> Self {
        Self::new(WindowKind::Tumbling { size })
    }

    pub fn hopping(size: TimeSpan, advance_by: TimeSpan) -> Self {
        Self::new(WindowKind::Hopping { size, advance_by })
    }

    pub fn session(gap: TimeSpan) -> Self {
        Self::new(WindowKind::Session { gap })
    }

    pub fn kind(&self) -> &WindowKind {
        &self.kind
    }
}

impl fmt::Display for KsqlWindowExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            WindowKind::Tumbling { size } => write!(f, "TUMBLING (SIZE {})", size),
            WindowKind::Hopping { size, advance_by } => {
                write!(f, "HOPPING (SIZE {}, ADVANCE BY {})", size, advance_by)
            }
            WindowKind::Session { gap } => write!(f, "SESSION ({})", gap),
        }
    }
}

/// WINDOW 子句，可选命名
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowExpression {
    pub(crate) location: Location,
    pub(crate) window_name: Option<String>,
    pub(crate) window: KsqlWindowExpression,
}

impl WindowExpression {
    pub fn new(window_name: Option<String>, window: KsqlWindowExpression) -> Self {
        Self {
            location: Location::NONE,
            window_name,
            window,
        }
    }

    pub fn window_name(&self) -> Option<&str> {
        self.window_name.as_deref()
    }

    pub fn window(&self) -> &KsqlWindowExpression {
        &self.window
    }
}

impl fmt::Display for WindowExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.window_name {
            Some(ref name) => write!(f, "WINDOW {} {}", name, self.window),
            None => write!(f, "WINDOW {}", self.window),
        }
    }
}

impl_located!(KsqlWindowExpression, WindowExpression);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::ast::types::TimeUnit;

    #[test]
    fn test_window_display() {
        let hopping = KsqlWindowExpression::hopping(
            TimeSpan::new(1, TimeUnit::Minutes),
            TimeSpan::new(10, TimeUnit::Seconds),
        );
        assert_eq!(
            hopping.to_string(),
            "HOPPING (SIZE 1 MINUTES, ADVANCE BY 10 SECONDS)"
        );

        let window = WindowExpression::new(
            None,
            KsqlWindowExpression::tumbling(TimeSpan::new(30, TimeUnit::Seconds)),
        );
        assert_eq!(window.to_string(), "WINDOW TUMBLING (SIZE 30 SECONDS)");

        let named = WindowExpression::new(
            Some("w".to_string()),
            KsqlWindowExpression::session(TimeSpan::new(5, TimeUnit::Minutes)),
        );
        assert_eq!(named.to_string(), "WINDOW w SESSION (5 MINUTES)");
    }
}
