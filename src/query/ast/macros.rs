//! AST 内部宏

/// 为节点结构体生成 `location()` / `with_location()`
///
/// 结构体必须有 `location: Location` 字段。
macro_rules! impl_located {
    ($($node:ty),+ $(,)?) => {
        $(
            impl $node {
                /// 源码位置
                pub fn location(&self) -> Option<$crate::core::NodeLocation> {
                    self.location.get()
                }

                /// 返回附带源码位置的新节点
                pub fn with_location<L: Into<$crate::core::Location>>(mut self, location: L) -> Self {
                    self.location = location.into();
                    self
                }
            }
        )+
    };
}

pub(crate) use impl_located;

/// 为带校验构造函数的节点生成反序列化辅助结构
///
/// 先反序列化为同形的辅助结构，再经构造函数校验，最后恢复源码位置。
/// 节点本身需标注 `#[serde(try_from = "...")]`。
macro_rules! validated_serde {
    ($node:ident as $serde:ident { $($field:ident: $ty:ty),+ $(,)? } => |$raw:ident| $build:expr) => {
        #[derive(serde::Deserialize)]
        struct $serde {
            #[serde(default)]
            location: $crate::core::Location,
            $($field: $ty,)+
        }

        impl TryFrom<$serde> for $node {
            type Error = $crate::core::AstError;

            fn try_from($raw: $serde) -> $crate::core::AstResult<Self> {
                let location = $raw.location;
                let node: $node = $build?;
                Ok(node.with_location(location))
            }
        }
    };
}

pub(crate) use validated_serde;
