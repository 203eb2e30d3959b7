//! 核心类型模块

pub mod location;

pub use location::{Location, NodeLocation};
