use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// 配置读写错误
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("读写配置文件失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("解析配置失败: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("序列化配置失败: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("配置无效: {0}")]
    Invalid(String),
}

#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub log: LogConfig,
    pub rewrite: RewriteConfig,
}

/// 日志配置
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    /// 为空时输出到 stderr
    pub dir: String,
    pub file: String,
    pub max_file_size: u64,
    pub max_files: usize,
    /// 重写器模块单独使用 trace 级别
    pub trace_rewrites: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: "logs".to_string(),
            file: "streamsql".to_string(),
            max_file_size: 100 * 1024 * 1024, // 100MB
            max_files: 5,
            trace_rewrites: false,
        }
    }
}

/// 重写器配置
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct RewriteConfig {
    /// 规则重写器允许的最大递归深度
    pub max_depth: usize,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self { max_depth: 256 }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rewrite.max_depth == 0 {
            return Err(ConfigError::Invalid("rewrite.max_depth 必须大于 0".to_string()));
        }
        if self.log.file.is_empty() {
            return Err(ConfigError::Invalid("log.file 不能为空".to_string()));
        }
        Ok(())
    }
}
