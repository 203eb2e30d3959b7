//! 日志初始化
//!
//! 库代码只通过 `log` 门面输出：`debug` 记录一次重写的起止，`trace` 记录规则命中，
//! `warn` 记录规则覆盖和深度超限。宿主程序没有自己的 logger 时，
//! 可以用本模块按 `LogConfig` 启动 flexi_logger。

use crate::config::LogConfig;
use flexi_logger::{
    Cleanup, Criterion, FileSpec, FlexiLoggerError, Logger, LoggerHandle, Naming, WriteMode,
};
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

/// 重写器所在的模块路径
const REWRITER_MODULE: &str = "streamsql::query::visitor";

static LOGGER_HANDLE: Mutex<Option<LoggerHandle>> = Mutex::new(None);

/// 日志初始化错误
#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("日志系统已经初始化")]
    AlreadyInitialized,

    #[error("启动日志系统失败: {0}")]
    Logger(#[from] FlexiLoggerError),
}

/// flexi_logger 的日志规格
///
/// `trace_rewrites` 打开时只把重写器模块提升到 trace，其余模块仍按 `level` 输出。
pub fn log_spec(config: &LogConfig) -> String {
    if config.trace_rewrites {
        format!("{}, {}=trace", config.level, REWRITER_MODULE)
    } else {
        config.level.clone()
    }
}

/// 启动日志系统
///
/// `dir` 为空时输出到 stderr；否则写入 `dir` 下以 `file` 为前缀的文件，
/// 按大小轮转、异步写入。每个进程只能初始化一次。
///
/// # Examples
/// ```no_run
/// use streamsql::config::LogConfig;
/// use streamsql::utils::logging;
///
/// let config = LogConfig {
///     dir: String::new(),
///     trace_rewrites: true,
///     ..LogConfig::default()
/// };
/// logging::init(&config).expect("日志初始化失败");
/// ```
pub fn init(config: &LogConfig) -> Result<(), LoggingError> {
    let mut guard = LOGGER_HANDLE.lock().unwrap_or_else(PoisonError::into_inner);
    if guard.is_some() {
        return Err(LoggingError::AlreadyInitialized);
    }

    let logger = Logger::try_with_str(log_spec(config))?;
    let logger = if config.dir.is_empty() {
        logger.log_to_stderr()
    } else {
        logger
            .log_to_file(
                FileSpec::default()
                    .basename(&config.file)
                    .directory(&config.dir),
            )
            .rotate(
                Criterion::Size(config.max_file_size),
                Naming::Numbers,
                Cleanup::KeepLogFiles(config.max_files),
            )
            .write_mode(WriteMode::Async)
            .append()
    };
    *guard = Some(logger.start()?);

    log::info!("日志系统初始化完成, 规格: {}", log_spec(config));
    Ok(())
}

/// 刷新并释放日志句柄，阻塞到异步写线程处理完已提交的日志
pub fn shutdown() {
    let handle = LOGGER_HANDLE
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .take();
    if let Some(handle) = handle {
        handle.flush();
    }
}

pub fn is_initialized() -> bool {
    LOGGER_HANDLE
        .lock()
        .map(|guard| guard.is_some())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::ast::{AstNode, NodeKind, QualifiedName, Relation, Table};
    use crate::query::visitor::{AstRewriter, RewriteRules, RuleBasedRewriter};
    use serial_test::serial;

    #[test]
    fn test_log_spec() {
        let mut config = LogConfig::default();
        assert_eq!(log_spec(&config), "info");

        config.level = "warn".to_string();
        config.trace_rewrites = true;
        assert_eq!(log_spec(&config), "warn, streamsql::query::visitor=trace");
    }

    // 全局 logger 每个进程只能设置一次，初始化只在这一个测试中进行
    #[test]
    #[serial]
    fn test_init_once_then_shutdown() {
        let dir = tempfile::tempdir().expect("Failed to create temporary dir");
        let config = LogConfig {
            dir: dir.path().to_string_lossy().into_owned(),
            trace_rewrites: true,
            ..LogConfig::default()
        };

        let result = init(&config);
        assert!(result.is_ok(), "日志初始化失败: {:?}", result.err());
        assert!(is_initialized());
        assert!(matches!(init(&config), Err(LoggingError::AlreadyInitialized)));

        // 规则命中经 trace 输出，不影响重写结果
        let rules = RewriteRules::<()>::new().on_enter(NodeKind::Table, |_, _| {
            let name = QualifiedName::simple("renamed").ok()?;
            Some(Relation::from(Table::new(name)).into())
        });
        let root: AstNode = Relation::from(Table::new(
            QualifiedName::simple("orders").expect("valid name"),
        ))
        .into();
        let rewritten = RuleBasedRewriter::new(rules)
            .rewrite(&root, &())
            .expect("rewrite succeeds");
        assert_eq!(rewritten.to_string(), "renamed");

        shutdown();
        assert!(!is_initialized());
    }

    #[test]
    #[serial]
    fn test_shutdown_without_init_is_noop() {
        shutdown();
        assert!(!is_initialized());
    }
}
