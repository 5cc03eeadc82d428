//! # 统一错误处理模块
//!
//! 定义 utf8ify 的所有错误类型，使用 `thiserror` 派生。
//!
//! 只有"启动类"错误（根目录不存在、空文件列表、参数非法）会通过 `?` 向上传播；
//! 单个文件的读/转/写失败由批量执行器收集为 `FileError`，不会中断整批任务。
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 包装 `transcode::TranscodeError`

use crate::transcode::TranscodeError;
use thiserror::Error;

/// utf8ify 统一错误类型
#[derive(Error, Debug)]
pub enum Utf8ifyError {
    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Destination already exists: {path} (use --overwrite)")]
    DestinationExists { path: String },

    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: String },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Failed to traverse directory")]
    WalkError(#[from] walkdir::Error),

    // ─────────────────────────────────────────────────────────────
    // 启动错误
    // ─────────────────────────────────────────────────────────────
    #[error("File list cannot be empty")]
    EmptyFileList,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    // ─────────────────────────────────────────────────────────────
    // 编码错误
    // ─────────────────────────────────────────────────────────────
    #[error(transparent)]
    Transcode(#[from] TranscodeError),

    #[error("Detection confidence {confidence:.2} ({encoding}) for {path} is below threshold {threshold:.2}")]
    LowConfidence {
        path: String,
        encoding: String,
        confidence: f64,
        threshold: f64,
        has_bom: bool,
    },

    // ─────────────────────────────────────────────────────────────
    // 报告导出错误
    // ─────────────────────────────────────────────────────────────
    #[error("CSV error")]
    CsvError(#[from] csv::Error),

    #[error("JSON error")]
    JsonError(#[from] serde_json::Error),

    // ─────────────────────────────────────────────────────────────
    // 其他
    // ─────────────────────────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, Utf8ifyError>;

/// 展开错误链：`top: cause: root cause`
pub fn describe(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_includes_source() {
        let err = Utf8ifyError::FileReadError {
            path: "a.txt".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(describe(&err), "Failed to read file: a.txt: denied");
    }

    #[test]
    fn test_transcode_error_is_transparent() {
        let err = Utf8ifyError::from(TranscodeError::Undetectable);
        assert_eq!(describe(&err), "Unable to determine source encoding");
    }
}
