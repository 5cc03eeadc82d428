//! # 编码检测与转码模块
//!
//! 批量执行器只依赖 `Transcoder` trait：给定原始字节和目标编码，
//! 返回检测出的源编码、置信度以及转码后的字节。
//!
//! ## 子模块
//! - `smart` - 基于 `chardetng` + `encoding_rs` 的默认实现
//!
//! ## 依赖关系
//! - 被 `batch/pipeline.rs`, `commands/detect.rs` 使用
//! - 无内部模块依赖

pub mod smart;

pub use smart::SmartTranscoder;

use thiserror::Error;

/// 转码器错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranscodeError {
    #[error("Unsupported target encoding: {0}")]
    UnsupportedEncoding(String),

    #[error("Unable to determine source encoding")]
    Undetectable,

    #[error("Input is not valid {encoding}")]
    Malformed { encoding: String },

    #[error("Text contains characters that cannot be represented in {encoding}")]
    Unmappable { encoding: String },
}

/// 编码检测结果
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// 源编码名称（如 "UTF-8", "GBK"）
    pub encoding: String,
    /// 置信度 [0, 1]
    pub confidence: f64,
    /// 是否带 BOM
    pub has_bom: bool,
}

/// 转码结果
#[derive(Debug, Clone)]
pub struct Transcoded {
    pub source_encoding: String,
    pub target_encoding: String,
    pub confidence: f64,
    pub data: Vec<u8>,
    pub bytes_processed: u64,
}

/// 编码检测/转码器
///
/// 实现必须可以被多个线程同时调用，调用之间不共享可变状态。
pub trait Transcoder: Send + Sync {
    /// 仅检测源编码
    fn detect(&self, bytes: &[u8]) -> Result<Detection, TranscodeError>;

    /// 检测源编码并转换到 `target`
    fn detect_and_convert(&self, bytes: &[u8], target: &str)
        -> Result<Transcoded, TranscodeError>;
}
