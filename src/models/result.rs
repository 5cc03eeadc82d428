//! # 转换结果数据模型
//!
//! - `ConvertResult`：单个文件成功转换的结果
//! - `FileError`：单次失败操作的记录
//! - `BatchResult`：一次批量运行的汇总报告
//!
//! `BatchResult` 在运行期间只由批量执行器修改，返回后只读。
//!
//! ## 依赖关系
//! - 被 `batch/`, `commands/`, `utils/report.rs` 使用

use super::ProgressStatus;

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 失败发生的阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileOperation {
    Read,
    Convert,
    Write,
}

impl std::fmt::Display for FileOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileOperation::Read => write!(f, "read"),
            FileOperation::Convert => write!(f, "convert"),
            FileOperation::Write => write!(f, "write"),
        }
    }
}

/// 单文件转换结果
#[derive(Debug, Clone, Serialize)]
pub struct ConvertResult {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub source_encoding: String,
    pub target_encoding: String,
    pub bytes_processed: u64,
    #[serde(rename = "processing_time_ms", with = "crate::models::duration_ms")]
    pub processing_time: Duration,
    pub detection_confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_path: Option<PathBuf>,
    /// 试运行：未写出任何文件
    pub dry_run: bool,
}

/// 文件处理错误
#[derive(Debug, Clone, Serialize)]
pub struct FileError {
    pub path: PathBuf,
    pub operation: FileOperation,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl FileError {
    pub fn new(path: impl Into<PathBuf>, operation: FileOperation, message: impl Into<String>) -> Self {
        FileError {
            path: path.into(),
            operation,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

/// 单个文件的终结结果
#[derive(Debug, Clone)]
pub enum Outcome {
    /// 转换成功
    Success(ConvertResult),
    /// 被过滤器拒绝
    Skipped(PathBuf),
    /// 读/转/写失败
    Failed(FileError),
}

impl Outcome {
    pub fn path(&self) -> &Path {
        match self {
            Outcome::Success(result) => &result.input_path,
            Outcome::Skipped(path) => path,
            Outcome::Failed(error) => &error.path,
        }
    }

    /// 对应的进度状态
    pub fn status(&self) -> ProgressStatus {
        match self {
            Outcome::Success(_) => ProgressStatus::Completed,
            Outcome::Skipped(_) => ProgressStatus::Skipped,
            Outcome::Failed(_) => ProgressStatus::Failed,
        }
    }

    pub fn bytes_processed(&self) -> Option<u64> {
        match self {
            Outcome::Success(result) => Some(result.bytes_processed),
            _ => None,
        }
    }
}

/// 批量转换结果
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchResult {
    pub total_files: usize,
    pub processed_files: usize,
    pub successful_files: usize,
    pub failed_files: usize,
    pub skipped_files: usize,
    pub total_bytes: u64,
    #[serde(rename = "processing_time_ms", with = "crate::models::duration_ms")]
    pub processing_time: Duration,
    /// 并发执行时顺序不保证与输入一致
    pub results: Vec<ConvertResult>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FileError>,
}

impl BatchResult {
    /// 创建指定总数的空结果
    pub fn new(total_files: usize) -> Self {
        BatchResult {
            total_files,
            results: Vec::with_capacity(total_files),
            ..Default::default()
        }
    }

    /// 将单文件转换结果包装为批量结果
    pub fn from_single(result: ConvertResult) -> Self {
        let mut batch = BatchResult::new(1);
        batch.processing_time = result.processing_time;
        batch.merge(Outcome::Success(result));
        batch
    }

    /// 合并一个终结结果
    pub fn merge(&mut self, outcome: Outcome) {
        self.processed_files += 1;
        match outcome {
            Outcome::Success(result) => {
                self.successful_files += 1;
                self.total_bytes += result.bytes_processed;
                self.results.push(result);
            }
            Outcome::Skipped(_) => self.skipped_files += 1,
            Outcome::Failed(error) => {
                self.failed_files += 1;
                self.errors.push(error);
            }
        }
    }

    /// processed = successful + failed + skipped
    pub fn is_consistent(&self) -> bool {
        self.processed_files == self.successful_files + self.failed_files + self.skipped_files
    }

    pub fn has_failures(&self) -> bool {
        self.failed_files > 0
    }
}
