//! # 进度事件
//!
//! 进度事件是即发即弃的通知，由 `Config::progress` 消费后即丢弃。

use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::time::Duration;

/// 进度状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressStatus {
    Starting,
    Processing,
    Completed,
    Failed,
    Skipped,
}

impl std::fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProgressStatus::Starting => write!(f, "starting"),
            ProgressStatus::Processing => write!(f, "processing"),
            ProgressStatus::Completed => write!(f, "completed"),
            ProgressStatus::Failed => write!(f, "failed"),
            ProgressStatus::Skipped => write!(f, "skipped"),
        }
    }
}

/// 某一时刻的执行状态
#[derive(Debug, Clone)]
pub struct Progress {
    /// 当前文件（批量级事件为空路径）
    pub current_file: PathBuf,
    pub processed_files: usize,
    pub total_files: usize,
    pub status: ProgressStatus,
    pub start_time: DateTime<Utc>,
    pub elapsed: Duration,
    pub estimated_remaining: Option<Duration>,
    pub bytes_processed: Option<u64>,
    pub error_count: usize,
}

impl Progress {
    /// 批量开始事件
    pub fn starting(total_files: usize, start_time: DateTime<Utc>) -> Self {
        Progress {
            current_file: PathBuf::new(),
            processed_files: 0,
            total_files,
            status: ProgressStatus::Starting,
            start_time,
            elapsed: Duration::ZERO,
            estimated_remaining: None,
            bytes_processed: None,
            error_count: 0,
        }
    }

    /// 是否为终结状态（完成/失败/跳过）
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.status,
            ProgressStatus::Completed | ProgressStatus::Failed | ProgressStatus::Skipped
        )
    }
}

/// 剩余时间估计：已用时间 / 已处理数 × 剩余数
pub fn estimate_remaining(elapsed: Duration, processed: usize, total: usize) -> Option<Duration> {
    if processed == 0 {
        return None;
    }
    let remaining = total.saturating_sub(processed);
    Some(elapsed.mul_f64(remaining as f64 / processed as f64))
}
