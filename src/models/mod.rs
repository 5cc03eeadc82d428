//! # 数据模型模块
//!
//! 定义运行配置、进度事件和批量转换结果。
//!
//! ## 依赖关系
//! - 被 `batch/`, `commands/`, `utils/` 使用
//! - 子模块: config, progress, result

pub mod config;
pub mod progress;
pub mod result;

pub use config::{Config, ConfigOption};
pub use progress::{Progress, ProgressStatus};
pub use result::{BatchResult, ConvertResult, FileError, FileOperation, Outcome};

/// `Duration` 以毫秒序列化
pub(crate) mod duration_ms {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }
}
