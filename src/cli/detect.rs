//! # detect 子命令 CLI 定义
//!
//! 只检测编码，不写出任何文件

use crate::models::config::{DEFAULT_MAX_FILE_SIZE, DEFAULT_MIN_CONFIDENCE};

use clap::Args;
use std::path::PathBuf;

/// detect 子命令参数
#[derive(Args, Debug)]
pub struct DetectArgs {
    /// Input files or directories
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Minimum detection confidence (0-1)
    #[arg(short, long, default_value_t = DEFAULT_MIN_CONFIDENCE)]
    pub confidence: f64,

    /// Recurse into subdirectories
    #[arg(short, long, default_value_t = false)]
    pub recursive: bool,

    /// Include hidden files and directories
    #[arg(long, default_value_t = false)]
    pub hidden: bool,

    /// Maximum file size in bytes (0 = unlimited)
    #[arg(long, default_value_t = DEFAULT_MAX_FILE_SIZE)]
    pub max_size: u64,

    /// Only enumerate these extensions while walking directories
    #[arg(long, value_delimiter = ',')]
    pub ext: Vec<String>,

    /// Number of parallel jobs (0 = auto)
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,
}
