//! # convert 子命令 CLI 定义
//!
//! 批量转换文件编码（单文件 / 文件列表 / 目录）
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/convert.rs`

use crate::models::config::DEFAULT_MAX_FILE_SIZE;

use clap::Args;
use std::path::PathBuf;

/// convert 子命令参数
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Input files or directories
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Output file (single-file input only; defaults to the derived output path)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Target encoding
    #[arg(short, long, default_value = "UTF-8", env = "UTF8IFY_TARGET")]
    pub target: String,

    /// Number of parallel jobs (0 = auto)
    #[arg(short, long, default_value_t = 4, env = "UTF8IFY_JOBS")]
    pub jobs: usize,

    /// Recurse into subdirectories
    #[arg(short, long, default_value_t = false)]
    pub recursive: bool,

    /// Do not keep a .bak copy of overwritten files
    #[arg(long, default_value_t = false)]
    pub no_backup: bool,

    /// Overwrite existing output files
    #[arg(long, default_value_t = false)]
    pub overwrite: bool,

    /// Detect and transcode, but write nothing
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    /// Include hidden files and directories
    #[arg(long, default_value_t = false)]
    pub hidden: bool,

    /// Maximum file size in bytes (0 = unlimited)
    #[arg(long, default_value_t = DEFAULT_MAX_FILE_SIZE)]
    pub max_size: u64,

    /// Comma-separated glob patterns a file name must match (others are skipped)
    #[arg(short, long)]
    pub include: Option<String>,

    /// Accept every file regardless of extension
    #[arg(long, default_value_t = false, conflicts_with = "include")]
    pub all: bool,

    /// Only enumerate these extensions while walking directories
    #[arg(long, value_delimiter = ',')]
    pub ext: Vec<String>,

    /// Write a CSV report of per-file outcomes
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Print the batch result as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}
