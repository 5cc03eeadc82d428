//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `convert`: 批量转换文件编码
//! - `detect`: 只检测编码并报告置信度
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: convert, detect

pub mod convert;
pub mod detect;

use clap::{ArgAction, Parser, Subcommand};

/// utf8ify - 批量文本编码转换工具
#[derive(Parser)]
#[command(name = "utf8ify")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(about = "Detect legacy text encodings and batch-convert files to UTF-8", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug; RUST_LOG overrides)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Convert files, a file list, or a directory tree to the target encoding
    Convert(convert::ConvertArgs),

    /// Detect file encodings without writing anything
    Detect(detect::DetectArgs),
}
