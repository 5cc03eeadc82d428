//! # utf8ify - 批量文本编码转换工具
//!
//! 检测遗留编码（GBK、Shift_JIS、UTF-16 等）并把文件批量转换为 UTF-8
//! 或其他目标编码。
//!
//! ## 子命令
//! - `convert` - 转换单个文件、文件列表或目录树
//! - `detect`  - 只检测编码并报告置信度
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── batch/     (收集、单文件流程、并发执行)
//!   │     ├── transcode/ (编码检测与转码)
//!   │     └── models/    (配置、进度事件、结果)
//!   ├── utils/      (输出、日志、进度条、报告)
//!   └── error.rs    (错误处理)
//! ```

mod batch;
mod cli;
mod commands;
mod error;
mod models;
mod transcode;
mod utils;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();
    utils::logging::init(cli.verbose);

    if let Err(e) = commands::run(cli.command) {
        utils::output::print_error(&error::describe(&e));
        std::process::exit(1);
    }
}
