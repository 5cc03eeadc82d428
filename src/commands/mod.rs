//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `batch/`, `models/`, `utils/`
//! - 子模块: convert, detect

pub mod convert;
pub mod detect;

use crate::cli::Commands;
use crate::error::Result;

/// 执行命令
pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Convert(args) => convert::execute(args),
        Commands::Detect(args) => detect::execute(args),
    }
}

/// 并行作业数：0 表示逻辑 CPU 数
pub(crate) fn resolve_jobs(jobs: usize) -> usize {
    if jobs == 0 {
        num_cpus::get()
    } else {
        jobs
    }
}
