//! # 进度条工具
//!
//! 封装 `indicatif` 提供统一的进度条样式，并把批量执行器的进度事件映射到进度条上。
//!
//! ## 依赖关系
//! - 被 `commands/` 模块使用
//! - 使用 `indicatif` crate

use crate::models::{Progress, ProgressStatus};
use crate::utils::output;

use indicatif::{ProgressBar, ProgressStyle};
use log::trace;

/// 创建标准进度条
pub fn create_progress_bar(len: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
        )
        .unwrap()
        .progress_chars("#>-"),
    );
    pb.set_message(message.to_string());
    pb
}

/// 进度事件 → 进度条
///
/// Starting 设置总长度；每个终结事件前进一格；失败在进度条上方打印。
pub fn bar_sink(pb: ProgressBar) -> impl Fn(&Progress) + Send + Sync + 'static {
    move |p: &Progress| {
        trace!(
            "{} {} [{}/{}] elapsed {:.1?} eta {:?} bytes {:?}",
            p.status,
            p.current_file.display(),
            p.processed_files,
            p.total_files,
            p.elapsed,
            p.estimated_remaining,
            p.bytes_processed
        );

        let name = p
            .current_file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        match p.status {
            ProgressStatus::Starting => pb.set_length(p.total_files as u64),
            ProgressStatus::Processing => pb.set_message(name),
            ProgressStatus::Failed => pb.suspend(|| {
                output::print_error(&format!(
                    "{} (errors so far: {})",
                    p.current_file.display(),
                    p.error_count
                ));
            }),
            ProgressStatus::Completed | ProgressStatus::Skipped => {}
        }

        if p.is_terminal() {
            pb.inc(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::path::PathBuf;

    #[test]
    fn test_bar_sink_tracks_terminal_events() {
        let pb = ProgressBar::hidden();
        let sink = bar_sink(pb.clone());

        sink(&Progress::starting(2, Utc::now()));
        assert_eq!(pb.length(), Some(2));

        let mut p = Progress::starting(2, Utc::now());
        p.current_file = PathBuf::from("a.txt");
        p.status = ProgressStatus::Processing;
        sink(&p);
        assert_eq!(pb.position(), 0);

        p.status = ProgressStatus::Completed;
        sink(&p);
        p.status = ProgressStatus::Skipped;
        sink(&p);
        assert_eq!(pb.position(), 2);
    }
}
