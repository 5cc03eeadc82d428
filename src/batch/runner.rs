//! # 批量执行器
//!
//! 在并发上限内并行转换文件列表，汇总为 `BatchResult`。
//!
//! ## 功能
//! - 基于 rayon 线程池的并发闸门：线程数即同时执行的转换数上限
//! - 分发阶段应用 `Config::file_filter`，被拒绝的文件计为跳过
//! - 单个文件失败只记录为 `FileError`，不中断整批任务
//! - 每个文件结束后发送进度事件（含剩余时间估计）
//!
//! 汇总结果由一把互斥锁保护，锁内只做内存记账，所有 I/O 和进度回调都在锁外。
//! `run` 在所有文件都得到终结结果后才返回。
//!
//! ## 依赖关系
//! - 被 `commands/convert.rs` 调用
//! - 使用 `batch/collector.rs`, `batch/naming.rs`, `batch/pipeline.rs`
//! - 使用 `rayon` 进行并行处理

use super::collector::FileCollector;
use super::{naming, pipeline};
use crate::error::{Result, Utf8ifyError};
use crate::models::progress::estimate_remaining;
use crate::models::{BatchResult, Config, Outcome, Progress, ProgressStatus};

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

/// 批量执行器
pub struct BatchRunner<'a> {
    config: &'a Config,
}

/// 一次运行的计时起点
struct Clock {
    start: Instant,
    start_time: DateTime<Utc>,
}

impl<'a> BatchRunner<'a> {
    /// 创建新的批量执行器
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// 并行处理文件列表
    pub fn run(&self, files: &[PathBuf]) -> Result<BatchResult> {
        if files.is_empty() {
            return Err(Utf8ifyError::EmptyFileList);
        }

        let total = files.len();
        // 线程数不超过文件数
        let jobs = self.config.effective_concurrency().min(total);
        let clock = Clock {
            start: Instant::now(),
            start_time: Utc::now(),
        };

        info!(
            "Converting {} file(s) to {} with {} worker(s)",
            total, self.config.target_encoding, jobs
        );

        // 配置 rayon 线程池
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build()
            .map_err(|e| Utf8ifyError::Other(format!("Failed to start worker pool: {}", e)))?;

        self.config.emit(Progress::starting(total, clock.start_time));

        let aggregate = Mutex::new(BatchResult::new(total));

        pool.install(|| {
            files
                .par_iter()
                .for_each(|path| self.dispatch(path, total, &aggregate, &clock));
        });

        let mut result = aggregate.into_inner().unwrap_or_else(PoisonError::into_inner);
        result.processing_time = clock.start.elapsed();

        info!(
            "Batch finished: {} ok, {} failed, {} skipped in {:.2?}",
            result.successful_files, result.failed_files, result.skipped_files, result.processing_time
        );

        Ok(result)
    }

    /// 处理单个文件并记录其终结结果
    fn dispatch(&self, path: &Path, total: usize, aggregate: &Mutex<BatchResult>, clock: &Clock) {
        let outcome = if !(self.config.file_filter)(path) {
            debug!("Skipping {} (rejected by filter)", path.display());
            Outcome::Skipped(path.to_path_buf())
        } else {
            let (processed, errors) = {
                let agg = lock(aggregate);
                (agg.processed_files, agg.errors.len())
            };
            self.config.emit(self.event(
                path,
                ProgressStatus::Processing,
                processed,
                total,
                errors,
                None,
                clock,
            ));

            let output = naming::output_path(path, &self.config.target_encoding);
            match pipeline::process_file(path, &output, self.config) {
                Ok(result) => Outcome::Success(result),
                Err(stage) => {
                    let error = stage.into_file_error(path);
                    warn!("{} failed during {}: {}", path.display(), error.operation, error.message);
                    Outcome::Failed(error)
                }
            }
        };

        let status = outcome.status();
        let bytes = outcome.bytes_processed();
        let current = outcome.path().to_path_buf();

        let (processed, errors) = {
            let mut agg = lock(aggregate);
            agg.merge(outcome);
            (agg.processed_files, agg.errors.len())
        };

        self.config
            .emit(self.event(&current, status, processed, total, errors, bytes, clock));
    }

    #[allow(clippy::too_many_arguments)]
    fn event(
        &self,
        path: &Path,
        status: ProgressStatus,
        processed: usize,
        total: usize,
        error_count: usize,
        bytes: Option<u64>,
        clock: &Clock,
    ) -> Progress {
        let elapsed = clock.start.elapsed();
        Progress {
            current_file: path.to_path_buf(),
            processed_files: processed,
            total_files: total,
            status,
            start_time: clock.start_time,
            elapsed,
            estimated_remaining: estimate_remaining(elapsed, processed, total),
            bytes_processed: bytes,
            error_count,
        }
    }
}

fn lock(aggregate: &Mutex<BatchResult>) -> MutexGuard<'_, BatchResult> {
    aggregate.lock().unwrap_or_else(PoisonError::into_inner)
}

/// 批量转换文件列表
pub fn convert_files(files: &[PathBuf], config: &Config) -> Result<BatchResult> {
    BatchRunner::new(config).run(files)
}

/// 转换目录中的文件
///
/// 目录下没有候选文件时返回空结果而不是错误。
pub fn convert_directory(root: &Path, config: &Config) -> Result<BatchResult> {
    if !root.exists() {
        return Err(Utf8ifyError::DirectoryNotFound {
            path: root.display().to_string(),
        });
    }
    if !root.is_dir() {
        return Err(Utf8ifyError::InvalidArgument(format!(
            "{} is not a directory",
            root.display()
        )));
    }

    let files = FileCollector::from_config(root, config).collect()?;
    info!("Discovered {} candidate file(s) under {}", files.len(), root.display());

    if files.is_empty() {
        return Ok(BatchResult::default());
    }

    convert_files(&files, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::{
        with_concurrency, with_discovery_extensions, with_dry_run, with_file_filter,
        with_progress, with_recursive, with_target_encoding, with_transcoder,
    };
    use crate::models::{FileOperation, ProgressStatus};
    use crate::transcode::{Detection, TranscodeError, Transcoded, Transcoder};
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;

    /// 记录并发峰值的假转码器；内容包含 "FAIL" 时报错
    #[derive(Default)]
    struct FakeTranscoder {
        delay: Duration,
        active: AtomicUsize,
        peak: AtomicUsize,
        calls: AtomicUsize,
    }

    impl FakeTranscoder {
        fn with_delay(ms: u64) -> Arc<Self> {
            Arc::new(FakeTranscoder {
                delay: Duration::from_millis(ms),
                ..Default::default()
            })
        }
    }

    impl Transcoder for FakeTranscoder {
        fn detect(&self, _bytes: &[u8]) -> std::result::Result<Detection, TranscodeError> {
            Ok(Detection {
                encoding: "FAKE".to_string(),
                confidence: 0.5,
                has_bom: false,
            })
        }

        fn detect_and_convert(
            &self,
            bytes: &[u8],
            target: &str,
        ) -> std::result::Result<Transcoded, TranscodeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            std::thread::sleep(self.delay);
            self.active.fetch_sub(1, Ordering::SeqCst);

            if bytes.windows(4).any(|w| w == b"FAIL") {
                return Err(TranscodeError::Undetectable);
            }
            Ok(Transcoded {
                source_encoding: "FAKE".to_string(),
                target_encoding: target.to_string(),
                confidence: 0.5,
                data: bytes.to_ascii_uppercase(),
                bytes_processed: bytes.len() as u64,
            })
        }
    }

    fn write_files(dir: &TempDir, names: &[&str], content: &str) -> Vec<PathBuf> {
        names
            .iter()
            .map(|name| {
                let path = dir.path().join(name);
                fs::write(&path, content).unwrap();
                path
            })
            .collect()
    }

    fn assert_counts(result: &BatchResult) {
        assert!(result.is_consistent());
        assert_eq!(result.processed_files, result.total_files);
        assert_eq!(result.results.len(), result.successful_files);
        assert_eq!(result.errors.len(), result.failed_files);
    }

    #[test]
    fn test_ascii_files_in_place() {
        let dir = TempDir::new().unwrap();
        let files = write_files(&dir, &["a.txt", "b.txt", "c.txt"], "plain ascii\n");

        let result = convert_files(&files, &Config::default()).unwrap();

        assert_eq!(result.total_files, 3);
        assert_eq!(result.successful_files, 3);
        assert_eq!(result.failed_files, 0);
        assert_counts(&result);
        for r in &result.results {
            assert_eq!(r.input_path, r.output_path);
            assert_eq!(r.source_encoding, "UTF-8");
        }
        assert_eq!(result.total_bytes, 3 * 12);
        // 内容不变的原地文件不重写，也不留备份
        for name in ["a.txt", "b.txt", "c.txt"] {
            assert!(!dir.path().join(format!("{}.bak", name)).exists());
        }
    }

    #[test]
    fn test_filter_rejections_are_skipped() {
        let dir = TempDir::new().unwrap();
        let files = write_files(&dir, &["keep1.txt", "skip1.txt", "keep2.txt"], "x");

        let config = Config::from_options(vec![with_file_filter(|p: &Path| {
            p.file_name()
                .map(|n| n.to_string_lossy().contains("keep"))
                .unwrap_or(false)
        })]);
        let result = convert_files(&files, &config).unwrap();

        assert_eq!(result.skipped_files, 1);
        assert_eq!(result.successful_files, 2);
        assert_eq!(result.processed_files, 3);
        assert_eq!(result.results.len(), 2);
        assert_counts(&result);
    }

    #[test]
    fn test_empty_list_is_setup_error() {
        let events = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&events);
        let fake = FakeTranscoder::with_delay(0);
        let config = Config::from_options(vec![
            with_transcoder(fake.clone()),
            with_progress(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        ]);

        let err = convert_files(&[], &config).unwrap_err();
        assert!(matches!(err, Utf8ifyError::EmptyFileList));
        assert_eq!(events.load(Ordering::SeqCst), 0);
        assert_eq!(fake.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_failures_are_tagged_and_run_continues() {
        let dir = TempDir::new().unwrap();
        let mut files = write_files(&dir, &["ok.txt"], "fine");
        files.extend(write_files(&dir, &["bad.txt"], "FAIL here"));
        files.push(dir.path().join("missing.txt"));

        let config = Config::from_options(vec![with_transcoder(FakeTranscoder::with_delay(0))]);
        let result = convert_files(&files, &config).unwrap();

        assert_eq!(result.successful_files, 1);
        assert_eq!(result.failed_files, 2);
        assert_counts(&result);

        let op_for = |name: &str| {
            result
                .errors
                .iter()
                .find(|e| e.path == dir.path().join(name))
                .map(|e| e.operation)
        };
        assert_eq!(op_for("bad.txt"), Some(FileOperation::Convert));
        assert_eq!(op_for("missing.txt"), Some(FileOperation::Read));

        // 失败的文件不产生部分输出
        assert_eq!(fs::read(dir.path().join("bad.txt")).unwrap(), b"FAIL here");
        assert_eq!(fs::read(dir.path().join("ok.txt")).unwrap(), b"FINE");
    }

    #[test]
    fn test_write_failure_is_tagged() {
        let dir = TempDir::new().unwrap();
        let files = write_files(&dir, &["report.txt"], "data");
        // 目标路径被目录占用
        fs::create_dir(dir.path().join("report_gbk.txt")).unwrap();

        let config = Config::from_options(vec![
            with_target_encoding("GBK"),
            with_transcoder(FakeTranscoder::with_delay(0)),
        ]);
        let result = convert_files(&files, &config).unwrap();

        assert_eq!(result.failed_files, 1);
        assert_eq!(result.errors[0].operation, FileOperation::Write);
        assert_counts(&result);
    }

    #[test]
    fn test_non_utf8_target_uses_suffixed_outputs() {
        let dir = TempDir::new().unwrap();
        let files = write_files(&dir, &["a.txt", "b.txt"], "abc");

        let config = Config::from_options(vec![
            with_target_encoding("GBK"),
            with_transcoder(FakeTranscoder::with_delay(0)),
        ]);
        let result = convert_files(&files, &config).unwrap();

        assert_eq!(result.successful_files, 2);
        assert_eq!(fs::read(dir.path().join("a_gbk.txt")).unwrap(), b"ABC");
        assert_eq!(fs::read(dir.path().join("a.txt")).unwrap(), b"abc");
    }

    #[test]
    fn test_concurrency_ceiling() {
        let dir = TempDir::new().unwrap();
        let names: Vec<String> = (0..8).map(|i| format!("f{}.txt", i)).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let files = write_files(&dir, &refs, "x");

        let fake = FakeTranscoder::with_delay(20);
        let config = Config::from_options(vec![
            with_concurrency(2),
            with_transcoder(fake.clone()),
        ]);
        let result = convert_files(&files, &config).unwrap();

        assert_eq!(result.successful_files, 8);
        assert!(fake.peak.load(Ordering::SeqCst) <= 2);
        assert_eq!(fake.calls.load(Ordering::SeqCst), 8);
    }

    #[test]
    fn test_non_positive_limit_clamps_to_one() {
        let dir = TempDir::new().unwrap();
        let files = write_files(&dir, &["a.txt", "b.txt", "c.txt"], "x");

        for limit in [0, -5] {
            let fake = FakeTranscoder::with_delay(5);
            let config = Config::from_options(vec![
                with_concurrency(limit),
                with_transcoder(fake.clone()),
            ]);
            let result = convert_files(&files, &config).unwrap();

            assert_eq!(result.processed_files, 3);
            assert_eq!(fake.peak.load(Ordering::SeqCst), 1);
        }
    }

    #[test]
    fn test_huge_limit_is_sized_to_work() {
        let dir = TempDir::new().unwrap();
        let files = write_files(&dir, &["a.txt", "b.txt", "c.txt"], "x");

        let fake = FakeTranscoder::with_delay(0);
        let config = Config::from_options(vec![
            with_concurrency(1_000_000),
            with_transcoder(fake.clone()),
        ]);
        let start = Instant::now();
        let result = convert_files(&files, &config).unwrap();

        assert_eq!(result.successful_files, 3);
        assert!(fake.peak.load(Ordering::SeqCst) <= 3);
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_dry_run_batch_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "测试".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        let files: Vec<PathBuf> = ["a.txt", "b.txt"]
            .iter()
            .map(|name| {
                let path = dir.path().join(name);
                fs::write(&path, &bytes).unwrap();
                path
            })
            .collect();

        let config = Config::from_options(vec![with_dry_run(true)]);
        let result = convert_files(&files, &config).unwrap();
        assert_eq!(result.successful_files, 2);
        assert!(result
            .results
            .iter()
            .all(|r| r.dry_run && r.source_encoding == "UTF-16LE" && r.backup_path.is_none()));

        let config = Config::from_options(vec![with_dry_run(true), with_target_encoding("GBK")]);
        let result = convert_files(&files, &config).unwrap();
        assert_eq!(result.successful_files, 2);

        for name in ["a.txt", "b.txt"] {
            assert_eq!(fs::read(dir.path().join(name)).unwrap(), bytes);
            assert!(!dir.path().join(format!("{}.bak", name)).exists());
        }
        assert!(!dir.path().join("a_gbk.txt").exists());
        assert!(!dir.path().join("b_gbk.txt").exists());
    }

    #[test]
    fn test_limit_one_serializes() {
        let dir = TempDir::new().unwrap();
        let files = write_files(&dir, &["a.txt", "b.txt", "c.txt", "d.txt"], "x");

        let config = Config::from_options(vec![
            with_concurrency(1),
            with_transcoder(FakeTranscoder::with_delay(25)),
        ]);
        let result = convert_files(&files, &config).unwrap();

        let sum: Duration = result.results.iter().map(|r| r.processing_time).sum();
        assert!(result.processing_time + Duration::from_millis(5) >= sum);
        assert!(result.processing_time >= Duration::from_millis(100));
    }

    #[test]
    fn test_progress_events() {
        let dir = TempDir::new().unwrap();
        let files = write_files(&dir, &["a.txt", "b.txt", "c.png"], "x");

        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let config = Config::from_options(vec![
            with_concurrency(3),
            with_transcoder(FakeTranscoder::with_delay(0)),
            with_progress(move |p| sink.lock().unwrap().push(p.clone())),
        ]);
        convert_files(&files, &config).unwrap();

        let events = events.lock().unwrap();
        let first = &events[0];
        assert_eq!(first.status, ProgressStatus::Starting);
        assert_eq!(first.total_files, 3);
        assert_eq!(first.processed_files, 0);
        assert!(first.current_file.as_os_str().is_empty());

        let terminal: Vec<_> = events.iter().filter(|p| p.is_terminal()).collect();
        assert_eq!(terminal.len(), 3);
        assert!(terminal.iter().all(|p| p.estimated_remaining.is_some()));
        assert_eq!(
            terminal
                .iter()
                .filter(|p| p.status == ProgressStatus::Skipped)
                .count(),
            1
        );
        assert_eq!(terminal.iter().map(|p| p.processed_files).max(), Some(3));
        assert!(events
            .iter()
            .skip(1)
            .all(|p| p.status != ProgressStatus::Starting));
    }

    #[test]
    fn test_directory_recursion() {
        let dir = TempDir::new().unwrap();
        write_files(&dir, &["a.txt", "b.txt"], "x");
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/c.txt"), "x").unwrap();
        fs::write(dir.path().join("sub/d.txt"), "x").unwrap();

        let flat = convert_directory(dir.path(), &Config::default()).unwrap();
        assert_eq!(flat.total_files, 2);

        let deep =
            convert_directory(dir.path(), &Config::from_options(vec![with_recursive(true)]))
                .unwrap();
        assert_eq!(deep.total_files, 4);
        assert_counts(&deep);
    }

    #[test]
    fn test_discovery_vs_dispatch_filtering() {
        let dir = TempDir::new().unwrap();
        write_files(&dir, &["a.txt", "b.png"], "x");

        // 默认过滤器在分发阶段应用：png 计入总数并标记为跳过
        let result = convert_directory(dir.path(), &Config::default()).unwrap();
        assert_eq!(result.total_files, 2);
        assert_eq!(result.skipped_files, 1);

        // 遍历阶段的扩展名白名单：png 从未被枚举
        let config = Config::from_options(vec![with_discovery_extensions(vec!["txt".into()])]);
        let result = convert_directory(dir.path(), &config).unwrap();
        assert_eq!(result.total_files, 1);
        assert_eq!(result.skipped_files, 0);
    }

    #[test]
    fn test_directory_setup_errors() {
        let dir = TempDir::new().unwrap();
        let missing = convert_directory(&dir.path().join("nope"), &Config::default());
        assert!(matches!(missing, Err(Utf8ifyError::DirectoryNotFound { .. })));

        let file = write_files(&dir, &["f.txt"], "x").remove(0);
        let not_dir = convert_directory(&file, &Config::default());
        assert!(matches!(not_dir, Err(Utf8ifyError::InvalidArgument(_))));
    }

    #[test]
    fn test_empty_directory_yields_empty_result() {
        let dir = TempDir::new().unwrap();
        let result = convert_directory(dir.path(), &Config::default()).unwrap();
        assert_eq!(result.total_files, 0);
        assert_eq!(result.processed_files, 0);
        assert!(result.is_consistent());
    }
}
