//! # 单文件处理流程
//!
//! 读取 → 检测/转码 → 写出。批量执行器和单文件入口共用这一流程。
//!
//! ## 写出规则
//! - 试运行模式仍然执行检测和转码，只是不写出任何文件
//! - 输出路径不同于输入且已存在时，除非允许覆盖，否则视为写出失败
//! - 启用备份且目标已存在时，先复制为 `<目标>.bak`
//! - 原地转换且内容不变时不重写文件
//! - 通过同目录临时文件 + rename 写出，并沿用输入文件的权限位
//!
//! ## 依赖关系
//! - 被 `batch/runner.rs` 调用
//! - 使用 `transcode::Transcoder`
//! - 使用 `tempfile` 实现原子写出

use crate::error::{describe, Result, Utf8ifyError};
use crate::models::{Config, ConvertResult, FileError, FileOperation, Progress, ProgressStatus};
use crate::transcode::Detection;

use chrono::Utc;
use log::debug;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tempfile::NamedTempFile;

/// 带阶段标记的失败
#[derive(Debug)]
pub struct StageError {
    pub operation: FileOperation,
    pub error: Utf8ifyError,
}

impl StageError {
    fn new(operation: FileOperation, error: impl Into<Utf8ifyError>) -> Self {
        StageError {
            operation,
            error: error.into(),
        }
    }

    pub fn into_file_error(self, path: &Path) -> FileError {
        FileError::new(path, self.operation, describe(&self.error))
    }
}

/// 处理单个文件（不经过并发闸门，不发送进度事件）
pub fn process_file(
    input: &Path,
    output: &Path,
    config: &Config,
) -> std::result::Result<ConvertResult, StageError> {
    let start = Instant::now();

    let data = fs::read(input).map_err(|e| {
        StageError::new(
            FileOperation::Read,
            Utf8ifyError::FileReadError {
                path: input.display().to_string(),
                source: e,
            },
        )
    })?;

    let transcoded = config
        .transcoder
        .detect_and_convert(&data, &config.target_encoding)
        .map_err(|e| StageError::new(FileOperation::Convert, e))?;

    debug!(
        "{}: {} -> {} (confidence {:.2})",
        input.display(),
        transcoded.source_encoding,
        transcoded.target_encoding,
        transcoded.confidence
    );

    let in_place = is_same_file(input, output);
    let backup_path = if config.dry_run {
        None
    } else if in_place && transcoded.data == data {
        debug!("{}: content unchanged, not rewritten", input.display());
        None
    } else {
        write_output(input, output, in_place, &transcoded.data, config)
            .map_err(|e| StageError::new(FileOperation::Write, e))?
    };

    Ok(ConvertResult {
        input_path: input.to_path_buf(),
        output_path: output.to_path_buf(),
        source_encoding: transcoded.source_encoding,
        target_encoding: transcoded.target_encoding,
        bytes_processed: transcoded.bytes_processed,
        processing_time: start.elapsed(),
        detection_confidence: transcoded.confidence,
        backup_path,
        dry_run: config.dry_run,
    })
}

/// 备份文件路径：`<path>.bak`
pub fn backup_path_for(path: &Path) -> PathBuf {
    let mut raw = path.as_os_str().to_os_string();
    raw.push(".bak");
    PathBuf::from(raw)
}

/// 两个路径是否指向同一文件；写法不同时按规范化路径比较
fn is_same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// 写出转码结果，返回备份路径（如有）
fn write_output(
    input: &Path,
    output: &Path,
    in_place: bool,
    data: &[u8],
    config: &Config,
) -> Result<Option<PathBuf>> {
    let write_err = |e: std::io::Error| Utf8ifyError::FileWriteError {
        path: output.display().to_string(),
        source: e,
    };

    let exists = output.exists();
    if exists && !in_place && !config.overwrite_existing {
        return Err(Utf8ifyError::DestinationExists {
            path: output.display().to_string(),
        });
    }

    let backup = if config.create_backup && exists {
        let backup = backup_path_for(output);
        fs::copy(output, &backup).map_err(write_err)?;
        Some(backup)
    } else {
        None
    };

    let permissions = fs::metadata(input).ok().map(|m| m.permissions());

    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(data).map_err(write_err)?;
    if let Some(permissions) = permissions {
        tmp.as_file().set_permissions(permissions).map_err(write_err)?;
    }
    tmp.persist(output).map_err(|e| write_err(e.error))?;

    Ok(backup)
}

/// 转换单个文件
///
/// 与批量执行的读/转/写流程相同，但不经过并发闸门；失败时直接返回错误。
pub fn convert_file(input: &Path, output: &Path, config: &Config) -> Result<ConvertResult> {
    if input.as_os_str().is_empty() {
        return Err(Utf8ifyError::InvalidArgument(
            "input file path cannot be empty".to_string(),
        ));
    }
    if output.as_os_str().is_empty() {
        return Err(Utf8ifyError::InvalidArgument(
            "output file path cannot be empty".to_string(),
        ));
    }
    if !input.is_file() {
        return Err(Utf8ifyError::FileNotFound {
            path: input.display().to_string(),
        });
    }

    let start_time = Utc::now();
    let start = Instant::now();
    let event = |status, processed, error_count, bytes| Progress {
        current_file: input.to_path_buf(),
        processed_files: processed,
        total_files: 1,
        status,
        start_time,
        elapsed: start.elapsed(),
        estimated_remaining: None,
        bytes_processed: bytes,
        error_count,
    };

    config.emit(event(ProgressStatus::Starting, 0, 0, None));
    config.emit(event(ProgressStatus::Processing, 0, 0, None));

    match process_file(input, output, config) {
        Ok(result) => {
            config.emit(event(
                ProgressStatus::Completed,
                1,
                0,
                Some(result.bytes_processed),
            ));
            Ok(result)
        }
        Err(stage) => {
            config.emit(event(ProgressStatus::Failed, 1, 1, None));
            Err(stage.error)
        }
    }
}

/// 显式置信度检查：低于 `min_confidence` 时返回 `LowConfidence`
pub fn check_confidence(path: &Path, config: &Config) -> Result<Detection> {
    let data = fs::read(path).map_err(|e| Utf8ifyError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    let detection = config.transcoder.detect(&data)?;
    if detection.confidence < config.min_confidence {
        return Err(Utf8ifyError::LowConfidence {
            path: path.display().to_string(),
            encoding: detection.encoding,
            confidence: detection.confidence,
            threshold: config.min_confidence,
            has_bom: detection.has_bom,
        });
    }
    Ok(detection)
}
