//! # 文件收集器
//!
//! 在根目录下枚举候选文件。
//!
//! ## 规则
//! - 非递归模式通过 `max_depth(1)` 直接剪枝，不进入子目录
//! - 隐藏文件（以 `.` 开头）被忽略，隐藏目录整体剪枝
//! - 超过大小上限的文件静默排除
//! - 可选的扩展名白名单同样静默排除
//! - 符号链接不跟随，也不作为候选（写出时 rename 会把链接替换为普通文件）
//!
//! 这些排除都不计入 `BatchResult` 的统计；`Config::file_filter` 不在这里应用，
//! 而是推迟到分发阶段，被拒绝的文件会计为"跳过"。
//!
//! 根目录本身无法遍历时返回错误；更深层目录的读取错误只记录警告并跳过。
//!
//! ## 依赖关系
//! - 被 `batch/runner.rs` 调用
//! - 使用 `walkdir` 遍历目录

use crate::error::{Result, Utf8ifyError};
use crate::models::Config;

use log::{debug, warn};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// 文件收集器
pub struct FileCollector {
    /// 根路径
    root: PathBuf,
    /// 是否递归
    recursive: bool,
    /// 是否跳过隐藏条目
    skip_hidden: bool,
    /// 最大文件大小，0 表示不限
    max_file_size: u64,
    /// 扩展名白名单（小写，不带点）
    extensions: Option<Vec<String>>,
}

impl FileCollector {
    /// 创建新的文件收集器
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            recursive: false,
            skip_hidden: true,
            max_file_size: 0,
            extensions: None,
        }
    }

    /// 按运行配置创建
    pub fn from_config(root: impl Into<PathBuf>, config: &Config) -> Self {
        let collector = Self::new(root)
            .recursive(config.recursive)
            .skip_hidden(config.skip_hidden)
            .max_file_size(config.max_file_size);
        match &config.discovery_extensions {
            Some(exts) => collector.extensions(exts.as_slice()),
            None => collector,
        }
    }

    /// 设置是否递归搜索
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn skip_hidden(mut self, skip: bool) -> Self {
        self.skip_hidden = skip;
        self
    }

    pub fn max_file_size(mut self, size: u64) -> Self {
        self.max_file_size = size;
        self
    }

    /// 设置扩展名白名单（接受 `txt` 或 `.txt`）
    pub fn extensions<S: AsRef<str>>(mut self, exts: &[S]) -> Self {
        self.extensions = Some(
            exts.iter()
                .map(|e| e.as_ref().trim().trim_start_matches('.').to_lowercase())
                .filter(|e| !e.is_empty())
                .collect(),
        );
        self
    }

    /// 收集所有候选文件（按路径排序）
    pub fn collect(&self) -> Result<Vec<PathBuf>> {
        let max_depth = if self.recursive { usize::MAX } else { 1 };

        let walker = WalkDir::new(&self.root)
            .max_depth(max_depth)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !(self.skip_hidden && is_hidden(e)));

        let mut files = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => return Err(Utf8ifyError::WalkError(e)),
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            let file_type = entry.file_type();
            if file_type.is_symlink() {
                debug!("Skipping symlink {}", entry.path().display());
                continue;
            }
            if !file_type.is_file() {
                continue;
            }

            if !self.matches_extension(entry.path()) {
                continue;
            }

            if self.max_file_size > 0 {
                match entry.metadata() {
                    Ok(meta) if meta.len() > self.max_file_size => {
                        debug!(
                            "Excluding oversized file {} ({} bytes)",
                            entry.path().display(),
                            meta.len()
                        );
                        continue;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!("Cannot stat {}: {}", entry.path().display(), e);
                        continue;
                    }
                }
            }

            files.push(entry.into_path());
        }

        Ok(files)
    }

    fn matches_extension(&self, path: &Path) -> bool {
        let Some(allowed) = &self.extensions else {
            return true;
        };
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| allowed.iter().any(|a| a.eq_ignore_ascii_case(ext)))
            .unwrap_or(false)
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}
