//! # 运行配置
//!
//! `Config` 由默认值加上一组有序的 `ConfigOption` 构建。
//! 每个选项只修改一个字段，从左到右依次应用，同一字段后者覆盖前者。
//! 选项本身不做参数校验，比如并发数 0 或负数会原样保存，
//! 由批量执行器通过 `effective_concurrency` 兜底为 1。
//!
//! ## 依赖关系
//! - 被 `batch/`, `commands/` 使用
//! - 使用 `transcode::Transcoder` 作为可替换的转码器

use super::Progress;
use crate::transcode::{SmartTranscoder, Transcoder};

use std::path::Path;
use std::sync::Arc;

/// 文件过滤谓词
pub type FileFilter = Arc<dyn Fn(&Path) -> bool + Send + Sync>;

/// 进度回调
pub type ProgressSink = Arc<dyn Fn(&Progress) + Send + Sync>;

/// 配置选项：对单个字段的修改
pub type ConfigOption = Box<dyn FnOnce(&mut Config) + Send>;

/// 默认处理的文本扩展名
pub const DEFAULT_EXTENSIONS: &[&str] = &[
    "txt", "md", "csv", "log", "json", "xml", "html", "htm", "js", "css", "py", "go", "java",
    "c", "cpp", "h",
];

pub const DEFAULT_TARGET_ENCODING: &str = "UTF-8";
pub const DEFAULT_CONCURRENCY: i64 = 4;
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.8;
pub const DEFAULT_MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// 运行配置
#[derive(Clone)]
pub struct Config {
    /// 目标编码，默认 UTF-8
    pub target_encoding: String,
    /// 并发上限，非正数按 1 处理
    pub concurrency_limit: i64,
    /// 最小检测置信度，仅 `check_confidence` 使用
    pub min_confidence: f64,
    pub create_backup: bool,
    pub overwrite_existing: bool,
    pub dry_run: bool,
    pub skip_hidden: bool,
    pub recursive: bool,
    /// 最大文件大小（字节），0 表示不限
    pub max_file_size: u64,
    /// 目录遍历时的扩展名白名单（不计入统计）
    pub discovery_extensions: Option<Vec<String>>,
    /// 分发时的过滤谓词（被拒绝的文件计为跳过）
    pub file_filter: FileFilter,
    pub progress: Option<ProgressSink>,
    pub transcoder: Arc<dyn Transcoder>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            target_encoding: DEFAULT_TARGET_ENCODING.to_string(),
            concurrency_limit: DEFAULT_CONCURRENCY,
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            create_backup: true,
            overwrite_existing: false,
            dry_run: false,
            skip_hidden: true,
            recursive: false,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            discovery_extensions: None,
            file_filter: Arc::new(has_default_extension),
            progress: None,
            transcoder: Arc::new(SmartTranscoder::new()),
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("target_encoding", &self.target_encoding)
            .field("concurrency_limit", &self.concurrency_limit)
            .field("min_confidence", &self.min_confidence)
            .field("create_backup", &self.create_backup)
            .field("overwrite_existing", &self.overwrite_existing)
            .field("dry_run", &self.dry_run)
            .field("skip_hidden", &self.skip_hidden)
            .field("recursive", &self.recursive)
            .field("max_file_size", &self.max_file_size)
            .field("discovery_extensions", &self.discovery_extensions)
            .field("progress", &self.progress.is_some())
            .finish_non_exhaustive()
    }
}

impl Config {
    /// 在默认配置上依次应用选项
    pub fn from_options<I>(options: I) -> Self
    where
        I: IntoIterator<Item = ConfigOption>,
    {
        let mut config = Config::default();
        for option in options {
            option(&mut config);
        }
        config
    }

    /// 实际使用的并发数（至少为 1）
    pub fn effective_concurrency(&self) -> usize {
        usize::try_from(self.concurrency_limit.max(1)).unwrap_or(usize::MAX)
    }

    /// 发送进度事件（未设置回调时为空操作）
    pub fn emit(&self, progress: Progress) {
        if let Some(sink) = &self.progress {
            sink(&progress);
        }
    }
}

/// 默认过滤器：扩展名在 `DEFAULT_EXTENSIONS` 中（忽略大小写）
pub fn has_default_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| {
            DEFAULT_EXTENSIONS
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

// ─────────────────────────────────────────────────────────────
// 选项构造函数
// ─────────────────────────────────────────────────────────────

pub fn with_progress<F>(callback: F) -> ConfigOption
where
    F: Fn(&Progress) + Send + Sync + 'static,
{
    let sink: ProgressSink = Arc::new(callback);
    Box::new(move |c| c.progress = Some(sink))
}

pub fn with_target_encoding(encoding: impl Into<String>) -> ConfigOption {
    let encoding = encoding.into();
    Box::new(move |c| c.target_encoding = encoding)
}

pub fn with_concurrency(limit: i64) -> ConfigOption {
    Box::new(move |c| c.concurrency_limit = limit)
}

pub fn with_file_filter<F>(filter: F) -> ConfigOption
where
    F: Fn(&Path) -> bool + Send + Sync + 'static,
{
    let filter: FileFilter = Arc::new(filter);
    Box::new(move |c| c.file_filter = filter)
}

pub fn with_backup(create: bool) -> ConfigOption {
    Box::new(move |c| c.create_backup = create)
}

pub fn with_overwrite(overwrite: bool) -> ConfigOption {
    Box::new(move |c| c.overwrite_existing = overwrite)
}

pub fn with_min_confidence(confidence: f64) -> ConfigOption {
    Box::new(move |c| c.min_confidence = confidence)
}

pub fn with_dry_run(dry_run: bool) -> ConfigOption {
    Box::new(move |c| c.dry_run = dry_run)
}

pub fn with_skip_hidden(skip: bool) -> ConfigOption {
    Box::new(move |c| c.skip_hidden = skip)
}

pub fn with_recursive(recursive: bool) -> ConfigOption {
    Box::new(move |c| c.recursive = recursive)
}

pub fn with_max_file_size(size: u64) -> ConfigOption {
    Box::new(move |c| c.max_file_size = size)
}

/// 目录遍历阶段的扩展名白名单（不带点，忽略大小写）
pub fn with_discovery_extensions(extensions: Vec<String>) -> ConfigOption {
    Box::new(move |c| c.discovery_extensions = Some(extensions))
}

pub fn with_transcoder(transcoder: Arc<dyn Transcoder>) -> ConfigOption {
    Box::new(move |c| c.transcoder = transcoder)
}
