//! # detect 命令实现
//!
//! 并行检测文件编码并报告置信度，不写出任何文件。
//!
//! 目录输入按与 convert 相同的规则收集，并应用默认扩展名过滤；
//! 显式给出的文件总是参与检测。
//!
//! ## 依赖关系
//! - 使用 `cli/detect.rs` 定义的参数
//! - 使用 `batch::check_confidence`
//! - 使用 `tabled` 输出结果表格

use super::resolve_jobs;
use crate::batch::check_confidence;
use crate::batch::collector::FileCollector;
use crate::cli::detect::DetectArgs;
use crate::error::{describe, Result, Utf8ifyError};
use crate::models::config::{
    with_discovery_extensions, with_max_file_size, with_min_confidence, with_recursive,
    with_skip_hidden,
};
use crate::models::Config;
use crate::utils::{output, progress};

use colored::Colorize;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tabled::{Table, Tabled};

/// 检测状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DetectStatus {
    Ok,
    Low,
    Error,
}

impl std::fmt::Display for DetectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DetectStatus::Ok => write!(f, "ok"),
            DetectStatus::Low => write!(f, "low confidence"),
            DetectStatus::Error => write!(f, "error"),
        }
    }
}

/// 检测结果表格行
#[derive(Debug, Clone, Tabled)]
struct DetectRow {
    #[tabled(rename = "File")]
    file: String,
    #[tabled(rename = "Encoding")]
    encoding: String,
    #[tabled(rename = "Confidence")]
    confidence: String,
    #[tabled(rename = "BOM")]
    bom: String,
    #[tabled(rename = "Status")]
    status: DetectStatus,
}

/// 执行 detect 命令
pub fn execute(args: DetectArgs) -> Result<()> {
    output::print_header("Detecting encodings");

    let mut options = vec![
        with_min_confidence(args.confidence),
        with_recursive(args.recursive),
        with_skip_hidden(!args.hidden),
        with_max_file_size(args.max_size),
    ];
    if !args.ext.is_empty() {
        options.push(with_discovery_extensions(args.ext.clone()));
    }
    let config = Config::from_options(options);

    let files = collect_inputs(&args.inputs, &config)?;
    if files.is_empty() {
        output::print_warning("No candidate files found");
        return Ok(());
    }
    output::print_info(&format!("Found {} files to inspect", files.len()));

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(resolve_jobs(args.jobs).min(files.len()))
        .build()
        .map_err(|e| Utf8ifyError::Other(format!("Failed to start worker pool: {}", e)))?;

    let pb = progress::create_progress_bar(files.len() as u64, "Detecting");
    let mut rows: Vec<DetectRow> = pool.install(|| {
        files
            .par_iter()
            .map(|path| {
                let row = detect_one(path, &config);
                pb.inc(1);
                row
            })
            .collect()
    });
    pb.finish_and_clear();

    rows.sort_by(|a, b| a.file.cmp(&b.file));
    let total = rows.len();
    let low = rows.iter().filter(|r| r.status == DetectStatus::Low).count();
    let failed = rows.iter().filter(|r| r.status == DetectStatus::Error).count();

    println!("{}", Table::new(rows));

    output::print_separator();
    println!("  {:<18}{}", "Files:", total);
    println!(
        "  {:<18}{}",
        format!("Below {:.2}:", config.min_confidence),
        if low > 0 {
            low.to_string().yellow()
        } else {
            low.to_string().normal()
        }
    );
    println!(
        "  {:<18}{}",
        "Errors:",
        if failed > 0 {
            failed.to_string().red()
        } else {
            failed.to_string().normal()
        }
    );
    output::print_separator();

    if low + failed == 0 {
        output::print_done("All files detected with sufficient confidence");
    }
    Ok(())
}

/// 展开输入：目录按配置收集并应用文件过滤器
fn collect_inputs(inputs: &[PathBuf], config: &Config) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let found = FileCollector::from_config(input, config).collect()?;
            files.extend(found.into_iter().filter(|p| (config.file_filter)(p.as_path())));
        } else if input.is_file() {
            files.push(input.clone());
        } else {
            return Err(Utf8ifyError::FileNotFound {
                path: input.display().to_string(),
            });
        }
    }
    Ok(files)
}

fn detect_one(path: &Path, config: &Config) -> DetectRow {
    let file = path.display().to_string();
    match check_confidence(path, config) {
        Ok(detection) => DetectRow {
            file,
            encoding: detection.encoding,
            confidence: format!("{:.2}", detection.confidence),
            bom: yes_no(detection.has_bom),
            status: DetectStatus::Ok,
        },
        Err(Utf8ifyError::LowConfidence {
            encoding,
            confidence,
            has_bom,
            ..
        }) => DetectRow {
            file,
            encoding,
            confidence: format!("{:.2}", confidence),
            bom: yes_no(has_bom),
            status: DetectStatus::Low,
        },
        Err(e) => {
            log::warn!("{}: {}", file, describe(&e));
            DetectRow {
                file,
                encoding: "-".to_string(),
                confidence: "-".to_string(),
                bom: "-".to_string(),
                status: DetectStatus::Error,
            }
        }
    }
}

fn yes_no(flag: bool) -> String {
    if flag { "yes" } else { "no" }.to_string()
}
