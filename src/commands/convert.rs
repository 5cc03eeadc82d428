//! # convert 命令实现
//!
//! 批量转换文件编码。
//!
//! ## 功能
//! - 单个文件：直接转换，可用 `--output` 指定输出路径
//! - 单个目录：遍历后批量转换
//! - 多个输入：目录展开后与文件合并为一个文件列表批量转换
//! - 终端摘要 / 表格 / JSON / CSV 报告
//!
//! 单文件失败会使命令返回错误；批量运行中的单文件失败只出现在报告里。
//!
//! ## 依赖关系
//! - 使用 `cli/convert.rs` 定义的参数
//! - 使用 `batch/`, `models/config.rs`
//! - 使用 `utils/output.rs`, `utils/progress.rs`, `utils/report.rs`

use super::resolve_jobs;
use crate::batch::collector::FileCollector;
use crate::batch::{convert_directory, convert_file, convert_files, naming};
use crate::cli::convert::ConvertArgs;
use crate::error::{Result, Utf8ifyError};
use crate::models::config::{
    with_backup, with_concurrency, with_discovery_extensions, with_dry_run, with_file_filter,
    with_max_file_size, with_overwrite, with_progress, with_recursive, with_skip_hidden,
    with_target_encoding,
};
use crate::models::{BatchResult, Config, ConfigOption};
use crate::utils::{output, progress, report};

use indicatif::ProgressBar;
use std::path::{Path, PathBuf};

/// 执行 convert 命令
pub fn execute(args: ConvertArgs) -> Result<()> {
    output::print_header(&format!("Converting to {}", args.target));

    // 验证输入路径
    for input in &args.inputs {
        if !input.exists() {
            return Err(Utf8ifyError::FileNotFound {
                path: input.display().to_string(),
            });
        }
    }

    if args.dry_run {
        output::print_info("Dry run: encodings are detected but no files are written");
    }

    let pb = progress::create_progress_bar(0, "Converting");
    let config = Config::from_options(build_options(&args, pb.clone())?);

    let result = run_inputs(&args, &config, &pb);
    pb.finish_and_clear();
    let result = result?;

    if result.total_files == 0 {
        output::print_warning("No candidate files found");
        return Ok(());
    }
    debug_assert!(result.is_consistent());

    if args.json {
        println!("{}", report::to_json(&result)?);
    } else {
        report::print_summary(&result);
        report::print_results_table(&result.results);
        report::print_errors(&result);
    }

    if let Some(path) = &args.report {
        report::write_csv(&result, path)?;
        output::print_success(&format!("Report saved to '{}'", path.display()));
    }

    if result.has_failures() {
        output::print_warning(&format!(
            "{} of {} file(s) failed",
            result.failed_files, result.total_files
        ));
    } else {
        output::print_done(&format!(
            "Processed {} file(s) ({} skipped)",
            result.processed_files, result.skipped_files
        ));
    }

    Ok(())
}

/// 按输入类型分发到单文件 / 目录 / 文件列表
fn run_inputs(args: &ConvertArgs, config: &Config, pb: &ProgressBar) -> Result<BatchResult> {
    if let [single] = args.inputs.as_slice() {
        if single.is_file() {
            let output_path = args
                .output
                .clone()
                .unwrap_or_else(|| naming::output_path(single, &config.target_encoding));
            let result = convert_file(single, &output_path, config)?;

            pb.suspend(|| output::print_conversion(&result));
            return Ok(BatchResult::from_single(result));
        }

        reject_output(args)?;
        return convert_directory(single, config);
    }

    reject_output(args)?;
    let files = expand_inputs(&args.inputs, config)?;
    output::print_info(&format!("Found {} files to convert", files.len()));
    convert_files(&files, config)
}

fn reject_output(args: &ConvertArgs) -> Result<()> {
    if args.output.is_some() {
        return Err(Utf8ifyError::InvalidArgument(
            "--output only applies to a single input file".to_string(),
        ));
    }
    Ok(())
}

/// 展开输入：目录用收集器遍历，文件原样保留
fn expand_inputs(inputs: &[PathBuf], config: &Config) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            files.extend(FileCollector::from_config(input, config).collect()?);
        } else {
            files.push(input.clone());
        }
    }
    Ok(files)
}

/// 命令行参数 → 有序的配置选项
fn build_options(args: &ConvertArgs, pb: ProgressBar) -> Result<Vec<ConfigOption>> {
    let mut options = vec![
        with_target_encoding(args.target.clone()),
        with_concurrency(resolve_jobs(args.jobs) as i64),
        with_backup(!args.no_backup),
        with_overwrite(args.overwrite),
        with_dry_run(args.dry_run),
        with_skip_hidden(!args.hidden),
        with_recursive(args.recursive),
        with_max_file_size(args.max_size),
    ];

    if args.all {
        options.push(with_file_filter(|_: &Path| true));
    } else if let Some(include) = &args.include {
        let patterns = parse_patterns(include)?;
        options.push(with_file_filter(move |path: &Path| {
            matches_any(&patterns, path)
        }));
    }

    if !args.ext.is_empty() {
        options.push(with_discovery_extensions(args.ext.clone()));
    }

    options.push(with_progress(progress::bar_sink(pb)));
    Ok(options)
}

/// 解析逗号分隔的 glob 模式
fn parse_patterns(spec: &str) -> Result<Vec<glob::Pattern>> {
    let patterns = spec
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            glob::Pattern::new(s).map_err(|e| Utf8ifyError::InvalidPattern {
                pattern: s.to_string(),
                reason: e.to_string(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    if patterns.is_empty() {
        return Err(Utf8ifyError::InvalidPattern {
            pattern: spec.to_string(),
            reason: "no patterns given".to_string(),
        });
    }
    Ok(patterns)
}

/// 文件名是否匹配任一模式
fn matches_any(patterns: &[glob::Pattern], path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|name| patterns.iter().any(|p| p.matches(name)))
        .unwrap_or(false)
}
