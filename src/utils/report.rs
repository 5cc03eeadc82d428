//! # 结果报告
//!
//! 把 `BatchResult` 输出为终端摘要、`tabled` 表格、CSV 或 JSON。
//!
//! ## 依赖关系
//! - 被 `commands/convert.rs` 调用
//! - 使用 `tabled`、`csv`、`serde_json`

use crate::error::{Result, Utf8ifyError};
use crate::models::{BatchResult, ConvertResult};
use crate::utils::output;

use colored::Colorize;
use std::path::Path;
use tabled::{Table, Tabled};

/// 结果表格行
#[derive(Debug, Clone, Tabled)]
struct ResultRow {
    #[tabled(rename = "File")]
    file: String,
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Target")]
    target: String,
    #[tabled(rename = "Confidence")]
    confidence: String,
    #[tabled(rename = "Bytes")]
    bytes: u64,
    #[tabled(rename = "Time (ms)")]
    time_ms: u128,
    #[tabled(rename = "Output")]
    output: String,
}

impl From<&ConvertResult> for ResultRow {
    fn from(r: &ConvertResult) -> Self {
        let output = if r.dry_run {
            "(dry run)".to_string()
        } else if r.output_path == r.input_path {
            "(in place)".to_string()
        } else {
            r.output_path.display().to_string()
        };
        ResultRow {
            file: r.input_path.display().to_string(),
            source: r.source_encoding.clone(),
            target: r.target_encoding.clone(),
            confidence: format!("{:.2}", r.detection_confidence),
            bytes: r.bytes_processed,
            time_ms: r.processing_time.as_millis(),
            output,
        }
    }
}

/// 打印汇总信息
pub fn print_summary(result: &BatchResult) {
    output::print_separator();
    println!("  {:<18}{}", "Total files:", result.total_files);
    println!(
        "  {:<18}{}",
        "Converted:",
        result.successful_files.to_string().green()
    );
    let failed = result.failed_files.to_string();
    println!(
        "  {:<18}{}",
        "Failed:",
        if result.has_failures() {
            failed.red()
        } else {
            failed.normal()
        }
    );
    println!("  {:<18}{}", "Skipped:", result.skipped_files);
    println!("  {:<18}{}", "Bytes processed:", result.total_bytes);
    println!("  {:<18}{:.2?}", "Elapsed:", result.processing_time);
    output::print_separator();
}

/// 打印单文件结果表格
pub fn print_results_table(results: &[ConvertResult]) {
    if results.is_empty() {
        return;
    }
    let mut rows: Vec<ResultRow> = results.iter().map(ResultRow::from).collect();
    rows.sort_by(|a, b| a.file.cmp(&b.file));
    println!("{}", Table::new(rows));
}

/// 打印错误详情
pub fn print_errors(result: &BatchResult) {
    if result.errors.is_empty() {
        return;
    }
    println!("\n{}", "Errors:".red().bold());
    for err in &result.errors {
        println!(
            "  - {} [{}] {}",
            err.path.display(),
            err.operation,
            err.message
        );
    }
}

/// 批量结果输出为 JSON 字符串
pub fn to_json(result: &BatchResult) -> Result<String> {
    Ok(serde_json::to_string_pretty(result)?)
}

/// 导出每个文件的结果为 CSV
pub fn write_csv(result: &BatchResult, output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;

    wtr.write_record([
        "status",
        "input",
        "output",
        "source_encoding",
        "target_encoding",
        "confidence",
        "bytes",
        "time_ms",
        "operation",
        "message",
    ])?;

    let mut results: Vec<&ConvertResult> = result.results.iter().collect();
    results.sort_by(|a, b| a.input_path.cmp(&b.input_path));

    for r in results {
        wtr.write_record([
            if r.dry_run { "dry-run" } else { "converted" }.to_string(),
            r.input_path.display().to_string(),
            r.output_path.display().to_string(),
            r.source_encoding.clone(),
            r.target_encoding.clone(),
            format!("{:.2}", r.detection_confidence),
            r.bytes_processed.to_string(),
            r.processing_time.as_millis().to_string(),
            String::new(),
            String::new(),
        ])?;
    }

    for e in &result.errors {
        wtr.write_record([
            "failed".to_string(),
            e.path.display().to_string(),
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            e.operation.to_string(),
            e.message.clone(),
        ])?;
    }

    wtr.flush().map_err(|e| Utf8ifyError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })?;

    Ok(())
}
