//! # 终端输出
//!
//! 带状态标签的单行消息、标题栏和单文件转换摘要。
//! 错误写到 stderr，其余写到 stdout。
//!
//! ## 依赖关系
//! - 被 `commands/`, `utils/progress.rs`, `utils/report.rs`, `main.rs` 使用
//! - 使用 `colored` crate

use crate::models::ConvertResult;

use colored::{ColoredString, Colorize};

/// 分隔线宽度
const RULE_WIDTH: usize = 60;

/// 消息状态标签
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    Ok,
    Err,
    Warn,
    Info,
    Done,
}

impl Tag {
    fn label(self) -> ColoredString {
        match self {
            Tag::Ok => "[OK]".green().bold(),
            Tag::Err => "[ERR]".red().bold(),
            Tag::Warn => "[WARN]".yellow().bold(),
            Tag::Info => "[*]".blue().bold(),
            Tag::Done => "[DONE]".green().bold(),
        }
    }
}

fn tagged(tag: Tag, msg: &str) -> String {
    format!("{} {}", tag.label(), msg)
}

pub fn print_success(msg: &str) {
    println!("{}", tagged(Tag::Ok, msg));
}

pub fn print_error(msg: &str) {
    eprintln!("{}", tagged(Tag::Err, msg));
}

pub fn print_warning(msg: &str) {
    println!("{}", tagged(Tag::Warn, msg));
}

pub fn print_info(msg: &str) {
    println!("{}", tagged(Tag::Info, msg));
}

pub fn print_done(msg: &str) {
    println!("{}", tagged(Tag::Done, msg));
}

/// 单文件转换摘要：`in -> out (GBK => UTF-8, 0.90)`，附试运行 / 原地 / 备份标注
fn conversion_line(result: &ConvertResult) -> String {
    let destination = if result.output_path == result.input_path {
        "(in place)".to_string()
    } else {
        result.output_path.display().to_string()
    };

    let mut line = format!(
        "{} {} {} {}",
        result.input_path.display().to_string().dimmed(),
        "->".cyan(),
        destination,
        format!(
            "({} => {}, {:.2})",
            result.source_encoding, result.target_encoding, result.detection_confidence
        )
        .dimmed()
    );

    if result.dry_run {
        line.push_str(&format!(" {}", "[dry run]".yellow()));
    }
    if let Some(backup) = &result.backup_path {
        line.push_str(&format!(" backup: {}", backup.display()));
    }
    line
}

pub fn print_conversion(result: &ConvertResult) {
    let tag = if result.dry_run { Tag::Info } else { Tag::Ok };
    println!("{}", tagged(tag, &conversion_line(result)));
}

/// 打印标题栏
pub fn print_header(title: &str) {
    let rule = "─".repeat(RULE_WIDTH);
    println!("\n{}\n  {}\n{}\n", rule.dimmed(), title.bold(), rule.dimmed());
}

pub fn print_separator() {
    println!("{}", "─".repeat(RULE_WIDTH).dimmed());
}
