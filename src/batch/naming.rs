//! # 输出路径策略
//!
//! 目标编码为 UTF-8（忽略大小写）时原地转换；否则在扩展名前插入
//! `_<小写编码名>`，如 `report.txt` + `GBK` → `report_gbk.txt`。
//! 目录部分保持不变，无扩展名时直接追加后缀。

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// 计算输出路径（纯函数）
pub fn output_path(input: &Path, target_encoding: &str) -> PathBuf {
    if target_encoding.eq_ignore_ascii_case("UTF-8") {
        return input.to_path_buf();
    }

    let suffix = target_encoding.to_lowercase();

    let Some(stem) = input.file_stem() else {
        let mut raw = input.as_os_str().to_os_string();
        raw.push("_");
        raw.push(&suffix);
        return PathBuf::from(raw);
    };

    let mut name = OsString::from(stem);
    name.push("_");
    name.push(&suffix);
    if let Some(ext) = input.extension() {
        name.push(".");
        name.push(ext);
    }
    input.with_file_name(name)
}
