//! # 批量处理模块
//!
//! 编码转换的核心流程。
//!
//! ## 功能
//! - 收集目录中的候选文件
//! - 计算输出路径
//! - 单文件读取/转码/写出
//! - 在并发上限内批量执行并汇总结果
//!
//! ## 依赖关系
//! - 被 `commands/` 调用
//! - 使用 `models/`, `transcode/`
//! - 子模块: collector, naming, pipeline, runner

pub mod collector;
pub mod naming;
pub mod pipeline;
pub mod runner;

pub use pipeline::{check_confidence, convert_file};
pub use runner::{convert_directory, convert_files};
