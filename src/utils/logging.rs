//! # 日志初始化
//!
//! 诊断信息走 `log` 门面，由 `env_logger` 输出到 stderr。
//! 默认级别 warn，`-v` 为 info，`-vv` 及以上为 debug；设置 `RUST_LOG` 时以其为准。

use env_logger::Env;

/// verbosity 对应的默认过滤级别
pub fn level_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

/// 初始化全局日志（只应调用一次）
pub fn init(verbosity: u8) {
    env_logger::Builder::from_env(Env::default().default_filter_or(level_for(verbosity)))
        .format_timestamp(None)
        .format_target(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_for() {
        assert_eq!(level_for(0), "warn");
        assert_eq!(level_for(1), "info");
        assert_eq!(level_for(2), "debug");
        assert_eq!(level_for(9), "debug");
    }
}
