/// 日志工具模块
///
/// 日志初始化以及格式化输出的辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::error::ConfigError;
use crate::models::RunState;

/// 初始化日志
///
/// 优先使用 `RUST_LOG`，否则按 `verbose` 选择 info / debug
pub fn init(verbose: bool) -> Result<(), ConfigError> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_level).map_err(|_| ConfigError::InvalidLogFilter {
            value: default_level.to_string(),
        })?,
    };

    // 重复初始化（例如测试中）不视为错误
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
    Ok(())
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 Easy Apply 自动申请启动");
    info!("🌐 目标页面: {}", config.target_url);
    info!("🤖 LLM 模型: {}", config.llm_model_name);
    info!("{}", "=".repeat(60));
}

/// 打印一次运行的最终统计
pub fn print_final_stats(state: &RunState) {
    info!("\n{}", "=".repeat(60));
    info!("📊 本次运行统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 已申请: {}", state.applied_count);
    info!("⏭️ 已跳过: {}", state.skipped_count);
    info!("❌ 失败: {}", state.failed_count);
    info!("{}", "=".repeat(60));
}

/// 截断长文本（按字符计数，不会切断多字节字符）
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

/// 截断到固定字符预算，不追加省略号（用于发送给 LLM 的上下文）
pub fn clip(text: &str, budget: usize) -> &str {
    match text.char_indices().nth(budget) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
