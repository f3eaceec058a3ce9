/// 日志工具模块
///
/// 提供日志初始化和格式化输出的辅助函数
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::models::{BatchReport, PackingStats, UpdateResult};

/// 初始化日志
///
/// # 参数
/// - `verbose`: 未设置 `RUST_LOG` 时是否输出 debug 级别
///
/// 日志输出到 stderr，stdout 留给 JSON 结果。重复初始化时静默忽略。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 梱包管理表 - {}", config.sheet_name);
    info!("📋 表格 ID: {}", truncate_text(&config.spreadsheet_id, 16));
    info!("🧭 列布局: {}", config.layout.version);
    info!(
        "🔑 凭据: {}",
        match (&config.access_token, &config.api_key) {
            (Some(_), _) => "access token (读写)",
            (None, Some(_)) => "API key (只读)",
            (None, None) => "无",
        }
    );
    if let Some(endpoint) = &config.gas_endpoint {
        info!("📝 写入: Apps Script ({})", truncate_text(endpoint, 40));
    }
    info!("{}", "=".repeat(60));
}

/// 打印统计信息
pub fn log_snapshot(stats: &PackingStats) {
    info!("{}", "─".repeat(60));
    info!("📊 合计: {}", stats.total);
    info!("⏳ 未处理: {}", stats.pending);
    info!("✅ 完了: {} (今日 {})", stats.completed, stats.today_completed);
    info!("{}", "─".repeat(60));
}

/// 打印单行更新结果
pub fn log_update(result: &UpdateResult) {
    info!("✓ 第 {} 行梱包完了", result.row_index);
    for write in &result.writes {
        info!("  {} = {}", write.address, truncate_text(&write.value, 40));
    }
}

/// 打印批量更新结果
pub fn log_batch(report: &BatchReport) {
    for result in &report.completed {
        log_update(result);
    }
    if let Some(failure) = &report.failed {
        info!("❌ 第 {} 行失败: {}", failure.row_index, failure.error);
    }
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度（按字符计）
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("パレット①", 10), "パレット①");
        assert_eq!(truncate_text("仮置きパレット(作業途中)", 4), "仮置きパ...");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init(false);
        init(true);
    }
}
