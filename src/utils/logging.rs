/// 日志工具模块
///
/// 提供日志初始化和横幅输出的辅助函数
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::models::OutcomeSummary;

/// 初始化日志
///
/// `RUST_LOG` 优先；否则默认 info，`verbose` 时为 debug。
/// 重复调用（测试中）不会报错
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("auto_apply={},warn", default_level)));

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .try_init();
}

/// 记录程序启动信息
///
/// # 参数
/// - `max_concurrent`: 最大并发数
/// - `source`: 职位数据来源描述
pub fn log_startup(max_concurrent: usize, source: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 多任务自动投递模式");
    info!("📊 最大并发数: {}", max_concurrent);
    info!("🗂️ 职位来源: {}", source);
    info!("{}", "=".repeat(60));
}

/// 记录职位加载信息
///
/// # 参数
/// - `eligible`: 可投递的职位数
/// - `skipped`: 校验未通过的职位数
/// - `workers`: 实际并发数
pub fn log_jobs_loaded(eligible: usize, skipped: usize, workers: usize) {
    info!("✓ 找到 {} 个可投递的职位（跳过 {} 个）", eligible, skipped);
    info!("📋 同时处理 {} 个职位，完成一个补充一个\n", workers);
}

/// 打印最终统计信息
///
/// # 参数
/// - `summary`: 汇总
/// - `report_file_path`: 报告文件路径
pub fn print_final_stats(summary: &OutcomeSummary, report_file_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 已提交: {}", summary.submitted);
    info!("🌐 外部站点: {}", summary.handled_external);
    info!("🔍 未找到投递按钮: {}", summary.button_not_found);
    info!("🔐 登录失败: {}", summary.login_failed);
    info!("❌ 错误: {}", summary.error);
    info!("⏭️ 跳过: {}", summary.skipped);
    info!("{}", "=".repeat(60));
    info!("\n报告已保存至: {}", report_file_path);
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
