//! 进度汇总 - 编排层
//!
//! 所有工作任务把事件发到同一个通道，只有一个消费者负责打印、
//! 写报告和计数，保证每条消息完整输出

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::models::{ApplicationOutcome, OutcomeSummary};
use crate::services::ReportWriter;
use crate::utils::logging::truncate_text;

/// 工作任务上报的事件
#[derive(Debug)]
pub enum ProgressEvent {
    /// 校验未通过，未派发
    Skipped {
        label: String,
        missing: Vec<&'static str>,
    },
    /// 开始处理
    Started { index: usize, label: String },
    /// 处理结束
    Finished {
        index: usize,
        outcome: ApplicationOutcome,
    },
}

/// 启动消费者任务，返回发送端和最终汇总
pub fn spawn_progress(
    report: Option<ReportWriter>,
    total: usize,
) -> (mpsc::UnboundedSender<ProgressEvent>, JoinHandle<OutcomeSummary>) {
    let (tx, mut rx) = mpsc::unbounded_channel();

    let handle = tokio::spawn(async move {
        let mut summary = OutcomeSummary::default();

        while let Some(event) = rx.recv().await {
            match event {
                ProgressEvent::Skipped { label, missing } => {
                    summary.skipped += 1;
                    warn!("⏭️ 跳过职位 {}: 缺少字段 {}", label, missing.join(", "));
                    if let Some(report) = &report {
                        if let Err(e) = report.write_skip(&label, &missing) {
                            warn!("写入报告失败: {}", e);
                        }
                    }
                }
                ProgressEvent::Started { index, label } => {
                    info!("[职位 {}] ▶️ 开始 {} ({}/{})", index, label, index, total);
                }
                ProgressEvent::Finished { index, outcome } => {
                    summary.record(outcome.status);
                    let detail = outcome
                        .detail
                        .as_deref()
                        .map(|d| format!(" | {}", truncate_text(d, 80)))
                        .unwrap_or_default();
                    info!(
                        "[职位 {}] {} {}{}",
                        index,
                        if outcome.status.is_negative() { "❌" } else { "✅" },
                        outcome.status,
                        detail
                    );
                    info!(
                        "📈 进度 {}/{} | {}",
                        summary.completed(),
                        total,
                        summary
                    );
                    if let Some(report) = &report {
                        if let Err(e) = report.write_outcome(index, &outcome) {
                            warn!("写入报告失败: {}", e);
                        }
                    }
                }
            }
        }

        if let Some(report) = &report {
            if let Err(e) = report.write_summary(&summary) {
                warn!("写入报告失败: {}", e);
            }
        }
        summary
    });

    (tx, handle)
}
