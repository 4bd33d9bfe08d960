//! 结果报告写入 - 业务能力层
//!
//! 只负责"写报告文件"，不关心流程

use std::fs::OpenOptions;
use std::io::Write;

use tracing::debug;

use crate::error::AppResult;
use crate::models::{ApplicationOutcome, OutcomeSummary};

/// 报告写入服务
///
/// 每个职位结果追加一行，运行结束追加汇总
pub struct ReportWriter {
    report_file_path: String,
}

impl ReportWriter {
    /// 使用自定义文件路径创建
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            report_file_path: path.into(),
        }
    }

    pub fn path(&self) -> &str {
        &self.report_file_path
    }

    /// 覆盖写入报告头
    pub fn init(&self) -> AppResult<()> {
        let header = format!(
            "{}\n职位投递报告 - {}\n{}\n\n",
            "=".repeat(60),
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            "=".repeat(60)
        );
        std::fs::write(&self.report_file_path, header)?;
        Ok(())
    }

    /// 追加一条职位结果
    pub fn write_outcome(&self, index: usize, outcome: &ApplicationOutcome) -> AppResult<()> {
        debug!("写入报告: 职位 {} | {}", outcome.job_id, outcome.status);
        self.append(&format!("[{}] {}\n", index, outcome))
    }

    /// 追加一条跳过记录
    pub fn write_skip(&self, label: &str, missing: &[&str]) -> AppResult<()> {
        self.append(&format!("[跳过] 职位 {} | 缺少字段: {}\n", label, missing.join(", ")))
    }

    /// 追加最终汇总
    pub fn write_summary(&self, summary: &OutcomeSummary) -> AppResult<()> {
        self.append(&format!("\n{}\n汇总: {}\n", "-".repeat(60), summary))
    }

    fn append(&self, line: &str) -> AppResult<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.report_file_path)?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }
}
