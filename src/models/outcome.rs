use serde::{Deserialize, Serialize};
use std::fmt;

/// 单个职位的投递结果状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ApplicationStatus {
    /// 在平台上完成了投递流程（提交按钮可能缺失，需人工确认）
    Submitted,
    /// 跳转到外部站点，只做了尽力而为的处理
    HandledExternal,
    /// 没有找到投递按钮
    ButtonNotFound,
    /// 平台登录校验失败
    LoginFailed,
    /// 意外错误
    Error,
}

impl ApplicationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ApplicationStatus::Submitted => "submitted",
            ApplicationStatus::HandledExternal => "handled-external",
            ApplicationStatus::ButtonNotFound => "button-not-found",
            ApplicationStatus::LoginFailed => "login-failed",
            ApplicationStatus::Error => "error",
        }
    }

    /// 是否属于负面结果
    pub fn is_negative(self) -> bool {
        matches!(
            self,
            ApplicationStatus::ButtonNotFound
                | ApplicationStatus::LoginFailed
                | ApplicationStatus::Error
        )
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 单个职位的最终结果，创建后不再修改
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationOutcome {
    pub job_id: String,
    pub status: ApplicationStatus,
    /// 调试截图路径
    pub screenshot: Option<String>,
    /// 附加说明（错误信息等）
    pub detail: Option<String>,
}

impl ApplicationOutcome {
    pub fn new(job_id: impl Into<String>, status: ApplicationStatus) -> Self {
        Self {
            job_id: job_id.into(),
            status,
            screenshot: None,
            detail: None,
        }
    }

    pub fn with_screenshot(mut self, screenshot: Option<String>) -> Self {
        self.screenshot = screenshot;
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

impl fmt::Display for ApplicationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "职位 {} | {}", self.job_id, self.status)?;
        if let Some(detail) = &self.detail {
            write!(f, " | {}", detail)?;
        }
        if let Some(shot) = &self.screenshot {
            write!(f, " | 截图: {}", shot)?;
        }
        Ok(())
    }
}

/// 按状态统计的汇总
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OutcomeSummary {
    pub submitted: usize,
    pub handled_external: usize,
    pub button_not_found: usize,
    pub login_failed: usize,
    pub error: usize,
    /// 校验未通过而未派发的职位
    pub skipped: usize,
}

impl OutcomeSummary {
    pub fn record(&mut self, status: ApplicationStatus) {
        match status {
            ApplicationStatus::Submitted => self.submitted += 1,
            ApplicationStatus::HandledExternal => self.handled_external += 1,
            ApplicationStatus::ButtonNotFound => self.button_not_found += 1,
            ApplicationStatus::LoginFailed => self.login_failed += 1,
            ApplicationStatus::Error => self.error += 1,
        }
    }

    /// 已产生结果的职位数（不含跳过）
    pub fn completed(&self) -> usize {
        self.submitted + self.handled_external + self.button_not_found + self.login_failed + self.error
    }

    pub fn count(&self, status: ApplicationStatus) -> usize {
        match status {
            ApplicationStatus::Submitted => self.submitted,
            ApplicationStatus::HandledExternal => self.handled_external,
            ApplicationStatus::ButtonNotFound => self.button_not_found,
            ApplicationStatus::LoginFailed => self.login_failed,
            ApplicationStatus::Error => self.error,
        }
    }
}

impl fmt::Display for OutcomeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "submitted={} handled-external={} button-not-found={} login-failed={} error={} skipped={}",
            self.submitted,
            self.handled_external,
            self.button_not_found,
            self.login_failed,
            self.error,
            self.skipped
        )
    }
}
