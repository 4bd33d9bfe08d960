//! 投递上下文
//!
//! 封装"我正在处理第几个职位、用哪份简历"这一信息

use std::fmt::Display;
use std::path::PathBuf;

use crate::models::{Job, ResumeProfile};

/// 单次投递的上下文
///
/// 由编排层创建，只在一次运行内使用
#[derive(Debug, Clone)]
pub struct ApplyCtx {
    pub job: Job,

    /// 职位序号（从1开始，仅用于日志显示）
    pub index: usize,

    /// 会话标识，形如 `job-<id>`
    pub run_id: String,

    /// 本地简历文件路径
    pub resume_path: PathBuf,

    /// 已提取的简历字段（每次运行最多提取一次）
    pub profile: Option<ResumeProfile>,

    /// 最近一次截图
    pub last_screenshot: Option<String>,

    /// 附加说明，随结果一起上报
    pub detail: Option<String>,
}

impl ApplyCtx {
    pub fn new(job: Job, index: usize, resume_path: impl Into<PathBuf>) -> Self {
        let run_id = format!("job-{}", job.id);
        Self {
            job,
            index,
            run_id,
            resume_path: resume_path.into(),
            profile: None,
            last_screenshot: None,
            detail: None,
        }
    }

    /// 截图标签：`<label>_<company>_<title>`
    pub fn shot_label(&self, label: &str) -> String {
        format!("{}_{}_{}", label, self.job.company, self.job.title)
    }
}

impl Display for ApplyCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[职位 {}]", self.index)
    }
}
