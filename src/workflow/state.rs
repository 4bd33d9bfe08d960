//! 投递状态
//!
//! 每个状态由 `ApplyFlow` 中对应的处理函数推进到下一个状态

use crate::models::ApplicationStatus;
use crate::services::{classify, SiteKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyState {
    /// 平台登录
    Authenticate,
    /// 登录校验
    Verify,
    /// 打开职位链接并识别站点
    Navigate,
    /// 查找并点击投递按钮
    FindApply,
    /// 上传简历
    Attach,
    /// 填写表单
    Populate,
    /// 提交
    Submit,
    /// 终态
    Done(ApplicationStatus),
}

impl ApplyState {
    /// 起始状态：平台链接先登录，其他链接直接打开
    pub fn initial(job_link: &str, platform_domain: &str) -> Self {
        match classify(job_link, platform_domain) {
            SiteKind::Platform => ApplyState::Authenticate,
            SiteKind::External => ApplyState::Navigate,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, ApplyState::Done(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_depends_on_link() {
        assert_eq!(
            ApplyState::initial("https://www.linkedin.com/jobs/view/1", "linkedin.com"),
            ApplyState::Authenticate
        );
        assert_eq!(
            ApplyState::initial("https://jobs.lever.co/acme/1", "linkedin.com"),
            ApplyState::Navigate
        );
        assert!(ApplyState::Done(ApplicationStatus::Submitted).is_terminal());
    }
}
