//! 外部站点处理 - 流程层
//!
//! 尽力而为：填邮箱密码、点登录，登录按钮不可用时尝试注册入口。
//! 不校验结果，调用方无论如何都记为 handled-external

use std::fmt;
use std::time::Duration;

use tracing::{debug, info};

use crate::config::Credentials;
use crate::infrastructure::{MatchMode, PageDriver};
use crate::services::locator;
use crate::workflow::apply_ctx::ApplyCtx;
use crate::workflow::apply_flow::press;

/// 外部站点上实际完成了哪些动作
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExternalProgress {
    pub email_filled: bool,
    pub password_filled: bool,
    pub login_clicked: bool,
    pub create_account_clicked: bool,
}

impl fmt::Display for ExternalProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = |done: bool| if done { "✓" } else { "✗" };
        write!(
            f,
            "external: email {} password {} login {} create-account {}",
            mark(self.email_filled),
            mark(self.password_filled),
            mark(self.login_clicked),
            mark(self.create_account_clicked)
        )
    }
}

pub async fn run_external(
    page: &dyn PageDriver,
    ctx: &ApplyCtx,
    credentials: &Credentials,
    settle: Duration,
) -> ExternalProgress {
    let mut progress = ExternalProgress::default();

    if credentials.is_complete() {
        progress.email_filled = fill_first(
            page,
            locator::EXTERNAL_EMAIL,
            &credentials.email,
        )
        .await;
        progress.password_filled = fill_first(
            page,
            locator::EXTERNAL_PASSWORD,
            &credentials.password,
        )
        .await;
    } else {
        info!("{} 未配置外部站点凭据，跳过登录表单", ctx);
    }

    progress.login_clicked = press_first(page, locator::EXTERNAL_LOGIN_BUTTON).await;
    if progress.login_clicked {
        info!("{} 已点击外部站点登录按钮", ctx);
        tokio::time::sleep(settle).await;
    } else {
        progress.create_account_clicked =
            press_first(page, locator::EXTERNAL_CREATE_ACCOUNT).await;
        if progress.create_account_clicked {
            info!("{} 已点击外部站点注册入口", ctx);
            tokio::time::sleep(settle).await;
        }
    }

    info!("{} 🌐 外部站点处理结束 ({})", ctx, progress);
    progress
}

async fn fill_first(page: &dyn PageDriver, role: &str, value: &str) -> bool {
    let Some(element) =
        locator::locate(page, role, locator::strategies(role), MatchMode::Interactable).await
    else {
        return false;
    };
    match page.fill(&element, value).await {
        Ok(()) => true,
        Err(e) => {
            debug!("填写 {} 失败: {}", role, e);
            false
        }
    }
}

async fn press_first(page: &dyn PageDriver, role: &str) -> bool {
    match locator::locate(page, role, locator::strategies(role), MatchMode::Interactable).await {
        Some(element) => press(page, role, &element).await,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::fake_page::FakePage;
    use crate::models::Job;

    fn ctx() -> ApplyCtx {
        let job = Job {
            id: "9".to_string(),
            job_link: "https://careers.acme.io/9".to_string(),
            resume_id: "r".to_string(),
            company: "Acme".to_string(),
            title: "Engineer".to_string(),
            user_id: "u".to_string(),
        };
        ApplyCtx::new(job, 1, "/tmp/resume.docx")
    }

    fn first(role: &str) -> &'static str {
        locator::strategies(role)[0].expr.as_ref()
    }

    #[tokio::test(start_paused = true)]
    async fn test_login_form_is_filled_and_submitted() {
        let page = FakePage::new()
            .with_element(first(locator::EXTERNAL_EMAIL))
            .with_element(first(locator::EXTERNAL_PASSWORD))
            .with_element(first(locator::EXTERNAL_LOGIN_BUTTON))
            .with_element(first(locator::EXTERNAL_CREATE_ACCOUNT));
        let creds = Credentials::new("ext@example.com", "pw");

        let progress = run_external(&page, &ctx(), &creds, Duration::from_secs(2)).await;

        assert!(progress.email_filled && progress.password_filled && progress.login_clicked);
        assert!(!progress.create_account_clicked);
        let state = page.state();
        assert_eq!(state.fills.len(), 2);
        assert_eq!(state.fills[0].1, "ext@example.com");
    }

    #[tokio::test(start_paused = true)]
    async fn test_login_button_falls_back_to_pointer_click() {
        let login = first(locator::EXTERNAL_LOGIN_BUTTON);
        let page = FakePage::new()
            .with_element(login)
            .with_failing_activation(login)
            .with_element(first(locator::EXTERNAL_CREATE_ACCOUNT));

        let progress = run_external(&page, &ctx(), &Credentials::default(), Duration::ZERO).await;

        assert!(progress.login_clicked);
        assert!(!progress.create_account_clicked);
        assert_eq!(page.state().pointer_clicks, vec![login.to_string()]);
        assert!(!progress.email_filled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_account_when_no_login_button() {
        let page = FakePage::new().with_element(first(locator::EXTERNAL_CREATE_ACCOUNT));

        let progress = run_external(&page, &ctx(), &Credentials::default(), Duration::ZERO).await;

        assert!(!progress.login_clicked);
        assert!(progress.create_account_clicked);
    }
}
