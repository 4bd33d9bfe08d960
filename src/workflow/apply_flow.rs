//! 职位投递流程 - 流程层
//!
//! 核心职责：定义"一个职位"的完整投递流程
//!
//! 状态顺序：
//! 1. Authenticate → Verify（仅平台链接）
//! 2. Navigate → 站点识别，外部站点交给 external_flow
//! 3. FindApply → Attach → Populate → Submit
//!
//! 会话在任何出口（正常结束、提前结束、panic）都只关闭一次

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tracing::{debug, error, info, warn};

use crate::config::{Config, Credentials};
use crate::error::{AppResult, BrowserError};
use crate::infrastructure::{ElementRef, MatchMode, PageDriver, SessionFactory};
use crate::models::{ApplicationOutcome, ApplicationStatus, ResumeProfile};
use crate::services::site_classifier::{is_logged_in, is_web_location};
use crate::services::{classify, extract_profile, locator, DiagnosticSink, DocumentReader, SiteKind};
use crate::workflow::apply_ctx::ApplyCtx;
use crate::workflow::external_flow::run_external;
use crate::workflow::state::ApplyState;

/// 流程参数（从 Config 中取出的只读部分）
#[derive(Debug, Clone)]
pub struct FlowSettings {
    pub platform_domain: String,
    pub platform_login_url: String,
    pub platform_credentials: Credentials,
    pub external_credentials: Credentials,
    pub element_wait: Duration,
    pub file_input_wait: Duration,
    pub settle_delay: Duration,
    /// 等待元素时的轮询间隔
    pub poll_interval: Duration,
}

impl FlowSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            platform_domain: config.platform_domain.clone(),
            platform_login_url: config.platform_login_url.clone(),
            platform_credentials: config.platform_credentials.clone(),
            external_credentials: config.external_credentials.clone(),
            element_wait: config.element_wait(),
            file_input_wait: config.file_input_wait(),
            settle_delay: config.settle_delay(),
            poll_interval: Duration::from_millis(500),
        }
    }
}

/// 职位投递流程
///
/// - 每次 `run` 独占一个浏览器会话
/// - 不持有任何会话，可以被多个任务共享
/// - 所有错误都在这里转换成 `ApplicationOutcome`
pub struct ApplyFlow {
    settings: FlowSettings,
    diagnostics: Arc<dyn DiagnosticSink>,
    documents: Arc<dyn DocumentReader>,
}

impl ApplyFlow {
    pub fn new(
        settings: FlowSettings,
        diagnostics: Arc<dyn DiagnosticSink>,
        documents: Arc<dyn DocumentReader>,
    ) -> Self {
        Self {
            settings,
            diagnostics,
            documents,
        }
    }

    pub fn settings(&self) -> &FlowSettings {
        &self.settings
    }

    /// 完整处理一个职位，总是返回一个结果
    pub async fn run(&self, factory: &dyn SessionFactory, ctx: &mut ApplyCtx) -> ApplicationOutcome {
        info!("{} 🚀 开始投递: {}", ctx, ctx.job);

        let mut page = match factory.open(&ctx.run_id).await {
            Ok(page) => page,
            Err(e) => {
                error!("{} ❌ 无法打开浏览器会话: {}", ctx, e);
                return ApplicationOutcome::new(ctx.job.id.clone(), ApplicationStatus::Error)
                    .with_detail(e.to_string());
            }
        };

        let driven = AssertUnwindSafe(self.drive(page.as_ref(), ctx))
            .catch_unwind()
            .await;

        let outcome = match driven {
            Ok(Ok(status)) => self.outcome(ctx, status),
            Ok(Err(e)) => {
                error!("{} ❌ 投递过程中发生错误: {}", ctx, e);
                self.fault(page.as_ref(), ctx, e.to_string()).await
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                error!("{} ❌ 投递过程中发生异常: {}", ctx, message);
                self.fault(page.as_ref(), ctx, message).await
            }
        };

        if let Err(e) = page.close().await {
            warn!("{} ⚠️ 关闭浏览器会话失败: {}", ctx, e);
        }

        info!("{} 🏁 {}", ctx, outcome);
        outcome
    }

    async fn drive(&self, page: &dyn PageDriver, ctx: &mut ApplyCtx) -> AppResult<ApplicationStatus> {
        let mut state = ApplyState::initial(&ctx.job.job_link, &self.settings.platform_domain);
        loop {
            debug!("{} 状态: {:?}", ctx, state);
            if let ApplyState::Done(status) = state {
                return Ok(status);
            }
            state = self.step(page, ctx, state).await?;
        }
    }

    /// 推进一个状态
    pub async fn step(
        &self,
        page: &dyn PageDriver,
        ctx: &mut ApplyCtx,
        state: ApplyState,
    ) -> AppResult<ApplyState> {
        match state {
            ApplyState::Authenticate => self.authenticate(page, ctx).await,
            ApplyState::Verify => self.verify(page, ctx).await,
            ApplyState::Navigate => self.navigate(page, ctx).await,
            ApplyState::FindApply => self.find_apply(page, ctx).await,
            ApplyState::Attach => self.attach(page, ctx).await,
            ApplyState::Populate => self.populate(page, ctx).await,
            ApplyState::Submit => self.submit(page, ctx).await,
            ApplyState::Done(status) => Ok(ApplyState::Done(status)),
        }
    }

    async fn authenticate(&self, page: &dyn PageDriver, ctx: &mut ApplyCtx) -> AppResult<ApplyState> {
        let settings = &self.settings;
        info!("{} 🔐 正在登录平台...", ctx);

        if !settings.platform_credentials.is_complete() {
            warn!("{} ⚠️ 未配置平台凭据，直接进行登录校验", ctx);
            return Ok(ApplyState::Verify);
        }

        if let Err(e) = page.goto(&settings.platform_login_url).await {
            warn!("{} ⚠️ 打开登录页失败: {}", ctx, e);
            return Ok(ApplyState::Verify);
        }

        let credentials = &settings.platform_credentials;
        if !self.fill_role(page, locator::LOGIN_USERNAME, &credentials.email).await {
            warn!("{} ⚠️ 未找到用户名输入框", ctx);
        }
        if !self.fill_role(page, locator::LOGIN_PASSWORD, &credentials.password).await {
            warn!("{} ⚠️ 未找到密码输入框", ctx);
        }

        match self
            .wait_role(page, locator::LOGIN_SUBMIT, MatchMode::Interactable, settings.element_wait)
            .await
        {
            Some(button) => {
                press(page, locator::LOGIN_SUBMIT, &button).await;
            }
            None => warn!("{} ⚠️ 未找到登录按钮", ctx),
        }

        tokio::time::sleep(settings.settle_delay).await;
        Ok(ApplyState::Verify)
    }

    async fn verify(&self, page: &dyn PageDriver, ctx: &mut ApplyCtx) -> AppResult<ApplyState> {
        if is_logged_in(page, self.settings.element_wait, self.settings.poll_interval).await {
            info!("{} ✓ 平台登录成功", ctx);
            return Ok(ApplyState::Navigate);
        }

        warn!("{} ⚠️ 登录校验失败，放弃该职位", ctx);
        self.capture(page, ctx, "login_failed").await;
        Ok(ApplyState::Done(ApplicationStatus::LoginFailed))
    }

    async fn navigate(&self, page: &dyn PageDriver, ctx: &mut ApplyCtx) -> AppResult<ApplyState> {
        info!("{} 🌍 打开职位链接: {}", ctx, ctx.job.job_link);
        if let Err(e) = page.goto(&ctx.job.job_link).await {
            warn!("{} ⚠️ 导航出错，按实际地址继续: {}", ctx, e);
        }
        tokio::time::sleep(self.settings.settle_delay).await;

        let location = page.current_url().await?;
        if !is_web_location(&location) {
            return Err(BrowserError::NoDocument { location }.into());
        }

        match classify(&location, &self.settings.platform_domain) {
            SiteKind::Platform => Ok(ApplyState::FindApply),
            SiteKind::External => {
                info!("{} ↪️ 跳转到外部站点: {}", ctx, location);
                self.capture(page, ctx, "external").await;
                let progress = run_external(
                    page,
                    ctx,
                    &self.settings.external_credentials,
                    self.settings.settle_delay,
                )
                .await;
                ctx.detail = Some(progress.to_string());
                Ok(ApplyState::Done(ApplicationStatus::HandledExternal))
            }
        }
    }

    async fn find_apply(&self, page: &dyn PageDriver, ctx: &mut ApplyCtx) -> AppResult<ApplyState> {
        self.capture(page, ctx, "before_apply").await;
        info!("{} 🔍 正在查找投递按钮...", ctx);

        let Some(button) = self
            .wait_role(page, locator::APPLY_BUTTON, MatchMode::Interactable, self.settings.element_wait)
            .await
        else {
            warn!("{} ⚠️ 未找到投递按钮", ctx);
            self.capture(page, ctx, "button_not_found").await;
            return Ok(ApplyState::Done(ApplicationStatus::ButtonNotFound));
        };

        if press(page, locator::APPLY_BUTTON, &button).await {
            info!("{} ✓ 已点击投递按钮", ctx);
        } else {
            warn!("{} ⚠️ 投递按钮点击失败，继续后续步骤", ctx);
        }

        tokio::time::sleep(self.settings.settle_delay).await;
        self.capture(page, ctx, "after_apply").await;
        Ok(ApplyState::Attach)
    }

    async fn attach(&self, page: &dyn PageDriver, ctx: &mut ApplyCtx) -> AppResult<ApplyState> {
        match self
            .wait_role(page, locator::FILE_INPUT, MatchMode::Present, self.settings.file_input_wait)
            .await
        {
            Some(input) => match page.attach_file(&input, &ctx.resume_path).await {
                Ok(()) => {
                    info!("{} 📎 简历已上传", ctx);
                    tokio::time::sleep(self.settings.settle_delay).await;
                }
                Err(e) => warn!("{} ⚠️ 简历上传失败: {}", ctx, e),
            },
            None => info!("{} 页面没有文件上传控件", ctx),
        }
        Ok(ApplyState::Populate)
    }

    async fn populate(&self, page: &dyn PageDriver, ctx: &mut ApplyCtx) -> AppResult<ApplyState> {
        if ctx.profile.is_none() {
            ctx.profile = Some(self.load_profile(ctx).await);
        }
        let profile = ctx.profile.clone().unwrap_or_default();

        let mut filled = 0;
        for (field, value) in profile.form_fields(&ctx.job.company, &ctx.job.title) {
            if value.is_empty() {
                continue;
            }
            let queries = locator::field_strategies(field);
            let Some(input) = locator::locate(page, field, &queries, MatchMode::Interactable).await
            else {
                debug!("{} 未找到字段 {}", ctx, field);
                continue;
            };
            match page.fill(&input, value).await {
                Ok(()) => {
                    filled += 1;
                    debug!("{} 已填写 {}", ctx, field);
                }
                Err(e) => debug!("{} 填写 {} 失败: {}", ctx, field, e),
            }
        }

        info!("{} ✏️ 已填写 {} 个字段", ctx, filled);
        Ok(ApplyState::Submit)
    }

    async fn submit(&self, page: &dyn PageDriver, ctx: &mut ApplyCtx) -> AppResult<ApplyState> {
        match self
            .wait_role(page, locator::SUBMIT_BUTTON, MatchMode::Interactable, self.settings.element_wait)
            .await
        {
            Some(button) => {
                if press(page, locator::SUBMIT_BUTTON, &button).await {
                    info!("{} 📤 已提交申请", ctx);
                } else {
                    warn!("{} ⚠️ 提交按钮点击失败，需人工完成", ctx);
                    ctx.detail = Some("submit control activation failed".to_string());
                }
            }
            None => {
                warn!("{} ⚠️ 未找到提交按钮，需人工完成", ctx);
                ctx.detail = Some("submit control not found".to_string());
            }
        }
        Ok(ApplyState::Done(ApplicationStatus::Submitted))
    }

    // ========== 辅助函数 ==========

    /// 读取并解析简历，文件和 zip 读取放到阻塞线程池
    async fn load_profile(&self, ctx: &ApplyCtx) -> ResumeProfile {
        let documents = self.documents.clone();
        let path = ctx.resume_path.clone();
        let read = tokio::task::spawn_blocking(move || documents.paragraphs(&path)).await;

        match read {
            Ok(Ok(paragraphs)) => extract_profile(&paragraphs),
            Ok(Err(e)) => {
                warn!("{} ⚠️ 简历解析失败，只填写公司和职位: {}", ctx, e);
                ResumeProfile::default()
            }
            Err(e) => {
                warn!("{} ⚠️ 简历读取任务异常，只填写公司和职位: {}", ctx, e);
                ResumeProfile::default()
            }
        }
    }

    async fn wait_role(
        &self,
        page: &dyn PageDriver,
        role: &str,
        mode: MatchMode,
        timeout: Duration,
    ) -> Option<ElementRef> {
        locator::wait_for(
            page,
            role,
            locator::strategies(role),
            mode,
            timeout,
            self.settings.poll_interval,
        )
        .await
    }

    async fn fill_role(&self, page: &dyn PageDriver, role: &str, value: &str) -> bool {
        let Some(input) = self
            .wait_role(page, role, MatchMode::Interactable, self.settings.element_wait)
            .await
        else {
            return false;
        };
        match page.fill(&input, value).await {
            Ok(()) => true,
            Err(e) => {
                debug!("填写 {} 失败: {}", role, e);
                false
            }
        }
    }

    /// 截图并交给 DiagnosticSink，失败只记日志
    async fn capture(&self, page: &dyn PageDriver, ctx: &mut ApplyCtx, label: &str) -> Option<String> {
        let png = match page.screenshot().await {
            Ok(png) => png,
            Err(e) => {
                warn!("{} ⚠️ 截图失败: {}", ctx, e);
                return None;
            }
        };
        let shot = self
            .diagnostics
            .record(&ctx.run_id, &ctx.shot_label(label), &png)
            .await;
        if shot.is_some() {
            ctx.last_screenshot = shot.clone();
        }
        shot
    }

    fn outcome(&self, ctx: &ApplyCtx, status: ApplicationStatus) -> ApplicationOutcome {
        let outcome = ApplicationOutcome::new(ctx.job.id.clone(), status)
            .with_screenshot(ctx.last_screenshot.clone());
        match &ctx.detail {
            Some(detail) => outcome.with_detail(detail.clone()),
            None => outcome,
        }
    }

    async fn fault(&self, page: &dyn PageDriver, ctx: &mut ApplyCtx, message: String) -> ApplicationOutcome {
        let shot = self.capture(page, ctx, "error").await;
        ApplicationOutcome::new(ctx.job.id.clone(), ApplicationStatus::Error)
            .with_screenshot(shot)
            .with_detail(message)
    }
}

/// 滚动到元素并点击：先直接触发 click()，失败时改用鼠标点击
pub(crate) async fn press(page: &dyn PageDriver, what: &str, element: &ElementRef) -> bool {
    if let Err(e) = page.scroll_into_view(element).await {
        debug!("{} 滚动失败: {}", what, e);
    }
    match page.activate(element).await {
        Ok(()) => true,
        Err(e) => {
            debug!("{} 直接点击失败，改用鼠标点击: {}", what, e);
            match page.pointer_click(element).await {
                Ok(()) => true,
                Err(e) => {
                    debug!("{} 鼠标点击失败: {}", what, e);
                    false
                }
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
