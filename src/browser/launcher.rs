use std::path::PathBuf;

use async_trait::async_trait;
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::{Browser, BrowserConfig};
use futures::StreamExt;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::browser::session::ChromeSession;
use crate::config::Config;
use crate::error::{AppResult, BrowserError};
use crate::infrastructure::{JsExecutor, PageDriver, SessionFactory};

/// 无人值守运行所需的启动参数
const UNATTENDED_ARGS: [&str; 7] = [
    "--disable-notifications",
    "--disable-popup-blocking",
    "--disable-infobars",
    "--disable-extensions",
    "--no-sandbox",
    "--disable-dev-shm-usage",
    "--disable-blink-features=AutomationControlled",
];

/// 浏览器启动参数
#[derive(Debug, Clone)]
pub struct LaunchSettings {
    pub headless: bool,
    pub chrome_executable: Option<PathBuf>,
    pub viewport_width: u32,
    pub viewport_height: u32,
}

impl LaunchSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            headless: config.headless,
            chrome_executable: config.chrome_executable.as_ref().map(PathBuf::from),
            viewport_width: config.viewport_width,
            viewport_height: config.viewport_height,
        }
    }
}

/// 启动一个独立的浏览器会话
///
/// 每次启动使用独立的临时用户目录，cookie 不会在并发任务间共享
pub async fn launch_session(settings: &LaunchSettings, run_id: &str) -> AppResult<ChromeSession> {
    info!("🚀 [{}] 启动浏览器...", run_id);

    let profile_dir = tempfile::Builder::new()
        .prefix("auto_apply_profile_")
        .tempdir()?;

    let mut builder = BrowserConfig::builder()
        .user_data_dir(profile_dir.path())
        .window_size(settings.viewport_width, settings.viewport_height)
        .viewport(Viewport {
            width: settings.viewport_width,
            height: settings.viewport_height,
            ..Viewport::default()
        })
        .args(UNATTENDED_ARGS.to_vec());

    builder = if settings.headless {
        builder.new_headless_mode()
    } else {
        builder.with_head()
    };

    if let Some(path) = &settings.chrome_executable {
        builder = builder.chrome_executable(path);
    }

    let config = builder.build().map_err(|e| {
        error!("[{}] 配置浏览器失败: {}", run_id, e);
        BrowserError::ConfigurationFailed(e)
    })?;

    let (mut browser, mut handler) = Browser::launch(config).await.map_err(|e| {
        error!("[{}] 启动浏览器失败: {}", run_id, e);
        BrowserError::LaunchFailed(e.to_string())
    })?;
    debug!("[{}] 浏览器启动成功", run_id);

    // 在后台处理浏览器事件
    let handler_task = tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    // 添加短暂延迟以等待浏览器状态同步
    sleep(tokio::time::Duration::from_millis(300)).await;

    let page = match browser.new_page("about:blank").await {
        Ok(page) => page,
        Err(e) => {
            error!("[{}] 创建页面失败: {}", run_id, e);
            let _ = browser.close().await;
            let _ = browser.wait().await;
            handler_task.abort();
            return Err(BrowserError::LaunchFailed(e.to_string()).into());
        }
    };

    Ok(ChromeSession::new(
        browser,
        JsExecutor::new(page),
        handler_task,
        profile_dir,
    ))
}

/// 基于 chromiumoxide 的会话工厂
pub struct ChromeLauncher {
    settings: LaunchSettings,
}

impl ChromeLauncher {
    pub fn new(settings: LaunchSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl SessionFactory for ChromeLauncher {
    async fn open(&self, run_id: &str) -> AppResult<Box<dyn PageDriver>> {
        let session = launch_session(&self.settings, run_id).await?;
        Ok(Box::new(session))
    }
}
