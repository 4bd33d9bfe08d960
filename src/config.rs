use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{AppError, AppResult, ConfigError};

/// 默认配置文件路径（可通过 AUTO_APPLY_CONFIG 覆盖）
pub const DEFAULT_CONFIG_FILE: &str = "auto_apply.toml";

/// 登录凭据
///
/// 不提供任何字面量默认值，`Debug` 输出时隐藏密码
#[derive(Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// 邮箱和密码是否都已配置
    pub fn is_complete(&self) -> bool {
        !self.email.is_empty() && !self.password.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

/// 程序配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 同时处理的职位数量上限
    pub max_concurrent_jobs: usize,
    // --- 平台配置 ---
    /// 平台域名（用于站点识别）
    pub platform_domain: String,
    /// 平台登录页
    pub platform_login_url: String,
    pub platform_credentials: Credentials,
    /// 跳转到外部站点时尝试使用的凭据
    pub external_credentials: Credentials,
    // --- 数据源配置 ---
    pub supabase_url: String,
    pub supabase_key: String,
    /// 定制简历所在的存储桶
    pub resume_bucket: String,
    /// 未配置 Supabase 时使用的本地职位文件
    pub jobs_file: String,
    /// 未配置 Supabase 时使用的本地简历目录
    pub resume_dir: String,
    // --- 输出配置 ---
    /// 调试截图目录
    pub screenshot_dir: String,
    /// 结果报告文件
    pub report_file: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- 浏览器配置 ---
    pub headless: bool,
    pub chrome_executable: Option<String>,
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// 单次元素等待上限（秒）
    pub element_wait_secs: u64,
    /// 文件上传控件等待上限（秒）
    pub file_input_wait_secs: u64,
    /// 点击/登录后的页面稳定等待（毫秒）
    pub settle_delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_concurrent_jobs: 5,
            platform_domain: "linkedin.com".to_string(),
            platform_login_url: "https://www.linkedin.com/login".to_string(),
            platform_credentials: Credentials::default(),
            external_credentials: Credentials::default(),
            supabase_url: String::new(),
            supabase_key: String::new(),
            resume_bucket: "customizedresumes".to_string(),
            jobs_file: "jobs.toml".to_string(),
            resume_dir: "resumes".to_string(),
            screenshot_dir: "debug_screenshots".to_string(),
            report_file: "apply_report.txt".to_string(),
            verbose_logging: false,
            headless: true,
            chrome_executable: None,
            viewport_width: 1920,
            viewport_height: 1080,
            element_wait_secs: 10,
            file_input_wait_secs: 10,
            settle_delay_ms: 2000,
        }
    }
}

impl Config {
    /// 加载配置：默认值 → 配置文件（如存在）→ 环境变量
    pub fn load() -> AppResult<Self> {
        let path =
            std::env::var("AUTO_APPLY_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        let base = if Path::new(&path).exists() {
            Self::from_file(&path)?
        } else {
            Self::default()
        };
        let config = base.with_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// 从 TOML 文件读取配置，缺省字段使用默认值
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content, path)
    }

    pub fn from_toml_str(content: &str, path: &str) -> AppResult<Self> {
        toml::from_str(content).map_err(|source| {
            AppError::Config(ConfigError::FileParseFailed {
                path: path.to_string(),
                source,
            })
        })
    }

    /// 只从环境变量读取（其余使用默认值）
    pub fn from_env() -> AppResult<Self> {
        Self::default().with_env_overrides()
    }

    /// 用环境变量覆盖已有配置
    pub fn with_env_overrides(self) -> AppResult<Self> {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        parse_into(&lookup, "MAX_CONCURRENT_JOBS", &mut self.max_concurrent_jobs)?;
        string_into(&lookup, "PLATFORM_DOMAIN", &mut self.platform_domain);
        string_into(&lookup, "PLATFORM_LOGIN_URL", &mut self.platform_login_url);
        string_into(&lookup, "PLATFORM_EMAIL", &mut self.platform_credentials.email);
        string_into(&lookup, "PLATFORM_PASSWORD", &mut self.platform_credentials.password);
        string_into(&lookup, "EXTERNAL_EMAIL", &mut self.external_credentials.email);
        string_into(&lookup, "EXTERNAL_PASSWORD", &mut self.external_credentials.password);
        string_into(&lookup, "SUPABASE_URL", &mut self.supabase_url);
        string_into(&lookup, "SUPABASE_KEY", &mut self.supabase_key);
        string_into(&lookup, "RESUME_BUCKET", &mut self.resume_bucket);
        string_into(&lookup, "JOBS_FILE", &mut self.jobs_file);
        string_into(&lookup, "RESUME_DIR", &mut self.resume_dir);
        string_into(&lookup, "SCREENSHOT_DIR", &mut self.screenshot_dir);
        string_into(&lookup, "REPORT_FILE", &mut self.report_file);
        parse_into(&lookup, "VERBOSE_LOGGING", &mut self.verbose_logging)?;
        parse_into(&lookup, "HEADLESS", &mut self.headless)?;
        if let Some(path) = lookup("CHROME_EXECUTABLE") {
            self.chrome_executable = Some(path);
        }
        parse_into(&lookup, "VIEWPORT_WIDTH", &mut self.viewport_width)?;
        parse_into(&lookup, "VIEWPORT_HEIGHT", &mut self.viewport_height)?;
        parse_into(&lookup, "ELEMENT_WAIT_SECS", &mut self.element_wait_secs)?;
        parse_into(&lookup, "FILE_INPUT_WAIT_SECS", &mut self.file_input_wait_secs)?;
        parse_into(&lookup, "SETTLE_DELAY_MS", &mut self.settle_delay_ms)?;
        Ok(self)
    }

    /// 校验配置
    pub fn validate(&self) -> AppResult<()> {
        if self.max_concurrent_jobs == 0 {
            return Err(AppError::invalid_config(
                "max_concurrent_jobs",
                "并发数必须大于 0",
            ));
        }
        if self.element_wait_secs == 0 {
            return Err(AppError::invalid_config(
                "element_wait_secs",
                "元素等待时间必须大于 0",
            ));
        }
        if self.viewport_width == 0 || self.viewport_height == 0 {
            return Err(AppError::invalid_config("viewport", "视口尺寸不能为 0"));
        }
        Ok(())
    }

    /// 是否配置了 Supabase 数据源
    pub fn uses_supabase(&self) -> bool {
        !self.supabase_url.is_empty() && !self.supabase_key.is_empty()
    }

    pub fn element_wait(&self) -> Duration {
        Duration::from_secs(self.element_wait_secs)
    }

    pub fn file_input_wait(&self) -> Duration {
        Duration::from_secs(self.file_input_wait_secs)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

fn string_into(lookup: &impl Fn(&str) -> Option<String>, name: &str, target: &mut String) {
    if let Some(value) = lookup(name) {
        *target = value;
    }
}

fn parse_into<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    target: &mut T,
) -> AppResult<()> {
    if let Some(value) = lookup(name) {
        *target = value.trim().parse().map_err(|_| {
            AppError::Config(ConfigError::EnvVarParseFailed {
                var_name: name.to_string(),
                value: value.clone(),
                expected_type: std::any::type_name::<T>().to_string(),
            })
        })?;
    }
    Ok(())
}
