use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 浏览器相关错误
    #[error("浏览器错误: {0}")]
    Browser(#[from] BrowserError),
    /// 外部存储（职位表 / 简历文件）错误
    #[error("存储错误: {0}")]
    Store(#[from] StoreError),
    /// 简历文档解析错误
    #[error("文档错误: {0}")]
    Document(#[from] DocumentError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 文件读写错误
    #[error("文件错误: {0}")]
    Io(#[from] std::io::Error),
    /// JSON 解析失败
    #[error("JSON解析失败: {0}")]
    Json(#[from] serde_json::Error),
    /// 其他错误
    #[error("错误: {0}")]
    Other(String),
}

/// 浏览器相关错误
#[derive(Debug, Error)]
pub enum BrowserError {
    /// 启动浏览器失败
    #[error("启动浏览器失败: {0}")]
    LaunchFailed(String),
    /// 浏览器配置失败
    #[error("浏览器配置失败: {0}")]
    ConfigurationFailed(String),
    /// 导航失败
    #[error("导航到 {url} 失败: {reason}")]
    NavigationFailed { url: String, reason: String },
    /// 页面停留在非网页地址（about:blank / chrome-error:// 等）
    #[error("页面未加载到有效地址: {location}")]
    NoDocument { location: String },
    /// 元素引用已失效
    #[error("元素引用已失效: {reference}")]
    StaleElement { reference: String },
    /// CDP 协议调用失败
    #[error("CDP 调用失败: {0}")]
    Cdp(#[from] chromiumoxide::error::CdpError),
}

/// 外部存储错误
#[derive(Debug, Error)]
pub enum StoreError {
    /// 网络请求失败
    #[error("请求失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// 返回非成功状态码
    #[error("返回错误响应 ({endpoint}): status={status}")]
    BadResponse { endpoint: String, status: u16 },
    /// 对象不存在
    #[error("对象不存在: {key}")]
    NotFound { key: String },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// 简历文档解析错误
#[derive(Debug, Error)]
pub enum DocumentError {
    /// docx 压缩包无法读取
    #[error("无法读取 docx ({path}): {source}")]
    Archive {
        path: String,
        #[source]
        source: zip::result::ZipError,
    },
    /// 正则构造失败
    #[error("正则表达式错误: {0}")]
    Pattern(#[from] regex::Error),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 配置文件解析失败
    #[error("配置文件 {path} 解析失败: {source}")]
    FileParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// 配置值非法
    #[error("配置项 {field} 非法: {reason}")]
    Invalid { field: String, reason: String },
}

impl From<chromiumoxide::error::CdpError> for AppError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        AppError::Browser(BrowserError::Cdp(err))
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建导航失败错误
    pub fn navigation_failed(url: impl Into<String>, reason: impl ToString) -> Self {
        AppError::Browser(BrowserError::NavigationFailed {
            url: url.into(),
            reason: reason.to_string(),
        })
    }

    /// 创建配置非法错误
    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        AppError::Config(ConfigError::Invalid {
            field: field.into(),
            reason: reason.into(),
        })
    }
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_carries_context() {
        let err = AppError::navigation_failed("https://example.com", "timeout");
        assert_eq!(
            err.to_string(),
            "浏览器错误: 导航到 https://example.com 失败: timeout"
        );

        let err: AppError = StoreError::NotFound {
            key: "enhanced_1_2.docx".to_string(),
        }
        .into();
        assert!(err.to_string().contains("enhanced_1_2.docx"));
    }
}
