//! 站点识别 - 业务能力层
//!
//! 判断当前页面是否仍在平台上，以及平台上是否已登录

use std::time::Duration;

use url::Url;

use crate::infrastructure::{MatchMode, PageDriver};
use crate::services::locator;

/// 页面所属站点
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteKind {
    /// 已知的招聘平台
    Platform,
    /// 平台以外的任意站点
    External,
}

/// 根据地址判断站点类型
///
/// 主机名等于平台域名或是其子域名时为平台；无法解析的地址视为外部站点
pub fn classify(location: &str, platform_domain: &str) -> SiteKind {
    let domain = platform_domain.trim().trim_start_matches('.').to_ascii_lowercase();
    let host = Url::parse(location.trim())
        .ok()
        .and_then(|url| url.host_str().map(str::to_ascii_lowercase));

    match host {
        Some(host) if !domain.is_empty() && matches_domain(&host, &domain) => SiteKind::Platform,
        _ => SiteKind::External,
    }
}

fn matches_domain(host: &str, domain: &str) -> bool {
    host == domain
        || host
            .strip_suffix(domain)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

/// 地址是否是可以继续操作的网页（http / https）
pub fn is_web_location(location: &str) -> bool {
    Url::parse(location.trim())
        .map(|url| matches!(url.scheme(), "http" | "https"))
        .unwrap_or(false)
}

/// 登录校验：等待上限内任一"仅登录后可见"的元素出现即视为已登录
pub async fn is_logged_in(page: &dyn PageDriver, wait: Duration, poll: Duration) -> bool {
    locator::wait_for(
        page,
        "logged-in marker",
        locator::strategies(locator::LOGGED_IN_MARKER),
        MatchMode::Interactable,
        wait,
        poll,
    )
    .await
    .is_some()
}
