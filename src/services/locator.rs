//! 元素定位 - 业务能力层
//!
//! 按语义角色查表得到有序查询列表，依次尝试，第一个命中即返回。
//! 查询表只读，所有并发任务共享

use std::time::Duration;

use phf::phf_map;
use tokio::time::Instant;
use tracing::debug;

use crate::infrastructure::{ElementRef, MatchMode, PageDriver, Query};

pub const APPLY_BUTTON: &str = "apply_button";
pub const SUBMIT_BUTTON: &str = "submit_button";
pub const LOGIN_USERNAME: &str = "login_username";
pub const LOGIN_PASSWORD: &str = "login_password";
pub const LOGIN_SUBMIT: &str = "login_submit";
pub const LOGGED_IN_MARKER: &str = "logged_in_marker";
pub const FILE_INPUT: &str = "file_input";
pub const EXTERNAL_EMAIL: &str = "external_email";
pub const EXTERNAL_PASSWORD: &str = "external_password";
pub const EXTERNAL_LOGIN_BUTTON: &str = "external_login_button";
pub const EXTERNAL_CREATE_ACCOUNT: &str = "external_create_account";

// 投递按钮：主按钮 class → "Easy Apply" → "Apply" → 嵌套按钮
const APPLY_BUTTON_QUERIES: &[Query] = &[
    Query::xpath("//button[contains(@class, 'jobs-apply-button')]"),
    Query::xpath("//button[contains(., 'Easy Apply')]"),
    Query::xpath("//button[contains(., 'Apply')]"),
    Query::xpath("//div[contains(@class, 'jobs-apply-button')]//button"),
];

const SUBMIT_BUTTON_QUERIES: &[Query] = &[
    Query::xpath(
        "//button[contains(translate(., 'ABCDEFGHIJKLMNOPQRSTUVWXYZ', 'abcdefghijklmnopqrstuvwxyz'), 'submit')]",
    ),
    Query::xpath("//button[@type='submit']"),
    Query::xpath("//input[@type='submit']"),
];

const LOGIN_USERNAME_QUERIES: &[Query] = &[
    Query::css("#username"),
    Query::css("input[name='session_key']"),
    Query::css("input[type='email']"),
];

const LOGIN_PASSWORD_QUERIES: &[Query] = &[
    Query::css("#password"),
    Query::css("input[name='session_password']"),
    Query::css("input[type='password']"),
];

const LOGIN_SUBMIT_QUERIES: &[Query] = &[
    Query::css("button[type='submit']"),
    Query::xpath("//button[contains(., 'Sign in')]"),
];

const LOGGED_IN_MARKER_QUERIES: &[Query] = &[
    Query::xpath("//div[contains(@class, 'global-nav__me-photo')]"),
    Query::xpath("//div[contains(@class, 'global-nav__me-menu')]"),
    Query::xpath("//div[contains(@class, 'global-nav__me')]"),
];

const FILE_INPUT_QUERIES: &[Query] = &[Query::xpath("//input[@type='file']")];

const EXTERNAL_EMAIL_QUERIES: &[Query] = &[
    Query::xpath("//input[@type='email']"),
    Query::xpath("//input[@name='email']"),
    Query::xpath("//input[@id='email']"),
    Query::xpath("//input[contains(@placeholder, 'Email')]"),
    Query::xpath("//input[contains(@placeholder, 'email')]"),
    Query::xpath("//input[contains(@class, 'email')]"),
];

const EXTERNAL_PASSWORD_QUERIES: &[Query] = &[
    Query::xpath("//input[@type='password']"),
    Query::xpath("//input[@name='password']"),
    Query::xpath("//input[@id='password']"),
    Query::xpath("//input[contains(@placeholder, 'Password')]"),
    Query::xpath("//input[contains(@placeholder, 'password')]"),
    Query::xpath("//input[contains(@class, 'password')]"),
];

const EXTERNAL_LOGIN_BUTTON_QUERIES: &[Query] = &[
    Query::xpath("//button[contains(., 'Login')]"),
    Query::xpath("//button[contains(., 'Sign in')]"),
    Query::xpath("//button[@type='submit']"),
    Query::xpath("//input[@type='submit']"),
    Query::xpath("//button[contains(@class, 'login')]"),
    Query::xpath("//button[contains(@class, 'signin')]"),
];

const EXTERNAL_CREATE_ACCOUNT_QUERIES: &[Query] = &[
    Query::xpath("//a[contains(., 'Create Account')]"),
    Query::xpath("//a[contains(., 'Sign up')]"),
    Query::xpath("//button[contains(., 'Create Account')]"),
    Query::xpath("//button[contains(., 'Sign up')]"),
];

/// 语义角色 → 有序查询列表
static STRATEGIES: phf::Map<&'static str, &'static [Query]> = phf_map! {
    "apply_button" => APPLY_BUTTON_QUERIES,
    "submit_button" => SUBMIT_BUTTON_QUERIES,
    "login_username" => LOGIN_USERNAME_QUERIES,
    "login_password" => LOGIN_PASSWORD_QUERIES,
    "login_submit" => LOGIN_SUBMIT_QUERIES,
    "logged_in_marker" => LOGGED_IN_MARKER_QUERIES,
    "file_input" => FILE_INPUT_QUERIES,
    "external_email" => EXTERNAL_EMAIL_QUERIES,
    "external_password" => EXTERNAL_PASSWORD_QUERIES,
    "external_login_button" => EXTERNAL_LOGIN_BUTTON_QUERIES,
    "external_create_account" => EXTERNAL_CREATE_ACCOUNT_QUERIES,
};

// 表单字段模板，{} 替换为小写字段名
const FIELD_CSS_TEMPLATES: [&str; 4] = [
    "input[placeholder*='{}' i]",
    "input[name*='{}' i]",
    "textarea[placeholder*='{}' i]",
    "textarea[name*='{}' i]",
];

const FIELD_XPATH_TEMPLATES: [&str; 2] = [
    "//label[contains(translate(., 'ABCDEFGHIJKLMNOPQRSTUVWXYZ', 'abcdefghijklmnopqrstuvwxyz'), '{}')]/following-sibling::input[1]",
    "//label[contains(translate(., 'ABCDEFGHIJKLMNOPQRSTUVWXYZ', 'abcdefghijklmnopqrstuvwxyz'), '{}')]/following-sibling::textarea[1]",
];

/// 查询某个语义角色的策略表，未知角色返回空列表
pub fn strategies(role: &str) -> &'static [Query] {
    STRATEGIES.get(role).copied().unwrap_or(&[])
}

/// 生成表单字段的策略列表（大小写不敏感）
pub fn field_strategies(field: &str) -> Vec<Query> {
    // 引号会破坏选择器，直接去掉
    let needle: String = field
        .to_lowercase()
        .chars()
        .filter(|c| *c != '\'' && *c != '"')
        .collect();

    FIELD_CSS_TEMPLATES
        .iter()
        .map(|template| Query::css_owned(template.replace("{}", &needle)))
        .chain(
            FIELD_XPATH_TEMPLATES
                .iter()
                .map(|template| Query::xpath_owned(template.replace("{}", &needle))),
        )
        .collect()
}

/// 按顺序尝试所有策略，返回第一个命中的元素
///
/// 单条策略出错（选择器非法、脚本异常）视为未命中，继续下一条。
/// 全部未命中返回 `None`，这不是错误
pub async fn locate(
    page: &dyn PageDriver,
    field: &str,
    strategies: &[Query],
    mode: MatchMode,
) -> Option<ElementRef> {
    for (index, query) in strategies.iter().enumerate() {
        match page.query(query, mode).await {
            Ok(Some(element)) => {
                debug!("定位 {} 命中策略 #{}: {}", field, index + 1, query);
                return Some(element);
            }
            Ok(None) => {}
            Err(e) => debug!("定位 {} 策略 #{} 出错: {} ({})", field, index + 1, query, e),
        }
    }
    None
}

/// 在等待上限内反复调用 [`locate`]
///
/// 每一轮都从第一条策略开始，保证优先级
pub async fn wait_for(
    page: &dyn PageDriver,
    field: &str,
    strategies: &[Query],
    mode: MatchMode,
    timeout: Duration,
    poll: Duration,
) -> Option<ElementRef> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(element) = locate(page, field, strategies, mode).await {
            return Some(element);
        }
        let now = Instant::now();
        if now >= deadline {
            debug!("等待 {} 超时 ({:?})", field, timeout);
            return None;
        }
        tokio::time::sleep(poll.min(deadline - now)).await;
    }
}
