//! 页面驱动接口 - 基础设施层
//!
//! 状态机只认识 `PageDriver`，不直接接触 chromiumoxide，
//! 测试中可以用内存假页面替换真实浏览器

use crate::error::AppResult;
use async_trait::async_trait;
use std::borrow::Cow;
use std::fmt;
use std::path::Path;

/// 查询表达式类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    Css,
    XPath,
}

/// 单条 DOM 查询
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub kind: QueryKind,
    pub expr: Cow<'static, str>,
}

impl Query {
    pub const fn css(expr: &'static str) -> Self {
        Self {
            kind: QueryKind::Css,
            expr: Cow::Borrowed(expr),
        }
    }

    pub const fn xpath(expr: &'static str) -> Self {
        Self {
            kind: QueryKind::XPath,
            expr: Cow::Borrowed(expr),
        }
    }

    pub fn css_owned(expr: String) -> Self {
        Self {
            kind: QueryKind::Css,
            expr: Cow::Owned(expr),
        }
    }

    pub fn xpath_owned(expr: String) -> Self {
        Self {
            kind: QueryKind::XPath,
            expr: Cow::Owned(expr),
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            QueryKind::Css => write!(f, "css:{}", self.expr),
            QueryKind::XPath => write!(f, "xpath:{}", self.expr),
        }
    }
}

/// 元素匹配要求
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// 可见且可用
    Interactable,
    /// 只要求存在于 DOM（隐藏的文件上传控件）
    Present,
}

/// 页面内元素引用
///
/// 定位成功后元素被打上标记，后续操作通过标记找回
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementRef(pub String);

impl ElementRef {
    pub fn token(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 单个浏览器会话中的页面能力
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// 导航到指定地址
    async fn goto(&self, url: &str) -> AppResult<()>;

    /// 当前页面地址
    async fn current_url(&self) -> AppResult<String>;

    /// 执行一条查询，返回第一个满足 `mode` 的元素
    async fn query(&self, query: &Query, mode: MatchMode) -> AppResult<Option<ElementRef>>;

    /// 滚动到元素可见
    async fn scroll_into_view(&self, element: &ElementRef) -> AppResult<()>;

    /// 直接触发元素的 click()
    async fn activate(&self, element: &ElementRef) -> AppResult<()>;

    /// 模拟鼠标点击元素中心
    async fn pointer_click(&self, element: &ElementRef) -> AppResult<()>;

    /// 清空并填写输入框
    async fn fill(&self, element: &ElementRef, value: &str) -> AppResult<()>;

    /// 给文件上传控件设置文件
    async fn attach_file(&self, element: &ElementRef, path: &Path) -> AppResult<()>;

    /// 截取当前视口（PNG）
    async fn screenshot(&self) -> AppResult<Vec<u8>>;

    /// 释放会话
    async fn close(&mut self) -> AppResult<()>;
}

/// 浏览器会话工厂
#[async_trait]
pub trait SessionFactory: Send + Sync {
    /// 为一次投递打开独占的浏览器会话
    async fn open(&self, run_id: &str) -> AppResult<Box<dyn PageDriver>>;
}
