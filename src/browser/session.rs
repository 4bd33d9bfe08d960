//! chromiumoxide 会话 - `PageDriver` 的真实实现
//!
//! 查询、填写、点击都通过 JsExecutor 注入脚本完成，
//! 只有文件上传和鼠标点击走 CDP

use std::path::Path;

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::dom::SetFileInputFilesParams;
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Browser;
use tempfile::TempDir;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::{AppError, AppResult, BrowserError};
use crate::infrastructure::{ElementRef, JsExecutor, MatchMode, PageDriver, Query, QueryKind};

/// 定位到的元素上打的标记属性
const REF_ATTRIBUTE: &str = "data-autoapply-ref";

/// 单次投递独占的浏览器会话
pub struct ChromeSession {
    browser: Browser,
    executor: JsExecutor,
    handler: JoinHandle<()>,
    // 会话关闭后随之删除
    _profile_dir: TempDir,
    closed: bool,
}

impl ChromeSession {
    pub fn new(
        browser: Browser,
        executor: JsExecutor,
        handler: JoinHandle<()>,
        profile_dir: TempDir,
    ) -> Self {
        Self {
            browser,
            executor,
            handler,
            _profile_dir: profile_dir,
            closed: false,
        }
    }

    fn selector_for(element: &ElementRef) -> String {
        format!("[{}=\"{}\"]", REF_ATTRIBUTE, element.token())
    }

    /// 在标记元素上执行一段脚本，`body` 中可使用变量 `el`
    async fn with_element(&self, element: &ElementRef, body: &str) -> AppResult<()> {
        let js_code = format!(
            r#"
            (() => {{
                const el = document.querySelector({selector});
                if (!el) {{
                    return false;
                }}
                {body}
                return true;
            }})()
            "#,
            selector = serde_json::to_string(&Self::selector_for(element))?,
            body = body,
        );

        let found: bool = self.executor.eval_as(js_code).await?;
        if found {
            Ok(())
        } else {
            Err(BrowserError::StaleElement {
                reference: element.token().to_string(),
            }
            .into())
        }
    }
}

/// 构建查询脚本
///
/// 按文档顺序取第一个满足条件的节点，打上标记并返回标记值；
/// 非法选择器按"未找到"处理
fn build_query_script(query: &Query, mode: MatchMode) -> AppResult<String> {
    let kind = match query.kind {
        QueryKind::Css => "css",
        QueryKind::XPath => "xpath",
    };
    let require_interactable = mode == MatchMode::Interactable;

    Ok(format!(
        r#"
        (() => {{
            const kind = {kind};
            const expr = {expr};
            const requireInteractable = {interactable};
            let nodes = [];
            try {{
                if (kind === 'xpath') {{
                    const snapshot = document.evaluate(expr, document, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null);
                    for (let i = 0; i < snapshot.snapshotLength; i++) {{
                        nodes.push(snapshot.snapshotItem(i));
                    }}
                }} else {{
                    nodes = Array.from(document.querySelectorAll(expr));
                }}
            }} catch (error) {{
                return null;
            }}
            const usable = (el) => {{
                if (!(el instanceof Element)) {{
                    return false;
                }}
                if (!requireInteractable) {{
                    return true;
                }}
                const rect = el.getBoundingClientRect();
                const style = window.getComputedStyle(el);
                return rect.width > 0 && rect.height > 0
                    && style.visibility !== 'hidden'
                    && style.display !== 'none'
                    && !el.disabled;
            }};
            const hit = nodes.find(usable);
            if (!hit) {{
                return null;
            }}
            const token = hit.getAttribute({attr}) || ('aa' + Math.random().toString(36).slice(2, 12));
            hit.setAttribute({attr}, token);
            return token;
        }})()
        "#,
        kind = serde_json::to_string(kind)?,
        expr = serde_json::to_string(query.expr.as_ref())?,
        interactable = require_interactable,
        attr = serde_json::to_string(REF_ATTRIBUTE)?,
    ))
}

#[async_trait]
impl PageDriver for ChromeSession {
    async fn goto(&self, url: &str) -> AppResult<()> {
        debug!("导航到: {}", url);
        self.executor
            .page()
            .goto(url)
            .await
            .map_err(|e| AppError::navigation_failed(url, e))?;
        Ok(())
    }

    async fn current_url(&self) -> AppResult<String> {
        Ok(self.executor.page().url().await?.unwrap_or_default())
    }

    async fn query(&self, query: &Query, mode: MatchMode) -> AppResult<Option<ElementRef>> {
        let js_code = build_query_script(query, mode)?;
        let token: Option<String> = self.executor.eval_as(js_code).await?;
        Ok(token.map(ElementRef))
    }

    async fn scroll_into_view(&self, element: &ElementRef) -> AppResult<()> {
        self.with_element(element, "el.scrollIntoView(true);").await
    }

    async fn activate(&self, element: &ElementRef) -> AppResult<()> {
        self.with_element(element, "el.click();").await
    }

    async fn pointer_click(&self, element: &ElementRef) -> AppResult<()> {
        let node = self
            .executor
            .page()
            .find_element(Self::selector_for(element))
            .await?;
        node.click().await?;
        Ok(())
    }

    async fn fill(&self, element: &ElementRef, value: &str) -> AppResult<()> {
        // 使用原生 setter，保证 React 等框架能收到 input 事件
        let body = format!(
            r#"
            el.focus();
            const proto = el.tagName === 'TEXTAREA'
                ? HTMLTextAreaElement.prototype
                : HTMLInputElement.prototype;
            const setter = Object.getOwnPropertyDescriptor(proto, 'value').set;
            setter.call(el, '');
            setter.call(el, {value});
            el.dispatchEvent(new Event('input', {{ bubbles: true }}));
            el.dispatchEvent(new Event('change', {{ bubbles: true }}));
            "#,
            value = serde_json::to_string(value)?,
        );
        self.with_element(element, &body).await
    }

    async fn attach_file(&self, element: &ElementRef, path: &Path) -> AppResult<()> {
        let page = self.executor.page();
        let node = page.find_element(Self::selector_for(element)).await?;

        let mut params = SetFileInputFilesParams::new(vec![path.display().to_string()]);
        params.backend_node_id = Some(node.backend_node_id.clone());
        page.execute(params).await?;
        Ok(())
    }

    async fn screenshot(&self) -> AppResult<Vec<u8>> {
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .build();
        Ok(self.executor.page().screenshot(params).await?)
    }

    async fn close(&mut self) -> AppResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let result = self.browser.close().await;
        if let Err(e) = self.browser.wait().await {
            warn!("等待浏览器进程退出失败: {}", e);
        }
        self.handler.abort();
        result?;
        Ok(())
    }
}
