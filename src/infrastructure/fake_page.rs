//! 测试用内存页面
//!
//! 元素以查询表达式为键，元素引用即表达式本身

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{AppError, AppResult, BrowserError};
use crate::infrastructure::{ElementRef, MatchMode, PageDriver, Query, SessionFactory};

#[derive(Debug, Default)]
pub struct FakeState {
    /// 表达式 → 是否可交互
    pub elements: HashMap<String, bool>,
    pub redirects: HashMap<String, String>,
    /// 点击某元素后出现的新元素
    pub reveals: HashMap<String, Vec<String>>,
    pub failing_activation: HashSet<String>,
    pub current_url: String,
    pub goto_fails: bool,
    pub panic_on_goto: bool,
    pub goto_delay: Duration,
    // ---- 记录 ----
    pub visited: Vec<String>,
    pub activated: Vec<String>,
    pub pointer_clicks: Vec<String>,
    pub scrolled: Vec<String>,
    pub fills: Vec<(String, String)>,
    pub attached: Vec<PathBuf>,
    pub screenshots: usize,
    pub closes: usize,
}

#[derive(Clone, Default)]
pub struct FakePage {
    pub state: Arc<Mutex<FakeState>>,
    active: Option<Arc<AtomicUsize>>,
}

impl FakePage {
    pub fn new() -> Self {
        let page = Self::default();
        page.state().current_url = "about:blank".to_string();
        page
    }

    pub fn state(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn with_element(self, expr: &str) -> Self {
        self.state().elements.insert(expr.to_string(), true);
        self
    }

    pub fn with_hidden_element(self, expr: &str) -> Self {
        self.state().elements.insert(expr.to_string(), false);
        self
    }

    pub fn with_redirect(self, from: &str, to: &str) -> Self {
        self.state()
            .redirects
            .insert(from.to_string(), to.to_string());
        self
    }

    pub fn with_reveal(self, clicked: &str, revealed: &[&str]) -> Self {
        self.state().reveals.insert(
            clicked.to_string(),
            revealed.iter().map(|s| s.to_string()).collect(),
        );
        self
    }

    pub fn with_failing_activation(self, expr: &str) -> Self {
        self.state().failing_activation.insert(expr.to_string());
        self
    }

    pub fn with_goto_failure(self) -> Self {
        self.state().goto_fails = true;
        self
    }

    pub fn with_goto_panic(self) -> Self {
        self.state().panic_on_goto = true;
        self
    }

    pub fn with_goto_delay(self, delay: Duration) -> Self {
        self.state().goto_delay = delay;
        self
    }

    pub fn closes(&self) -> usize {
        self.state().closes
    }

    fn click(&self, element: &ElementRef) {
        let mut state = self.state();
        if let Some(revealed) = state.reveals.get(element.token()).cloned() {
            for expr in revealed {
                state.elements.insert(expr, true);
            }
        }
    }

    fn check(&self, element: &ElementRef) -> AppResult<()> {
        if self.state().elements.contains_key(element.token()) {
            Ok(())
        } else {
            Err(BrowserError::StaleElement {
                reference: element.token().to_string(),
            }
            .into())
        }
    }
}

#[async_trait]
impl PageDriver for FakePage {
    async fn goto(&self, url: &str) -> AppResult<()> {
        let (delay, fails, panics) = {
            let state = self.state();
            (state.goto_delay, state.goto_fails, state.panic_on_goto)
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if panics {
            panic!("injected fault while loading {}", url);
        }
        let mut state = self.state();
        state.visited.push(url.to_string());
        if fails {
            return Err(AppError::navigation_failed(url, "injected failure"));
        }
        let landed = state
            .redirects
            .get(url)
            .cloned()
            .unwrap_or_else(|| url.to_string());
        state.current_url = landed;
        Ok(())
    }

    async fn current_url(&self) -> AppResult<String> {
        Ok(self.state().current_url.clone())
    }

    async fn query(&self, query: &Query, mode: MatchMode) -> AppResult<Option<ElementRef>> {
        let state = self.state();
        let hit = match state.elements.get(query.expr.as_ref()) {
            Some(true) => true,
            Some(false) => mode == MatchMode::Present,
            None => false,
        };
        Ok(hit.then(|| ElementRef(query.expr.to_string())))
    }

    async fn scroll_into_view(&self, element: &ElementRef) -> AppResult<()> {
        self.check(element)?;
        self.state().scrolled.push(element.token().to_string());
        Ok(())
    }

    async fn activate(&self, element: &ElementRef) -> AppResult<()> {
        self.check(element)?;
        if self.state().failing_activation.contains(element.token()) {
            return Err(AppError::Other("activation rejected".to_string()));
        }
        self.state().activated.push(element.token().to_string());
        self.click(element);
        Ok(())
    }

    async fn pointer_click(&self, element: &ElementRef) -> AppResult<()> {
        self.check(element)?;
        self.state().pointer_clicks.push(element.token().to_string());
        self.click(element);
        Ok(())
    }

    async fn fill(&self, element: &ElementRef, value: &str) -> AppResult<()> {
        self.check(element)?;
        self.state()
            .fills
            .push((element.token().to_string(), value.to_string()));
        Ok(())
    }

    async fn attach_file(&self, element: &ElementRef, path: &Path) -> AppResult<()> {
        self.check(element)?;
        self.state().attached.push(path.to_path_buf());
        Ok(())
    }

    async fn screenshot(&self) -> AppResult<Vec<u8>> {
        self.state().screenshots += 1;
        Ok(vec![0x89, b'P', b'N', b'G'])
    }

    async fn close(&mut self) -> AppResult<()> {
        self.state().closes += 1;
        if let Some(active) = &self.active {
            active.fetch_sub(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

type PageBuilder = Box<dyn Fn(&str) -> FakePage + Send + Sync>;

/// 测试用会话工厂，记录并发峰值
pub struct FakeFactory {
    build: PageBuilder,
    pub pages: Mutex<Vec<(String, FakePage)>>,
    pub fail_open: bool,
    active: Arc<AtomicUsize>,
    pub peak: AtomicUsize,
}

impl FakeFactory {
    pub fn new(build: impl Fn(&str) -> FakePage + Send + Sync + 'static) -> Self {
        Self {
            build: Box::new(build),
            pages: Mutex::new(Vec::new()),
            fail_open: false,
            active: Arc::new(AtomicUsize::new(0)),
            peak: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        let mut factory = Self::new(|_| FakePage::new());
        factory.fail_open = true;
        factory
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn page_for(&self, run_id: &str) -> Option<FakePage> {
        self.pages
            .lock()
            .unwrap()
            .iter()
            .find(|(id, _)| id == run_id)
            .map(|(_, page)| page.clone())
    }
}

#[async_trait]
impl SessionFactory for FakeFactory {
    async fn open(&self, run_id: &str) -> AppResult<Box<dyn PageDriver>> {
        if self.fail_open {
            return Err(BrowserError::LaunchFailed("no browser in tests".to_string()).into());
        }
        let mut page = (self.build)(run_id);
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        page.active = Some(self.active.clone());
        self.pages
            .lock()
            .unwrap()
            .push((run_id.to_string(), page.clone()));
        Ok(Box::new(page))
    }
}
