pub mod js_executor;
pub mod page_driver;

#[cfg(test)]
pub(crate) mod fake_page;

pub use js_executor::JsExecutor;
pub use page_driver::{ElementRef, MatchMode, PageDriver, Query, QueryKind, SessionFactory};
