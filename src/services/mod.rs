//! 业务能力层（Services Layer）
//!
//! 每个模块只提供一种能力，不关心流程顺序：
//!
//! - `field_extractor`：段落文本 → ResumeProfile（纯函数）
//! - `document_reader`：简历文件 → 段落文本
//! - `locator`：语义角色 → 有序策略表，按顺序定位元素
//! - `site_classifier`：平台 / 外部站点判断，登录校验
//! - `diagnostics`：调试截图落盘
//! - `report_writer`：结果报告文件

pub mod diagnostics;
pub mod document_reader;
pub mod field_extractor;
pub mod locator;
pub mod report_writer;
pub mod site_classifier;

pub use diagnostics::{DiagnosticSink, FileDiagnosticSink};
pub use document_reader::{DocumentReader, FileDocumentReader};
pub use field_extractor::extract_profile;
pub use report_writer::ReportWriter;
pub use site_classifier::{classify, SiteKind};
