//! # Auto Apply
//!
//! 一个用于自动化职位投递的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 页面能力抽象，状态机只依赖 `PageDriver`
//! - `browser/` - 基于 chromiumoxide 的会话实现，每个职位一个独立浏览器
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个页面或单份简历
//! - `locator` - 按策略表定位元素
//! - `site_classifier` - 平台 / 外部站点识别与登录校验
//! - `field_extractor` - 简历字段提取
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个职位"的完整投递流程
//! - `ApplyCtx` - 上下文封装（职位 + 简历路径）
//! - `ApplyFlow` - 状态机（登录 → 打开 → 识别 → 投递 → 上传 → 填写 → 提交）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批量职位处理器，管理并发和汇总
//! - `orchestrator/job_processor` - 单个职位处理器，准备简历并运行状态机
//!
//! ## 模块结构

pub mod browser;
pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::{Config, Credentials};
pub use error::{AppError, AppResult};
pub use models::{ApplicationOutcome, ApplicationStatus, Job, JobRecord, OutcomeSummary, ResumeProfile};
pub use orchestrator::{App, Collaborators};
pub use services::{classify, extract_profile, SiteKind};
pub use workflow::{ApplyCtx, ApplyFlow, ApplyState};
