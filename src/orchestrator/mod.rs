//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量调度和结果汇总，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量职位处理器
//! - 管理应用生命周期（装配、运行、汇总）
//! - 读取并校验职位列表
//! - 控制并发数量（Semaphore）
//!
//! ### `job_processor` - 单个职位处理器
//! - 下载定制简历到临时目录
//! - 调用 ApplyFlow，运行结束后清理临时文件
//!
//! ### `progress` - 进度汇总
//! - 单消费者通道，串行输出日志、写报告、计数
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<Job>)
//!     ↓
//! job_processor (处理单个 Job)
//!     ↓
//! workflow::ApplyFlow (单个职位的状态机)
//!     ↓
//! services (能力层：locator / classifier / extractor / diagnostics)
//!     ↓
//! infrastructure (基础设施：PageDriver)
//! ```

pub mod batch_processor;
pub mod job_processor;
pub mod progress;

// 重新导出主要类型
pub use batch_processor::{App, Collaborators};
pub use job_processor::process_job;
pub use progress::{spawn_progress, ProgressEvent};
