//! 外部协作方接口
//!
//! 职位表读取、简历文件下载只通过这里的窄接口调用，
//! 具体实现可以是 Supabase，也可以是本地文件

pub mod local_store;
pub mod supabase_client;

use crate::error::AppResult;
use crate::models::JobRecord;
use async_trait::async_trait;

pub use local_store::DirectoryResumeStore;
pub use supabase_client::SupabaseClient;

/// 职位数据源
#[async_trait]
pub trait JobSource: Send + Sync {
    /// 读取全部职位记录（未校验）
    async fn fetch_jobs(&self) -> AppResult<Vec<JobRecord>>;
}

/// 定制简历存储
#[async_trait]
pub trait ResumeStore: Send + Sync {
    /// 下载某职位对应的定制简历
    async fn fetch_resume(&self, resume_id: &str, job_id: &str) -> AppResult<Vec<u8>>;
}

/// 定制简历的对象名
pub fn resume_object_name(resume_id: &str, job_id: &str) -> String {
    format!("enhanced_{}_{}.docx", resume_id, job_id)
}
