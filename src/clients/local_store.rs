//! 本地目录简历存储

use crate::clients::{resume_object_name, ResumeStore};
use crate::error::{AppResult, StoreError};
use async_trait::async_trait;
use std::path::PathBuf;

/// 从本地目录读取 `enhanced_<resume_id>_<job_id>.docx`
pub struct DirectoryResumeStore {
    root: PathBuf,
}

impl DirectoryResumeStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ResumeStore for DirectoryResumeStore {
    async fn fetch_resume(&self, resume_id: &str, job_id: &str) -> AppResult<Vec<u8>> {
        let object = resume_object_name(resume_id, job_id);
        let path = self.root.join(&object);
        if !path.exists() {
            return Err(StoreError::NotFound {
                key: path.display().to_string(),
            }
            .into());
        }
        Ok(tokio::fs::read(&path).await?)
    }
}
