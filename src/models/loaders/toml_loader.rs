use crate::clients::JobSource;
use crate::error::{AppResult, StoreError};
use crate::models::job::JobRecord;
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::fs;

/// 本地职位文件结构
///
/// ```toml
/// [[jobs]]
/// id = 1
/// job_link = "https://www.linkedin.com/jobs/view/123"
/// resume_id = "abc"
/// company = "Acme"
/// title = "Backend Engineer"
/// user_id = "u-1"
/// ```
#[derive(Debug, Default, Deserialize)]
struct JobsFile {
    #[serde(default)]
    jobs: Vec<JobRecord>,
}

/// 从 TOML 文件加载职位记录
pub async fn load_jobs_from_toml(toml_file_path: &Path) -> AppResult<Vec<JobRecord>> {
    let content = fs::read_to_string(toml_file_path).await?;

    let file: JobsFile = toml::from_str(&content).map_err(|source| StoreError::TomlParseFailed {
        path: toml_file_path.display().to_string(),
        source,
    })?;

    tracing::info!(
        "从 {} 加载了 {} 条职位记录",
        toml_file_path.display(),
        file.jobs.len()
    );

    Ok(file.jobs)
}

/// 基于本地 TOML 文件的职位数据源
pub struct TomlJobSource {
    path: PathBuf,
}

impl TomlJobSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl JobSource for TomlJobSource {
    async fn fetch_jobs(&self) -> AppResult<Vec<JobRecord>> {
        if !self.path.exists() {
            tracing::warn!("职位文件不存在: {}", self.path.display());
            return Ok(Vec::new());
        }
        load_jobs_from_toml(&self.path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_load_jobs_from_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [[jobs]]
            id = 1
            job_link = "https://www.linkedin.com/jobs/view/1"
            resume_id = "r1"
            company = "Acme"
            title = "Engineer"
            user_id = "u1"

            [[jobs]]
            id = "two"
            company = "Globex"
            "#
        )
        .unwrap();

        let source = TomlJobSource::new(file.path());
        let records = source.fetch_jobs().await.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id.as_deref(), Some("1"));
        assert!(records[0].missing_fields().is_empty());
        assert_eq!(records[1].missing_fields().len(), 4);
    }

    #[tokio::test]
    async fn test_missing_file_yields_no_jobs() {
        let dir = tempfile::tempdir().unwrap();
        let source = TomlJobSource::new(dir.path().join("absent.toml"));
        assert!(source.fetch_jobs().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[[jobs]\nid = ").unwrap();
        let source = TomlJobSource::new(file.path());
        tokio_test::assert_err!(source.fetch_jobs().await);
    }
}
