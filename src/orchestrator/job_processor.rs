//! 单个职位处理器 - 编排层
//!
//! 下载定制简历到临时目录，然后交给 ApplyFlow。
//! 临时目录随函数返回一起删除

use std::sync::Arc;

use tracing::{error, info};

use crate::clients::{resume_object_name, ResumeStore};
use crate::infrastructure::SessionFactory;
use crate::models::{ApplicationOutcome, ApplicationStatus, Job};
use crate::workflow::{ApplyCtx, ApplyFlow};

/// 处理一个职位，总是返回一个结果
pub async fn process_job(
    job: Job,
    index: usize,
    resumes: Arc<dyn ResumeStore>,
    sessions: Arc<dyn SessionFactory>,
    flow: Arc<ApplyFlow>,
) -> ApplicationOutcome {
    let job_id = job.id.clone();

    let workspace = match tempfile::Builder::new().prefix("auto_apply_job_").tempdir() {
        Ok(dir) => dir,
        Err(e) => {
            error!("[职位 {}] ❌ 无法创建临时目录: {}", index, e);
            return ApplicationOutcome::new(job_id, ApplicationStatus::Error)
                .with_detail(e.to_string());
        }
    };

    info!("[职位 {}] 📥 正在下载定制简历...", index);
    let bytes = match resumes.fetch_resume(&job.resume_id, &job.id).await {
        Ok(bytes) => bytes,
        Err(e) => {
            error!("[职位 {}] ❌ 简历下载失败: {}", index, e);
            return ApplicationOutcome::new(job_id, ApplicationStatus::Error)
                .with_detail(format!("resume download failed: {}", e));
        }
    };

    let resume_path = workspace
        .path()
        .join(resume_object_name(&job.resume_id, &job.id));
    if let Err(e) = tokio::fs::write(&resume_path, &bytes).await {
        error!("[职位 {}] ❌ 简历写入失败: {}", index, e);
        return ApplicationOutcome::new(job_id, ApplicationStatus::Error).with_detail(e.to_string());
    }

    let mut ctx = ApplyCtx::new(job, index, resume_path);
    flow.run(sessions.as_ref(), &mut ctx).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::DirectoryResumeStore;
    use crate::infrastructure::fake_page::{FakeFactory, FakePage};
    use crate::workflow::apply_flow::tests::{flow_with, job, MemorySink};

    #[tokio::test(start_paused = true)]
    async fn test_missing_resume_opens_no_session() {
        let dir = tempfile::tempdir().unwrap();
        let factory = Arc::new(FakeFactory::new(|_| FakePage::new()));

        let outcome = process_job(
            job("1", "https://jobs.lever.co/acme/1"),
            1,
            Arc::new(DirectoryResumeStore::new(dir.path())),
            factory.clone(),
            Arc::new(flow_with(Arc::new(MemorySink::default()))),
        )
        .await;

        assert_eq!(outcome.status, ApplicationStatus::Error);
        assert!(outcome.detail.unwrap().starts_with("resume download failed"));
        assert!(factory.pages.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_downloaded_resume_runs_flow() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("enhanced_r1_1.docx"), b"resume").unwrap();
        let factory = Arc::new(FakeFactory::new(|_| FakePage::new()));

        let outcome = process_job(
            job("1", "https://jobs.lever.co/acme/1"),
            1,
            Arc::new(DirectoryResumeStore::new(dir.path())),
            factory.clone(),
            Arc::new(flow_with(Arc::new(MemorySink::default()))),
        )
        .await;

        assert_eq!(outcome.status, ApplicationStatus::HandledExternal);
        assert_eq!(factory.page_for("job-1").unwrap().closes(), 1);
    }
}
