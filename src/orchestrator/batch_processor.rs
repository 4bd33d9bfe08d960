//! 批量职位处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责批量职位的调度和资源装配。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：根据配置装配数据源、简历存储、浏览器工厂
//! 2. **批量加载**：读取职位表并过滤掉缺少必填字段的记录
//! 3. **并发控制**：Semaphore 限制同时运行的任务数为 min(上限, 职位数)
//! 4. **故障隔离**：每个职位一个任务，任务失败只影响自己的结果
//! 5. **全局统计**：通过进度通道汇总所有结果
//!
//! 与按批处理不同，一个职位完成后立即补充下一个，慢任务不会拖住整批

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use crate::browser::{ChromeLauncher, LaunchSettings};
use crate::clients::{DirectoryResumeStore, JobSource, ResumeStore, SupabaseClient};
use crate::config::Config;
use crate::infrastructure::SessionFactory;
use crate::models::{partition_jobs, ApplicationOutcome, ApplicationStatus, OutcomeSummary, TomlJobSource};
use crate::orchestrator::job_processor::process_job;
use crate::orchestrator::progress::{spawn_progress, ProgressEvent};
use crate::services::{FileDiagnosticSink, FileDocumentReader, ReportWriter};
use crate::utils::logging;
use crate::workflow::{ApplyFlow, FlowSettings};

/// 应用依赖的外部协作方
#[derive(Clone)]
pub struct Collaborators {
    pub jobs: Arc<dyn JobSource>,
    pub resumes: Arc<dyn ResumeStore>,
    pub sessions: Arc<dyn SessionFactory>,
    pub flow: Arc<ApplyFlow>,
}

/// 应用主结构
pub struct App {
    config: Config,
    collaborators: Collaborators,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        config.validate().context("配置校验失败")?;

        let jobs: Arc<dyn JobSource>;
        let resumes: Arc<dyn ResumeStore>;
        let source = if config.uses_supabase() {
            let client =
                Arc::new(SupabaseClient::new(&config).context("无法创建 Supabase 客户端")?);
            jobs = client.clone();
            resumes = client;
            format!("Supabase ({})", config.supabase_url)
        } else {
            jobs = Arc::new(TomlJobSource::new(&config.jobs_file));
            resumes = Arc::new(DirectoryResumeStore::new(&config.resume_dir));
            format!("本地文件 ({})", config.jobs_file)
        };

        logging::log_startup(config.max_concurrent_jobs, &source);

        let flow = ApplyFlow::new(
            FlowSettings::from_config(&config),
            Arc::new(FileDiagnosticSink::new(&config.screenshot_dir)),
            Arc::new(FileDocumentReader::new()),
        );

        let collaborators = Collaborators {
            jobs,
            resumes,
            sessions: Arc::new(ChromeLauncher::new(LaunchSettings::from_config(&config))),
            flow: Arc::new(flow),
        };

        Ok(Self {
            config,
            collaborators,
        })
    }

    /// 使用自定义协作方创建（测试或嵌入使用）
    pub fn with_collaborators(config: Config, collaborators: Collaborators) -> Self {
        Self {
            config,
            collaborators,
        }
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<OutcomeSummary> {
        info!("\n📁 正在读取职位列表...");
        let records = self
            .collaborators
            .jobs
            .fetch_jobs()
            .await
            .context("读取职位列表失败")?;

        let partition = partition_jobs(records);
        let total = partition.eligible.len();
        let workers = self.config.max_concurrent_jobs.min(total).max(1);
        logging::log_jobs_loaded(total, partition.skipped.len(), workers);

        let report = ReportWriter::with_path(&self.config.report_file);
        let report = match report.init() {
            Ok(()) => Some(report),
            Err(e) => {
                warn!("⚠️ 无法初始化报告文件 {}: {}", self.config.report_file, e);
                None
            }
        };

        let (progress, consumer) = spawn_progress(report, total);

        for (label, missing) in partition.skipped {
            let _ = progress.send(ProgressEvent::Skipped { label, missing });
        }

        if total == 0 {
            warn!("⚠️ 没有可投递的职位，程序结束");
        }

        let semaphore = Arc::new(Semaphore::new(workers));
        let mut handles = Vec::with_capacity(total);

        for (idx, job) in partition.eligible.into_iter().enumerate() {
            let index = idx + 1;
            let job_id = job.id.clone();
            let semaphore = semaphore.clone();
            let progress = progress.clone();
            let collaborators = self.collaborators.clone();

            let handle = tokio::spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| anyhow::anyhow!("信号量已关闭: {}", e))?;

                let _ = progress.send(ProgressEvent::Started {
                    index,
                    label: job.to_string(),
                });

                let outcome = process_job(
                    job,
                    index,
                    collaborators.resumes,
                    collaborators.sessions,
                    collaborators.flow,
                )
                .await;

                let _ = progress.send(ProgressEvent::Finished {
                    index,
                    outcome: outcome.clone(),
                });
                Ok::<_, anyhow::Error>(outcome)
            });
            handles.push((index, job_id, handle));
        }

        for (index, job_id, handle) in handles {
            let failure = match handle.await {
                Ok(Ok(_)) => continue,
                Ok(Err(e)) => e.to_string(),
                Err(e) => e.to_string(),
            };
            error!("[职位 {}] 任务执行失败: {}", index, failure);
            let outcome =
                ApplicationOutcome::new(job_id, ApplicationStatus::Error).with_detail(failure);
            let _ = progress.send(ProgressEvent::Finished { index, outcome });
        }

        drop(progress);
        let summary = consumer.await.context("进度汇总任务失败")?;

        logging::print_final_stats(&summary, &self.config.report_file);
        Ok(summary)
    }
}
