//! 调试截图落盘 - 业务能力层
//!
//! 截图只用于事后排查，写入失败只记录日志，不影响投递结果

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{debug, warn};

/// 截图接收方
#[async_trait]
pub trait DiagnosticSink: Send + Sync {
    /// 保存一张截图，成功时返回其引用（路径）
    async fn record(&self, run_id: &str, label: &str, png: &[u8]) -> Option<String>;
}

/// 把截图写入目录：`<dir>/<run>_<label>_<timestamp>.png`
#[derive(Debug, Clone)]
pub struct FileDiagnosticSink {
    dir: PathBuf,
}

impl FileDiagnosticSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn file_name(run_id: &str, label: &str) -> String {
        format!(
            "{}_{}_{}.png",
            sanitize(run_id),
            sanitize(label),
            chrono::Local::now().format("%Y%m%d_%H%M%S_%3f")
        )
    }
}

#[async_trait]
impl DiagnosticSink for FileDiagnosticSink {
    async fn record(&self, run_id: &str, label: &str, png: &[u8]) -> Option<String> {
        if let Err(e) = tokio::fs::create_dir_all(&self.dir).await {
            warn!("无法创建截图目录 {}: {}", self.dir.display(), e);
            return None;
        }

        let path = self.dir.join(Self::file_name(run_id, label));
        match tokio::fs::write(&path, png).await {
            Ok(()) => {
                debug!("📸 截图已保存: {}", path.display());
                Some(path.display().to_string())
            }
            Err(e) => {
                warn!("截图保存失败 {}: {}", path.display(), e);
                None
            }
        }
    }
}

// 文件名只保留字母数字、- 和 _
fn sanitize(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
        .take(60)
        .collect()
}
