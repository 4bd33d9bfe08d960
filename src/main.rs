use anyhow::{Context, Result};
use auto_apply::utils::logging;
use auto_apply::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::load().context("加载配置失败")?;

    // 初始化日志
    logging::init(config.verbose_logging);

    // 初始化并运行应用
    let summary = App::initialize(config).await?.run().await?;

    if summary.completed() == 0 && summary.skipped == 0 {
        tracing::warn!("⚠️ 没有处理任何职位");
    }

    Ok(())
}
