// Copyright (c) 2026 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use migration::{Migrator, MigratorTrait};
use ytharvest::agent::http::HttpPageAgent;
use ytharvest::config::settings::Settings;
use ytharvest::domain::models::target::TargetKind;
use ytharvest::infrastructure::database::connection;
use ytharvest::infrastructure::repositories::backlog_repo_impl::BacklogRepositoryImpl;
use ytharvest::infrastructure::repositories::channel_repo_impl::ChannelRepositoryImpl;
use ytharvest::infrastructure::repositories::video_repo_impl::VideoRepositoryImpl;
use ytharvest::utils::telemetry;
use ytharvest::workers::manager::WorkerManager;

/// 主函数
///
/// 应用程序入口点：初始化配置与数据库，按目标类型启动工作器池，
/// 等待关停信号。积压存储不可达等启动失败直接以非零码退出，
/// 不进入任何部分运行状态。
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting ytharvest...");

    // 2. Load configuration
    let settings = Settings::new()?;
    info!("Configuration loaded");

    // 3. Connect to database
    let db = Arc::new(connection::create_pool(&settings.database).await?);
    info!("Database connection established");

    // Run database migrations
    info!("Running database migrations...");
    Migrator::up(db.as_ref(), None).await?;
    info!("Database migrations applied");

    // 4. Initialize repositories and agent adapter
    let backlog = Arc::new(BacklogRepositoryImpl::new(db.clone()));
    let videos = Arc::new(VideoRepositoryImpl::new(db.clone()));
    let channels = Arc::new(ChannelRepositoryImpl::new(db.clone()));
    let agent = Arc::new(HttpPageAgent::new(&settings.agent)?);

    // 5. Start worker pools, one per target kind
    let mut manager = WorkerManager::new(
        backlog,
        videos,
        channels,
        agent,
        Duration::from_secs(settings.crawler.shutdown_grace_secs),
        Duration::from_secs(settings.crawler.idle_wait_secs),
        Duration::from_secs(settings.crawler.target_delay_secs),
    );
    manager.start_pool(TargetKind::Channel, settings.crawler.channel_workers);
    manager.start_pool(TargetKind::Keyword, settings.crawler.keyword_workers);
    manager.start_pool(TargetKind::BenchmarkUrl, settings.crawler.benchmark_workers);

    // 6. Wait for SIGINT/SIGTERM and shut down cooperatively
    manager.wait_for_shutdown().await;

    info!("ytharvest stopped");
    Ok(())
}
