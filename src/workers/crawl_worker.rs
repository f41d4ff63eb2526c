// Copyright (c) 2026 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::agent::{AgentError, PageAgent};
use crate::domain::models::target::{CrawlTarget, TargetKind};
use crate::domain::repositories::backlog_repository::BacklogRepository;
use crate::domain::repositories::channel_repository::ChannelRepository;
use crate::domain::repositories::video_repository::VideoRepository;
use crate::ingest::pipeline::IngestPipeline;
use crate::utils::claim::{claim_with_retries, ClaimRetryPolicy};
use crate::utils::errors::WorkerError;
use crate::utils::shutdown::ShutdownToken;
use crate::workers::worker::Worker;

/// 爬取工作器
///
/// 每个工作器服务一种目标类型，循环执行：领取目标 → 委托页面
/// 交互 → 摄取捕获结果 → 冷却。关停令牌只在循环边界被采样，
/// 进行中的目标总是被完整处理（成功落库或干净失败）。
pub struct CrawlWorker {
    name: String,
    worker_id: Uuid,
    kind: TargetKind,
    backlog: Arc<dyn BacklogRepository>,
    videos: Arc<dyn VideoRepository>,
    channels: Arc<dyn ChannelRepository>,
    agent: Arc<dyn PageAgent>,
    shutdown: ShutdownToken,
    claim_policy: ClaimRetryPolicy,
    /// 积压为空时的等待时间
    idle_wait: Duration,
    /// 目标之间的间隔
    target_delay: Duration,
}

impl CrawlWorker {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        kind: TargetKind,
        index: usize,
        backlog: Arc<dyn BacklogRepository>,
        videos: Arc<dyn VideoRepository>,
        channels: Arc<dyn ChannelRepository>,
        agent: Arc<dyn PageAgent>,
        shutdown: ShutdownToken,
        idle_wait: Duration,
        target_delay: Duration,
    ) -> Self {
        Self {
            name: format!("{}-worker-{}", kind, index),
            worker_id: Uuid::new_v4(),
            kind,
            backlog,
            videos,
            channels,
            agent,
            shutdown,
            claim_policy: ClaimRetryPolicy::default(),
            idle_wait,
            target_delay,
        }
    }

    async fn process_target(
        &self,
        session: &dyn crate::agent::PageSession,
        target: &CrawlTarget,
        failure_counts: &mut HashMap<String, u32>,
    ) {
        match session.interact(target).await {
            Ok(harvest) => {
                // 扫描内去重的作用域是单个目标，每个目标一条新管线
                let mut pipeline = IngestPipeline::new(
                    self.videos.clone(),
                    self.channels.clone(),
                    self.backlog.clone(),
                );
                let report = pipeline.ingest(&harvest).await;
                info!(
                    worker = %self.name,
                    locator = %target.locator,
                    transactions = report.transactions,
                    duplicates = report.duplicates,
                    unmatched = report.unmatched,
                    videos_extracted = report.videos_extracted,
                    inserted = report.videos_inserted,
                    updated = report.videos_updated,
                    skipped_blacklisted = report.skipped_blacklisted,
                    dropped_invalid = report.dropped_invalid,
                    channel_snapshots = report.channel_snapshots,
                    channels_discovered = report.channels_discovered,
                    "目标摄取完成"
                );
                failure_counts.remove(&target.locator);
            }
            Err(AgentError::ResourceAbsent) => {
                warn!(worker = %self.name, locator = %target.locator, "远端资源确认缺失，退役目标");
                if let Err(err) = self.backlog.release_as_missing(target).await {
                    error!(worker = %self.name, locator = %target.locator, error = %err, "退役目标失败");
                }
            }
            Err(AgentError::Transient(message)) => {
                let failures = failure_counts.entry(target.locator.clone()).or_insert(0);
                *failures += 1;
                // 不改变目标状态，明天自然重新可领
                warn!(
                    worker = %self.name,
                    locator = %target.locator,
                    failures = *failures,
                    error = %message,
                    "页面交互瞬时失败，目标延后重试"
                );
            }
        }
    }
}

#[async_trait]
impl Worker for CrawlWorker {
    async fn run(&self) -> Result<(), WorkerError> {
        // 浏览器/代理资源对在工作器启动时独占获取，
        // 会话随本函数返回被丢弃，任何退出路径都会释放资源
        let session = self
            .agent
            .open_session(self.worker_id)
            .await
            .map_err(|e| WorkerError::AgentError(e.to_string()))?;

        info!(worker = %self.name, worker_id = %self.worker_id, "爬取工作器启动");

        let mut failure_counts: HashMap<String, u32> = HashMap::new();

        loop {
            if self.shutdown.is_cancelled() {
                break;
            }

            let claimed =
                claim_with_retries(&self.claim_policy, || self.backlog.claim_next(self.kind))
                    .await;

            let target = match claimed {
                Ok(Some(target)) => target,
                Ok(None) => {
                    info!(worker = %self.name, "当前没有可领取的目标，等待下一轮");
                    self.shutdown.sleep(self.idle_wait).await;
                    continue;
                }
                Err(err) => {
                    error!(worker = %self.name, error = %err, "领取目标失败，等待下一轮");
                    self.shutdown.sleep(self.idle_wait).await;
                    continue;
                }
            };

            self.process_target(session.as_ref(), &target, &mut failure_counts)
                .await;

            self.shutdown.sleep(self.target_delay).await;
        }

        info!(worker = %self.name, "爬取工作器已停止");
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
