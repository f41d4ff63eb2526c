// Copyright (c) 2026 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{error, info, warn};

use crate::agent::PageAgent;
use crate::domain::models::target::TargetKind;
use crate::domain::repositories::backlog_repository::BacklogRepository;
use crate::domain::repositories::channel_repository::ChannelRepository;
use crate::domain::repositories::video_repository::VideoRepository;
use crate::utils::shutdown::{shutdown_channel, ShutdownController, ShutdownToken};
use crate::workers::crawl_worker::CrawlWorker;
use crate::workers::worker::Worker;

/// 工作管理器
///
/// 每种目标类型一个独立的工作器池。关停是协作式的：信号只设置
/// 关停令牌，工作器在循环边界自行退出；宽限时间耗尽后强制中止
/// 未退出的工作器。
pub struct WorkerManager {
    backlog: Arc<dyn BacklogRepository>,
    videos: Arc<dyn VideoRepository>,
    channels: Arc<dyn ChannelRepository>,
    agent: Arc<dyn PageAgent>,
    controller: ShutdownController,
    token: ShutdownToken,
    shutdown_grace: Duration,
    idle_wait: Duration,
    target_delay: Duration,
    handles: Vec<(String, JoinHandle<()>)>,
}

impl WorkerManager {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        backlog: Arc<dyn BacklogRepository>,
        videos: Arc<dyn VideoRepository>,
        channels: Arc<dyn ChannelRepository>,
        agent: Arc<dyn PageAgent>,
        shutdown_grace: Duration,
        idle_wait: Duration,
        target_delay: Duration,
    ) -> Self {
        let (controller, token) = shutdown_channel();
        Self {
            backlog,
            videos,
            channels,
            agent,
            controller,
            token,
            shutdown_grace,
            idle_wait,
            target_delay,
            handles: Vec::new(),
        }
    }

    /// 启动一种目标类型的工作器池
    pub fn start_pool(&mut self, kind: TargetKind, size: usize) {
        for index in 0..size {
            let worker = CrawlWorker::new(
                kind,
                index,
                self.backlog.clone(),
                self.videos.clone(),
                self.channels.clone(),
                self.agent.clone(),
                self.token.clone(),
                self.idle_wait,
                self.target_delay,
            );
            let name = worker.name().to_string();
            info!(worker = %name, "启动工作器");

            let handle = tokio::spawn(async move {
                if let Err(err) = worker.run().await {
                    error!(worker = %worker.name(), error = %err, "工作器异常退出");
                }
            });
            self.handles.push((name, handle));
        }
    }

    /// 等待关停信号并优雅关停所有工作器
    ///
    /// SIGINT/SIGTERM 触发协作式关停：设置令牌，在宽限时间内等待
    /// 各工作器完成当前目标，超时的强制中止。
    pub async fn wait_for_shutdown(mut self) {
        wait_for_signal().await;

        info!("收到关停信号，通知所有工作器...");
        self.controller.cancel();

        let deadline = Instant::now() + self.shutdown_grace;
        for (name, mut handle) in self.handles.drain(..) {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match tokio::time::timeout(remaining, &mut handle).await {
                Ok(_) => info!(worker = %name, "工作器已退出"),
                Err(_) => {
                    warn!(worker = %name, "工作器未在宽限时间内退出，强制中止");
                    handle.abort();
                }
            }
        }

        info!("所有工作器已关停");
    }
}

/// 等待 SIGINT 或 SIGTERM
async fn wait_for_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(stream) => stream,
            Err(err) => {
                error!(error = %err, "无法监听SIGTERM，仅响应Ctrl+C");
                let _ = tokio::signal::ctrl_c().await;
                return;
            }
        };
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                if let Err(err) = result {
                    error!(error = %err, "监听关停信号失败");
                }
            }
            _ = sigterm.recv() => {}
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "监听关停信号失败");
        }
    }
}
