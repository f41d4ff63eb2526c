// Copyright (c) 2026 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 页面交互代理模块
///
/// 核心只消费代理的输出契约：给定一个爬取目标，代理驱动页面交互
/// 并返回捕获到的网络事务，核心从不关心它如何取得这些数据
pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::models::capture::CapturedTransaction;
use crate::domain::models::target::CrawlTarget;

/// 页面交互代理错误类型
#[derive(Error, Debug)]
pub enum AgentError {
    /// 瞬时失败（网络/浏览器/代理），目标保持可领状态稍后重试
    #[error("瞬时失败: {0}")]
    Transient(String),

    /// 远端资源已确认不存在，目标应从积压中退役
    #[error("远端资源已确认不存在")]
    ResourceAbsent,
}

impl From<reqwest::Error> for AgentError {
    fn from(err: reqwest::Error) -> Self {
        AgentError::Transient(err.to_string())
    }
}

/// 一次页面交互的收获
///
/// 捕获到的网络事务，外加代理从渲染页面直接读到的辅助字段。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Harvest {
    /// 捕获到的网络事务
    pub transactions: Vec<CapturedTransaction>,
    /// 页面上的频道显示名
    #[serde(default)]
    pub page_channel_name: Option<String>,
    /// 页面上的频道头像URL
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// 页面交互代理接口
#[async_trait]
pub trait PageAgent: Send + Sync {
    /// 为一个工作器打开独占的交互会话
    ///
    /// 会话对应的浏览器/代理资源对由该工作器独占，
    /// 会话被丢弃时资源随之释放（包括异常退出路径）。
    async fn open_session(&self, worker_id: Uuid) -> Result<Box<dyn PageSession>, AgentError>;
}

/// 页面交互会话接口
#[async_trait]
pub trait PageSession: Send + Sync {
    /// 对一个目标执行页面交互并返回捕获结果
    async fn interact(&self, target: &CrawlTarget) -> Result<Harvest, AgentError>;
}
