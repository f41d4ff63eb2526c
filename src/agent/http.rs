// Copyright (c) 2026 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

use crate::agent::{AgentError, Harvest, PageAgent, PageSession};
use crate::config::settings::AgentSettings;
use crate::domain::models::target::CrawlTarget;

/// 捕获边车的HTTP客户端适配器
///
/// 页面交互由独立的捕获边车进程完成（驱动浏览器、录制网络流量），
/// 本适配器只把目标递过去并取回捕获结果。
pub struct HttpPageAgent {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct SessionCreated {
    session_id: String,
}

impl HttpPageAgent {
    pub fn new(settings: &AgentSettings) -> Result<Self, AgentError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()
            .map_err(|e| AgentError::Transient(e.to_string()))?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl PageAgent for HttpPageAgent {
    async fn open_session(&self, worker_id: Uuid) -> Result<Box<dyn PageSession>, AgentError> {
        let response = self
            .client
            .post(format!("{}/sessions", self.base_url))
            .json(&json!({ "worker_id": worker_id }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AgentError::Transient(format!(
                "边车会话创建失败: HTTP {}",
                response.status()
            )));
        }

        let created: SessionCreated = response.json().await?;
        info!(worker_id = %worker_id, session_id = %created.session_id, "页面交互会话已建立");

        Ok(Box::new(HttpPageSession {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            session_id: created.session_id,
        }))
    }
}

/// 边车上的一个独占交互会话
pub struct HttpPageSession {
    client: reqwest::Client,
    base_url: String,
    session_id: String,
}

#[async_trait]
impl PageSession for HttpPageSession {
    async fn interact(&self, target: &CrawlTarget) -> Result<Harvest, AgentError> {
        let response = self
            .client
            .post(format!(
                "{}/sessions/{}/interact",
                self.base_url, self.session_id
            ))
            .json(&json!({
                "kind": target.kind,
                "locator": target.locator,
                "url": target.access_url,
            }))
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(response.json::<Harvest>().await?),
            // 边车确认远端实体不存在（页面404/频道已删除）
            StatusCode::NOT_FOUND | StatusCode::GONE => Err(AgentError::ResourceAbsent),
            status => Err(AgentError::Transient(format!(
                "边车交互失败: HTTP {}",
                status
            ))),
        }
    }
}

impl Drop for HttpPageSession {
    fn drop(&mut self) {
        // 尽力通知边车释放浏览器/代理资源对
        let client = self.client.clone();
        let url = format!("{}/sessions/{}", self.base_url, self.session_id);
        let session_id = self.session_id.clone();
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                if let Err(err) = client.delete(&url).send().await {
                    warn!(session_id = %session_id, error = %err, "边车会话释放请求失败");
                }
            });
        }
    }
}
