// Copyright (c) 2026 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use std::collections::HashSet;

use crate::domain::models::channel::ChannelSnapshot;
use crate::domain::repositories::RepositoryError;

/// 频道快照落库结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotOutcome {
    /// 当天首次观测，新插入
    Inserted,
    /// 同一天重复摄取，覆盖更新
    Updated,
    /// 频道被拉黑，跳过
    SkippedBlacklisted,
}

/// 频道仓库接口
///
/// 同时服务两类数据：`channel_crawl` 历史快照（append-mostly 时间序列）
/// 和 `channel_base` 注册表（当前状态，随每次成功爬取刷新）。
#[async_trait]
pub trait ChannelRepository: Send + Sync {
    /// 加载频道黑名单
    async fn load_blacklist(&self) -> Result<HashSet<String>, RepositoryError>;

    /// 落库一条频道快照，`(channel_id, crawl_date)` 冲突时覆盖更新
    async fn insert_snapshot(
        &self,
        snapshot: &ChannelSnapshot,
    ) -> Result<SnapshotOutcome, RepositoryError>;

    /// 用最新观测刷新注册表中的描述性字段（名称、头像、简介）
    async fn update_registry(&self, snapshot: &ChannelSnapshot) -> Result<(), RepositoryError>;
}
