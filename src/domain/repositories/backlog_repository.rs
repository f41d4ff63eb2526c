// Copyright (c) 2026 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;

use crate::domain::models::target::{CrawlTarget, TargetKind};
use crate::domain::repositories::RepositoryError;

/// 积压仓库接口
///
/// 所有工作器间的协调都经由这里的事务性领取操作完成，
/// 进程内不存在任何共享的可变状态。
#[async_trait]
pub trait BacklogRepository: Send + Sync {
    /// 领取一个当天尚未处理的目标（单次尝试）
    ///
    /// 在可串行化事务内用排他行锁选出一个符合条件的目标——
    /// 未拉黑且今天未被领取——按基准优先、从未爬取优先、
    /// 最久未爬取优先的顺序，并在同一事务内把领取日期置为今天。
    ///
    /// 写写冲突以 `RepositoryError::is_conflict()` 可识别的错误返回，
    /// 由调用方的乐观领取原语负责退避重试。
    async fn claim_next(&self, kind: TargetKind) -> Result<Option<CrawlTarget>, RepositoryError>;

    /// 退役一个已确认远端不存在的目标
    ///
    /// 与瞬时失败不同：瞬时失败不改变目标状态（明天自然重新可领），
    /// 而确认缺失的目标被永久移出积压。
    async fn release_as_missing(&self, target: &CrawlTarget) -> Result<(), RepositoryError>;

    /// 注册摄取过程中新发现的频道ID（已存在的忽略）
    ///
    /// 返回实际新增的数量。
    async fn register_channels(&self, channel_ids: &[String]) -> Result<u64, RepositoryError>;
}
