// Copyright (c) 2026 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use std::collections::HashSet;

use crate::domain::models::video::VideoRecord;
use crate::domain::repositories::RepositoryError;

/// 批量落库的结果统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertReport {
    /// 新插入的行数
    pub inserted: u64,
    /// 覆盖更新的行数
    pub updated: u64,
    /// 因频道被拉黑而跳过的记录数
    pub skipped_blacklisted: u64,
    /// 因缺失必要字段而丢弃的记录数
    pub dropped_invalid: u64,
}

/// 视频仓库接口
#[async_trait]
pub trait VideoRepository: Send + Sync {
    /// 批量落库视频记录
    ///
    /// 同一输入重复执行是幂等的：`(video_id, crawl_date)` 冲突时覆盖更新，
    /// 新旧分类只影响返回的计数，不影响写路径。单条坏记录不会使整批失败。
    async fn batch_upsert(&self, records: &[VideoRecord]) -> Result<UpsertReport, RepositoryError>;
}

/// 按黑名单与必要字段切分输入记录
///
/// 返回 `(可入库记录, 跳过的拉黑记录数, 丢弃的无效记录数)`。
/// 纯函数，便于脱离存储引擎单测。
pub fn partition_records<'a>(
    records: &'a [VideoRecord],
    blacklist: &HashSet<String>,
) -> (Vec<&'a VideoRecord>, u64, u64) {
    let mut eligible = Vec::with_capacity(records.len());
    let mut skipped_blacklisted = 0u64;
    let mut dropped_invalid = 0u64;

    for record in records {
        if !record.is_valid() {
            dropped_invalid += 1;
            continue;
        }
        if blacklist.contains(&record.channel_id) {
            skipped_blacklisted += 1;
            continue;
        }
        eligible.push(record);
    }

    (eligible, skipped_blacklisted, dropped_invalid)
}
