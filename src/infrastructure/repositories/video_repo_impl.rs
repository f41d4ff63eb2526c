// Copyright (c) 2026 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect, Set};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;

use crate::domain::models::video::VideoRecord;
use crate::domain::repositories::video_repository::{
    partition_records, UpsertReport, VideoRepository,
};
use crate::domain::repositories::RepositoryError;
use crate::infrastructure::database::entities::{channel_blacklist, video};

/// 视频仓库实现
///
/// 写路径是单条批量upsert：无论记录是新是旧都走同一条
/// `INSERT ... ON CONFLICT DO UPDATE`，新旧分类只用于返回计数，
/// 因此对同一输入重复执行是幂等的。
pub struct VideoRepositoryImpl {
    db: Arc<DatabaseConnection>,
}

impl VideoRepositoryImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    async fn load_blacklist(&self) -> Result<HashSet<String>, RepositoryError> {
        let ids: Vec<String> = channel_blacklist::Entity::find()
            .select_only()
            .column(channel_blacklist::Column::ChannelId)
            .into_tuple()
            .all(self.db.as_ref())
            .await?;
        Ok(ids.into_iter().collect())
    }
}

#[async_trait]
impl VideoRepository for VideoRepositoryImpl {
    async fn batch_upsert(&self, records: &[VideoRecord]) -> Result<UpsertReport, RepositoryError> {
        let blacklist = self.load_blacklist().await?;
        let (eligible, skipped_blacklisted, dropped_invalid) =
            partition_records(records, &blacklist);

        if eligible.is_empty() {
            return Ok(UpsertReport {
                inserted: 0,
                updated: 0,
                skipped_blacklisted,
                dropped_invalid,
            });
        }

        // 同一批记录共享同一个爬取日期，按 (video_id, crawl_date) 查已存在的键
        let crawl_date = eligible[0].crawl_date;
        let ids: Vec<String> = eligible.iter().map(|r| r.video_id.clone()).collect();
        let existing: HashSet<String> = video::Entity::find()
            .select_only()
            .column(video::Column::VideoId)
            .filter(video::Column::CrawlDate.eq(crawl_date))
            .filter(video::Column::VideoId.is_in(ids))
            .into_tuple::<String>()
            .all(self.db.as_ref())
            .await?
            .into_iter()
            .collect();

        let updated = eligible
            .iter()
            .filter(|r| existing.contains(&r.video_id))
            .count() as u64;
        let inserted = eligible.len() as u64 - updated;

        let models: Vec<video::ActiveModel> = eligible
            .iter()
            .map(|record| video::ActiveModel {
                video_id: Set(record.video_id.clone()),
                crawl_date: Set(record.crawl_date),
                title: Set(record.title.clone()),
                view_count: Set(record.view_count),
                published_date: Set(record.published_date),
                channel_id: Set(record.channel_id.clone()),
                channel_name: Set(record.channel_name.clone()),
                canonical_base_url: Set(record.canonical_base_url.clone()),
            })
            .collect();

        video::Entity::insert_many(models)
            .on_conflict(
                OnConflict::columns([video::Column::VideoId, video::Column::CrawlDate])
                    .update_columns([
                        video::Column::Title,
                        video::Column::ViewCount,
                        video::Column::PublishedDate,
                        video::Column::ChannelId,
                        video::Column::ChannelName,
                        video::Column::CanonicalBaseUrl,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await?;

        let report = UpsertReport {
            inserted,
            updated,
            skipped_blacklisted,
            dropped_invalid,
        };
        info!(
            inserted = report.inserted,
            updated = report.updated,
            skipped_blacklisted = report.skipped_blacklisted,
            dropped_invalid = report.dropped_invalid,
            "视频批量落库完成"
        );

        Ok(report)
    }
}
