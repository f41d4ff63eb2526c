// Copyright (c) 2026 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect, Set};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;

use crate::domain::models::channel::ChannelSnapshot;
use crate::domain::repositories::channel_repository::{
    ChannelRepository, SnapshotOutcome,
};
use crate::domain::repositories::RepositoryError;
use crate::infrastructure::database::entities::{channel_base, channel_blacklist, channel_crawl};

/// 频道仓库实现
pub struct ChannelRepositoryImpl {
    db: Arc<DatabaseConnection>,
}

impl ChannelRepositoryImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ChannelRepository for ChannelRepositoryImpl {
    async fn load_blacklist(&self) -> Result<HashSet<String>, RepositoryError> {
        let ids: Vec<String> = channel_blacklist::Entity::find()
            .select_only()
            .column(channel_blacklist::Column::ChannelId)
            .into_tuple()
            .all(self.db.as_ref())
            .await?;
        Ok(ids.into_iter().collect())
    }

    async fn insert_snapshot(
        &self,
        snapshot: &ChannelSnapshot,
    ) -> Result<SnapshotOutcome, RepositoryError> {
        if snapshot.channel_id.is_empty() {
            return Err(RepositoryError::InvalidParameter(
                "channel_id为空".to_string(),
            ));
        }

        let blacklist = self.load_blacklist().await?;
        if blacklist.contains(&snapshot.channel_id) {
            return Ok(SnapshotOutcome::SkippedBlacklisted);
        }

        let exists = channel_crawl::Entity::find()
            .filter(channel_crawl::Column::ChannelId.eq(snapshot.channel_id.clone()))
            .filter(channel_crawl::Column::CrawlDate.eq(snapshot.crawl_date))
            .one(self.db.as_ref())
            .await?
            .is_some();

        let model = channel_crawl::ActiveModel {
            channel_id: Set(snapshot.channel_id.clone()),
            crawl_date: Set(snapshot.crawl_date),
            channel_name: Set(snapshot.channel_name.clone()),
            description: Set(snapshot.description.clone()),
            subscriber_count: Set(snapshot.subscriber_count),
            video_count: Set(snapshot.video_count),
            view_count: Set(snapshot.view_count),
            joined_date: Set(snapshot.joined_date),
            country: Set(snapshot.country.clone()),
            canonical_base_url: Set(snapshot.canonical_url.clone()),
            avatar_url: Set(snapshot.avatar_url.clone()),
        };

        channel_crawl::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([
                    channel_crawl::Column::ChannelId,
                    channel_crawl::Column::CrawlDate,
                ])
                .update_columns([
                    channel_crawl::Column::ChannelName,
                    channel_crawl::Column::Description,
                    channel_crawl::Column::SubscriberCount,
                    channel_crawl::Column::VideoCount,
                    channel_crawl::Column::ViewCount,
                    channel_crawl::Column::JoinedDate,
                    channel_crawl::Column::Country,
                    channel_crawl::Column::CanonicalBaseUrl,
                    channel_crawl::Column::AvatarUrl,
                ])
                .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await?;

        info!(channel_id = %snapshot.channel_id, crawl_date = %snapshot.crawl_date, "频道快照已落库");
        Ok(if exists {
            SnapshotOutcome::Updated
        } else {
            SnapshotOutcome::Inserted
        })
    }

    async fn update_registry(&self, snapshot: &ChannelSnapshot) -> Result<(), RepositoryError> {
        channel_base::Entity::update_many()
            .col_expr(
                channel_base::Column::ChannelName,
                Expr::value(snapshot.channel_name.clone()),
            )
            .col_expr(
                channel_base::Column::AvatarUrl,
                Expr::value(snapshot.avatar_url.clone()),
            )
            .col_expr(
                channel_base::Column::Description,
                Expr::value(snapshot.description.clone()),
            )
            .col_expr(channel_base::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(channel_base::Column::ChannelId.eq(snapshot.channel_id.clone()))
            .exec(self.db.as_ref())
            .await?;

        Ok(())
    }
}
