// Copyright (c) 2026 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sea_orm::sea_query::{Expr, LockType, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, IsolationLevel,
    Order, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use std::sync::Arc;
use tracing::info;

use crate::domain::models::target::{CrawlTarget, TargetKind};
use crate::domain::repositories::backlog_repository::BacklogRepository;
use crate::domain::repositories::RepositoryError;
use crate::infrastructure::database::entities::{channel_base, keyword, search_url};

/// 积压仓库实现
///
/// 领取协议：可串行化事务内 `SELECT ... FOR UPDATE` 选出一行并在
/// 同一事务内更新领取日期。行级互斥完全由数据库的事务隔离保证，
/// 即使工作器分布在不同进程、不同主机上也成立。
pub struct BacklogRepositoryImpl {
    db: Arc<DatabaseConnection>,
}

impl BacklogRepositoryImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    async fn claim_channel(&self, today: NaiveDate) -> Result<Option<CrawlTarget>, RepositoryError> {
        let txn = self
            .db
            .begin_with_config(Some(IsolationLevel::Serializable), None)
            .await?;

        let row = channel_base::Entity::find()
            .filter(channel_base::Column::IsBlacklist.eq(false))
            .filter(
                Condition::any()
                    .add(channel_base::Column::LastCrawlDate.is_null())
                    .add(channel_base::Column::LastCrawlDate.ne(today)),
            )
            .order_by_desc(channel_base::Column::IsBenchmark)
            .order_by(
                Expr::col(channel_base::Column::LastCrawlDate).is_null(),
                Order::Desc,
            )
            .order_by_asc(channel_base::Column::LastCrawlDate)
            .lock(LockType::Update)
            .one(&txn)
            .await?;

        let Some(row) = row else {
            txn.commit().await?;
            return Ok(None);
        };

        let target = CrawlTarget {
            kind: TargetKind::Channel,
            locator: row.channel_id.clone(),
            priority: row.is_benchmark,
            last_claimed: row.last_crawl_date,
            access_url: CrawlTarget::derive_access_url(TargetKind::Channel, &row.channel_id),
        };

        let mut active: channel_base::ActiveModel = row.into();
        active.last_crawl_date = Set(Some(today));
        active.updated_at = Set(Utc::now().into());
        active.update(&txn).await?;

        txn.commit().await?;
        Ok(Some(target))
    }

    async fn claim_keyword(&self, today: NaiveDate) -> Result<Option<CrawlTarget>, RepositoryError> {
        let txn = self
            .db
            .begin_with_config(Some(IsolationLevel::Serializable), None)
            .await?;

        let row = keyword::Entity::find()
            .filter(keyword::Column::IsBlacklist.eq(false))
            .filter(
                Condition::any()
                    .add(keyword::Column::LastCrawlDate.is_null())
                    .add(keyword::Column::LastCrawlDate.ne(today)),
            )
            .order_by_desc(keyword::Column::IsBenchmark)
            .order_by(
                Expr::col(keyword::Column::LastCrawlDate).is_null(),
                Order::Desc,
            )
            .order_by_asc(keyword::Column::LastCrawlDate)
            .lock(LockType::Update)
            .one(&txn)
            .await?;

        let Some(row) = row else {
            txn.commit().await?;
            return Ok(None);
        };

        let target = CrawlTarget {
            kind: TargetKind::Keyword,
            locator: row.keyword.clone(),
            priority: row.is_benchmark,
            last_claimed: row.last_crawl_date,
            access_url: CrawlTarget::derive_access_url(TargetKind::Keyword, &row.keyword),
        };

        let mut active: keyword::ActiveModel = row.into();
        active.last_crawl_date = Set(Some(today));
        active.update(&txn).await?;

        txn.commit().await?;
        Ok(Some(target))
    }

    async fn claim_search_url(
        &self,
        today: NaiveDate,
    ) -> Result<Option<CrawlTarget>, RepositoryError> {
        let txn = self
            .db
            .begin_with_config(Some(IsolationLevel::Serializable), None)
            .await?;

        let row = search_url::Entity::find()
            .filter(search_url::Column::IsBlacklist.eq(false))
            .filter(
                Condition::any()
                    .add(search_url::Column::LastCrawlDate.is_null())
                    .add(search_url::Column::LastCrawlDate.ne(today)),
            )
            .order_by_desc(search_url::Column::IsBenchmark)
            .order_by(
                Expr::col(search_url::Column::LastCrawlDate).is_null(),
                Order::Desc,
            )
            .order_by_asc(search_url::Column::LastCrawlDate)
            .lock(LockType::Update)
            .one(&txn)
            .await?;

        let Some(row) = row else {
            txn.commit().await?;
            return Ok(None);
        };

        let target = CrawlTarget {
            kind: TargetKind::BenchmarkUrl,
            locator: row.url.clone(),
            priority: row.is_benchmark,
            last_claimed: row.last_crawl_date,
            access_url: CrawlTarget::derive_access_url(TargetKind::BenchmarkUrl, &row.url),
        };

        let mut active: search_url::ActiveModel = row.into();
        active.last_crawl_date = Set(Some(today));
        active.update(&txn).await?;

        txn.commit().await?;
        Ok(Some(target))
    }
}

#[async_trait]
impl BacklogRepository for BacklogRepositoryImpl {
    async fn claim_next(&self, kind: TargetKind) -> Result<Option<CrawlTarget>, RepositoryError> {
        let today = Utc::now().date_naive();
        let claimed = match kind {
            TargetKind::Channel => self.claim_channel(today).await?,
            TargetKind::Keyword => self.claim_keyword(today).await?,
            TargetKind::BenchmarkUrl => self.claim_search_url(today).await?,
        };

        if let Some(target) = &claimed {
            info!(
                kind = %target.kind,
                locator = %target.locator,
                priority = target.priority,
                last_claimed = ?target.last_claimed,
                "已领取爬取目标"
            );
        }

        Ok(claimed)
    }

    async fn release_as_missing(&self, target: &CrawlTarget) -> Result<(), RepositoryError> {
        match target.kind {
            TargetKind::Channel => {
                channel_base::Entity::delete_by_id(target.locator.clone())
                    .exec(self.db.as_ref())
                    .await?;
            }
            TargetKind::Keyword => {
                keyword::Entity::delete_by_id(target.locator.clone())
                    .exec(self.db.as_ref())
                    .await?;
            }
            TargetKind::BenchmarkUrl => {
                search_url::Entity::delete_by_id(target.locator.clone())
                    .exec(self.db.as_ref())
                    .await?;
            }
        }

        info!(kind = %target.kind, locator = %target.locator, "目标确认缺失，已从积压中退役");
        Ok(())
    }

    async fn register_channels(&self, channel_ids: &[String]) -> Result<u64, RepositoryError> {
        if channel_ids.is_empty() {
            return Ok(0);
        }

        let now = Utc::now();
        let models: Vec<channel_base::ActiveModel> = channel_ids
            .iter()
            .map(|channel_id| channel_base::ActiveModel {
                channel_id: Set(channel_id.clone()),
                channel_name: Set(None),
                avatar_url: Set(None),
                description: Set(None),
                is_benchmark: Set(false),
                is_blacklist: Set(false),
                last_crawl_date: Set(None),
                created_at: Set(now.into()),
                updated_at: Set(now.into()),
            })
            .collect();

        let inserted = channel_base::Entity::insert_many(models)
            .on_conflict(
                OnConflict::column(channel_base::Column::ChannelId)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await?;

        Ok(inserted)
    }
}
