// Copyright (c) 2026 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm::entity::prelude::*;

/// 频道快照数据库实体模型
///
/// 对应 channel_crawl 表，以 (channel_id, crawl_date) 为复合主键
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "channel_crawl")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub channel_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub crawl_date: Date,
    pub channel_name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub subscriber_count: i64,
    pub video_count: i64,
    pub view_count: i64,
    pub joined_date: Option<Date>,
    pub country: String,
    pub canonical_base_url: String,
    pub avatar_url: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
