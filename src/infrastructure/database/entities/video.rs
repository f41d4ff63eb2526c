// Copyright (c) 2026 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm::entity::prelude::*;

/// 视频时间序列数据库实体模型
///
/// 对应 videos 表，以 (video_id, crawl_date) 为复合主键：
/// 同一视频每天一行，重复摄取同一天的扫描覆盖更新
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "videos")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub video_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub crawl_date: Date,
    pub title: String,
    pub view_count: i64,
    pub published_date: Date,
    pub channel_id: String,
    pub channel_name: String,
    pub canonical_base_url: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
