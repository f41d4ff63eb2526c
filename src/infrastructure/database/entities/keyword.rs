// Copyright (c) 2026 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm::entity::prelude::*;

/// 关键词积压数据库实体模型
///
/// 对应 key_words 表，搜索词即主键
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "key_words")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub keyword: String,
    pub is_benchmark: bool,
    pub is_blacklist: bool,
    pub last_crawl_date: Option<Date>,
    pub created_at: ChronoDateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
