// Copyright (c) 2026 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm::entity::prelude::*;

/// 基准URL积压数据库实体模型
///
/// 对应 search_urls 表，运营配置的固定入口
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "search_urls")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub url: String,
    /// 入口对应的关键词标注，仅供运营参考
    pub key_words: Option<String>,
    pub is_benchmark: bool,
    pub is_blacklist: bool,
    pub last_crawl_date: Option<Date>,
    pub created_at: ChronoDateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
