// Copyright (c) 2026 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub use sea_orm_migration::prelude::*;

mod m20260601_000001_create_channel_base;
mod m20260601_000002_create_key_words;
mod m20260601_000003_create_search_urls;
mod m20260601_000004_create_videos;
mod m20260601_000005_create_channel_crawl;
mod m20260601_000006_create_channel_blacklist;

/// 数据库迁移器
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    /// 获取所有迁移
    ///
    /// # 返回值
    ///
    /// 返回迁移列表
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260601_000001_create_channel_base::Migration),
            Box::new(m20260601_000002_create_key_words::Migration),
            Box::new(m20260601_000003_create_search_urls::Migration),
            Box::new(m20260601_000004_create_videos::Migration),
            Box::new(m20260601_000005_create_channel_crawl::Migration),
            Box::new(m20260601_000006_create_channel_blacklist::Migration),
        ]
    }
}
