// Copyright (c) 2026 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 数据库实体模块
///
/// SeaORM实体定义，对应各张数据表
pub mod channel_base;
pub mod channel_blacklist;
pub mod channel_crawl;
pub mod keyword;
pub mod search_url;
pub mod video;
