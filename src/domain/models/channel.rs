// Copyright (c) 2026 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 频道快照
///
/// 一次扫描中观测到的频道状态，以 `(channel_id, crawl_date)` 为自然键。
/// 快照表回答"某天观测到了什么"，注册表（channel_base）回答"频道现在是什么"。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelSnapshot {
    /// 频道ID
    pub channel_id: String,
    /// 频道名称
    pub channel_name: String,
    /// 频道简介（截断至1000字符）
    pub description: String,
    /// 订阅者数量
    pub subscriber_count: i64,
    /// 视频数量
    pub video_count: i64,
    /// 总观看次数
    pub view_count: i64,
    /// 加入日期
    pub joined_date: Option<NaiveDate>,
    /// 国家/地区（截断至50字符）
    pub country: String,
    /// 频道规范URL（站内相对路径）
    pub canonical_url: String,
    /// 头像URL（来自页面观测）
    pub avatar_url: Option<String>,
    /// 爬取日期
    pub crawl_date: NaiveDate,
}

/// 频道注册表条目
///
/// channel_base 表的一行：既是频道类积压的爬取目标，也持有频道的
/// 当前描述性字段（名称、头像、简介），由每次成功爬取刷新。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelRegistryEntry {
    /// 频道ID
    pub channel_id: String,
    /// 频道名称
    pub channel_name: Option<String>,
    /// 头像URL
    pub avatar_url: Option<String>,
    /// 频道简介
    pub description: Option<String>,
    /// 是否为基准频道
    pub is_benchmark: bool,
    /// 是否已被拉黑
    pub is_blacklist: bool,
    /// 上次爬取日期
    pub last_crawl_date: Option<NaiveDate>,
}
