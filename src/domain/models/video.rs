// Copyright (c) 2026 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 视频记录
///
/// 一次扫描中观测到的单个视频，以 `(video_id, crawl_date)` 为自然键
/// 构成时间序列：同一视频在多天的扫描中产生多行，用于趋势分析。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRecord {
    /// 视频ID
    pub video_id: String,
    /// 视频标题
    pub title: String,
    /// 观看次数
    pub view_count: i64,
    /// 发布日期（由相对时间推算）
    pub published_date: NaiveDate,
    /// 所属频道ID
    pub channel_id: String,
    /// 所属频道名称
    pub channel_name: String,
    /// 频道规范URL（站内相对路径）
    pub canonical_base_url: String,
    /// 爬取日期
    pub crawl_date: NaiveDate,
}

impl VideoRecord {
    /// 记录是否满足入库的最低要求
    pub fn is_valid(&self) -> bool {
        !self.video_id.is_empty()
    }
}
