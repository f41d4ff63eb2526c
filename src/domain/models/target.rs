// Copyright (c) 2026 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 爬取目标类型枚举
///
/// 每种类型对应一张独立的积压表和一个独立的工作器池。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    /// 频道目标，按频道ID爬取其短视频列表和频道信息
    #[default]
    Channel,
    /// 关键词目标，通过站内搜索页触发搜索API
    Keyword,
    /// 基准URL目标，运营配置的高优先级固定入口
    BenchmarkUrl,
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TargetKind::Channel => write!(f, "channel"),
            TargetKind::Keyword => write!(f, "keyword"),
            TargetKind::BenchmarkUrl => write!(f, "benchmark_url"),
        }
    }
}

impl FromStr for TargetKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "channel" => Ok(TargetKind::Channel),
            "keyword" => Ok(TargetKind::Keyword),
            "benchmark_url" => Ok(TargetKind::BenchmarkUrl),
            _ => Err(()),
        }
    }
}

/// 爬取目标
///
/// 积压表中的一行，表示一个待处理的爬取单元。`locator`是目标的
/// 不透明标识（频道ID、搜索词或基准URL），`access_url`是领取时
/// 派生出的实际访问地址。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlTarget {
    /// 目标类型
    pub kind: TargetKind,
    /// 目标定位符（频道ID / 搜索词 / URL）
    pub locator: String,
    /// 是否为基准目标，基准目标优先领取
    pub priority: bool,
    /// 上次领取日期，同一天内不会被再次领取
    pub last_claimed: Option<chrono::NaiveDate>,
    /// 派生的访问地址
    pub access_url: String,
}

impl CrawlTarget {
    /// 根据目标类型派生访问地址
    pub fn derive_access_url(kind: TargetKind, locator: &str) -> String {
        match kind {
            TargetKind::Channel => {
                format!("https://www.youtube.com/channel/{}/shorts", locator)
            }
            TargetKind::Keyword => format!(
                "https://www.youtube.com/results?search_query={}",
                urlencoding::encode(locator)
            ),
            TargetKind::BenchmarkUrl => locator.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_kind_roundtrip() {
        for kind in [
            TargetKind::Channel,
            TargetKind::Keyword,
            TargetKind::BenchmarkUrl,
        ] {
            assert_eq!(kind.to_string().parse::<TargetKind>(), Ok(kind));
        }
        assert!("unknown".parse::<TargetKind>().is_err());
    }

    #[test]
    fn test_derive_access_url() {
        assert_eq!(
            CrawlTarget::derive_access_url(TargetKind::Channel, "UCabc123"),
            "https://www.youtube.com/channel/UCabc123/shorts"
        );
        // 搜索词需要URL编码
        assert_eq!(
            CrawlTarget::derive_access_url(TargetKind::Keyword, "baby fashion show"),
            "https://www.youtube.com/results?search_query=baby%20fashion%20show"
        );
        assert_eq!(
            CrawlTarget::derive_access_url(TargetKind::BenchmarkUrl, "https://example.com/x"),
            "https://example.com/x"
        );
    }
}
