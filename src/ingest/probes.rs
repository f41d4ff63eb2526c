// Copyright (c) 2026 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::debug;

use crate::domain::models::channel::ChannelSnapshot;
use crate::domain::models::video::VideoRecord;
use crate::ingest::convert;

/// 单次扫描的提取上下文
///
/// 携带爬取时刻（相对时间换算基准）以及代理从渲染页面
/// 直接观测到的辅助字段。
#[derive(Debug, Clone)]
pub struct ScanContext {
    /// 爬取时刻
    pub crawl_time: DateTime<Utc>,
    /// 页面观测到的频道显示名，优先于JSON内的名称
    pub page_channel_name: Option<String>,
    /// 页面观测到的头像URL
    pub avatar_url: Option<String>,
}

impl ScanContext {
    pub fn new(crawl_time: DateTime<Utc>) -> Self {
        Self {
            crawl_time,
            page_channel_name: None,
            avatar_url: None,
        }
    }
}

/// 提取结果
#[derive(Debug, Clone)]
pub enum Extraction {
    /// 视频记录列表（搜索页/短视频流）
    Videos(Vec<VideoRecord>),
    /// 频道快照（频道简介页）
    Channel(ChannelSnapshot),
}

/// 形态探针
///
/// `matches` 是纯结构性判断，`extract` 返回 `Option` 而非抛错。
/// 站点对同一逻辑数据按请求变体返回结构不同的载荷，探针按
/// 固定顺序逐一尝试，第一个结构匹配者负责提取。
pub struct ShapeProbe {
    pub name: &'static str,
    matches: fn(&Value) -> bool,
    extract: fn(&Value, &ScanContext) -> Option<Extraction>,
}

/// 已知载荷形态，按尝试顺序排列
pub const PROBES: &[ShapeProbe] = &[
    ShapeProbe {
        name: "initial_search",
        matches: matches_initial_search,
        extract: extract_initial_search,
    },
    ShapeProbe {
        name: "continuation_search",
        matches: matches_continuation_search,
        extract: extract_continuation_search,
    },
    ShapeProbe {
        name: "channel_about",
        matches: matches_channel_about,
        extract: extract_channel_about,
    },
    ShapeProbe {
        name: "shorts_feed",
        matches: matches_shorts_feed,
        extract: extract_shorts_feed,
    },
];

/// 分类并提取一个已解析的JSON载荷
///
/// 没有探针匹配时返回 `None`，由调用方记录并丢弃该事务。
pub fn classify_and_extract(root: &Value, ctx: &ScanContext) -> Option<(&'static str, Extraction)> {
    for probe in PROBES {
        if (probe.matches)(root) {
            debug!(probe = probe.name, "载荷形态匹配");
            return (probe.extract)(root, ctx).map(|extraction| (probe.name, extraction));
        }
    }
    None
}

const INITIAL_SEARCH_ITEMS: &str = "/onResponseReceivedCommands/0/reloadContinuationItemsCommand\
/continuationItems/0/twoColumnSearchResultsRenderer/primaryContents/sectionListRenderer\
/contents/0/itemSectionRenderer/contents";

const CONTINUATION_SEARCH_ITEMS: &str =
    "/onResponseReceivedCommands/0/appendContinuationItemsAction/continuationItems/0\
/itemSectionRenderer/contents";

const SHORTS_CONTINUATION_ITEMS: &str =
    "/onResponseReceivedActions/0/appendContinuationItemsAction/continuationItems";

const SHORTS_INITIAL_ITEMS: &str = "/contents/twoColumnBrowseResultsRenderer/tabs/0/tabRenderer\
/content/richGridRenderer/contents";

fn matches_initial_search(root: &Value) -> bool {
    root.pointer(INITIAL_SEARCH_ITEMS)
        .map_or(false, Value::is_array)
}

fn matches_continuation_search(root: &Value) -> bool {
    root.pointer(CONTINUATION_SEARCH_ITEMS)
        .map_or(false, Value::is_array)
}

fn matches_channel_about(root: &Value) -> bool {
    find_about_view_model(root).is_some()
        || root
            .pointer("/metadata/channelMetadataRenderer")
            .map_or(false, Value::is_object)
}

fn matches_shorts_feed(root: &Value) -> bool {
    shorts_items(root).map_or(false, |items| {
        items
            .iter()
            .any(|item| item.pointer("/richItemRenderer/content/reelItemRenderer").is_some())
    })
}

fn extract_initial_search(root: &Value, ctx: &ScanContext) -> Option<Extraction> {
    let items = root.pointer(INITIAL_SEARCH_ITEMS)?.as_array()?;
    Some(Extraction::Videos(extract_video_renderers(items, ctx)))
}

fn extract_continuation_search(root: &Value, ctx: &ScanContext) -> Option<Extraction> {
    let items = root.pointer(CONTINUATION_SEARCH_ITEMS)?.as_array()?;
    Some(Extraction::Videos(extract_video_renderers(items, ctx)))
}

fn extract_channel_about(root: &Value, ctx: &ScanContext) -> Option<Extraction> {
    let about = find_about_view_model(root)
        .or_else(|| root.pointer("/metadata/channelMetadataRenderer"))?;
    extract_channel_snapshot(about, ctx).map(Extraction::Channel)
}

fn extract_shorts_feed(root: &Value, ctx: &ScanContext) -> Option<Extraction> {
    let items = shorts_items(root)?;
    let crawl_date = ctx.crawl_time.date_naive();
    let mut videos = Vec::new();

    for item in items {
        let reel = match item.pointer("/richItemRenderer/content/reelItemRenderer") {
            Some(reel) => reel,
            None => continue,
        };
        let video_id = match reel.get("videoId").and_then(Value::as_str) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => continue,
        };

        // 短视频流条目不携带频道与发布时间信息
        videos.push(VideoRecord {
            video_id,
            title: reel
                .pointer("/headline/simpleText")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            view_count: convert::parse_view_count(
                reel.pointer("/viewCountText/simpleText")
                    .and_then(Value::as_str)
                    .unwrap_or_default(),
            ),
            published_date: crawl_date,
            channel_id: String::new(),
            channel_name: String::new(),
            canonical_base_url: String::new(),
            crawl_date,
        });
    }

    Some(Extraction::Videos(videos))
}

/// 在 onResponseReceivedEndpoints 中查找 aboutChannelViewModel
fn find_about_view_model(root: &Value) -> Option<&Value> {
    let endpoints = root.get("onResponseReceivedEndpoints")?.as_array()?;
    for endpoint in endpoints {
        let items = match endpoint
            .pointer("/appendContinuationItemsAction/continuationItems")
            .and_then(Value::as_array)
        {
            Some(items) => items,
            None => continue,
        };
        for item in items {
            if let Some(about) =
                item.pointer("/aboutChannelRenderer/metadata/aboutChannelViewModel")
            {
                return Some(about);
            }
        }
    }
    None
}

fn shorts_items(root: &Value) -> Option<&Vec<Value>> {
    root.pointer(SHORTS_CONTINUATION_ITEMS)
        .or_else(|| root.pointer(SHORTS_INITIAL_ITEMS))
        .and_then(Value::as_array)
}

/// 从 itemSectionRenderer 的内容数组中提取所有 videoRenderer
fn extract_video_renderers(items: &[Value], ctx: &ScanContext) -> Vec<VideoRecord> {
    let crawl_date = ctx.crawl_time.date_naive();
    let mut videos = Vec::new();

    for item in items {
        let renderer = match item.get("videoRenderer") {
            Some(renderer) => renderer,
            // 搜索结果里混有广告位和分隔条目
            None => continue,
        };
        let video_id = match renderer.get("videoId").and_then(Value::as_str) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => continue,
        };

        let byline = renderer.pointer("/longBylineText/runs/0");
        let browse_endpoint = byline.and_then(|b| b.pointer("/navigationEndpoint/browseEndpoint"));

        videos.push(VideoRecord {
            video_id,
            title: renderer
                .pointer("/title/runs/0/text")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            view_count: convert::parse_view_count(
                renderer
                    .pointer("/viewCountText/simpleText")
                    .and_then(Value::as_str)
                    .unwrap_or_default(),
            ),
            published_date: convert::parse_relative_time(
                renderer
                    .pointer("/publishedTimeText/simpleText")
                    .and_then(Value::as_str)
                    .unwrap_or_default(),
                ctx.crawl_time,
            ),
            channel_id: browse_endpoint
                .and_then(|e| e.get("browseId"))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            channel_name: byline
                .and_then(|b| b.get("text"))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            canonical_base_url: browse_endpoint
                .and_then(|e| e.get("canonicalBaseUrl"))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            crawl_date,
        });
    }

    videos
}

/// 文本字段在不同形态里可能是纯字符串、{simpleText} 或 {content}
fn text_of(value: &Value) -> Option<&str> {
    match value {
        Value::String(s) => Some(s.as_str()),
        Value::Object(_) => value
            .get("simpleText")
            .and_then(Value::as_str)
            .or_else(|| value.get("content").and_then(Value::as_str)),
        _ => None,
    }
}

fn field_text<'a>(object: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|key| object.get(*key).and_then(text_of))
        .find(|s| !s.is_empty())
}

/// 从 aboutChannelViewModel / channelMetadataRenderer 提取频道快照
fn extract_channel_snapshot(about: &Value, ctx: &ScanContext) -> Option<ChannelSnapshot> {
    let channel_id = about
        .get("channelId")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())?
        .to_string();

    let canonical_raw = field_text(about, &["canonicalChannelUrl", "canonicalBaseUrl"]).unwrap_or("");

    let mut channel_name = convert::handle_from_canonical_url(canonical_raw)
        .or_else(|| field_text(about, &["title"]).map(String::from))
        .unwrap_or_default();
    // 页面观测到的显示名总是最权威的
    if let Some(page_name) = &ctx.page_channel_name {
        channel_name = page_name.clone();
    }

    Some(ChannelSnapshot {
        channel_id,
        channel_name,
        description: field_text(about, &["description"])
            .unwrap_or_default()
            .chars()
            .take(1000)
            .collect(),
        subscriber_count: convert::parse_count_text(
            field_text(about, &["subscriberCountText", "subscriberCount"]).unwrap_or_default(),
        ),
        video_count: convert::parse_count_text(
            field_text(about, &["videoCountText", "videoCount"]).unwrap_or_default(),
        ),
        view_count: convert::parse_count_text(
            field_text(about, &["viewCountText", "viewCount"]).unwrap_or_default(),
        ),
        joined_date: field_text(about, &["joinedDateText"])
            .and_then(convert::parse_joined_date),
        country: field_text(about, &["country"])
            .unwrap_or_default()
            .chars()
            .take(50)
            .collect(),
        canonical_url: convert::trim_canonical_url(canonical_raw),
        avatar_url: ctx.avatar_url.clone(),
        crawl_date: ctx.crawl_time.date_naive(),
    })
}
