// Copyright (c) 2026 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

/// 相对时间：可选整数 + 单位词 + "前/ago" 结尾标记
static RELATIVE_TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)?\s*(.*?)\s*(前|ago)$").expect("invalid relative time regex"));

/// 三字母月份缩写表
const MONTH_ABBREVIATIONS: [(&str, u32); 12] = [
    ("Jan", 1),
    ("Feb", 2),
    ("Mar", 3),
    ("Apr", 4),
    ("May", 5),
    ("Jun", 6),
    ("Jul", 7),
    ("Aug", 8),
    ("Sep", 9),
    ("Oct", 10),
    ("Nov", 11),
    ("Dec", 12),
];

/// 解析带倍率后缀的数字文本
///
/// 支持"万"（×10,000）与拉丁"K"/"M"（×1,000 / ×1,000,000）后缀，
/// 千分位逗号被剥除，余下部分按浮点解析后取整。解析失败返回0。
fn parse_scaled_number(text: &str) -> i64 {
    let cleaned = text.replace(',', "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return 0;
    }

    let (number_part, multiplier) = if let Some(rest) = cleaned.strip_suffix('万') {
        (rest, 10_000f64)
    } else if let Some(rest) = cleaned.strip_suffix(['K', 'k']) {
        (rest, 1_000f64)
    } else if let Some(rest) = cleaned.strip_suffix(['M', 'm']) {
        (rest, 1_000_000f64)
    } else {
        (cleaned, 1f64)
    };

    number_part
        .trim()
        .parse::<f64>()
        .map(|n| (n * multiplier).round() as i64)
        .unwrap_or(0)
        .max(0)
}

/// 将观看次数字符串转换为整数
///
/// 如"102,717次观看"、"1万次观看"、"无人观看"或"2.5K views"。
/// 任何无法解析的输入得到0，绝不抛错。
pub fn parse_view_count(raw: &str) -> i64 {
    let text = raw.trim();
    if text.is_empty() || text == "无人观看" {
        return 0;
    }

    let mut stripped = text.replace("次观看", "");
    for unit in ["views", "view", "watching"] {
        stripped = stripped.replace(unit, "");
    }

    parse_scaled_number(&stripped)
}

/// 解析频道页的计数文本（订阅者/视频/观看）
///
/// 与观看次数相同的容错策略，单位词不同。
pub fn parse_count_text(raw: &str) -> i64 {
    let mut stripped = raw.trim().to_string();
    for unit in [
        "subscribers",
        "subscriber",
        "videos",
        "video",
        "views",
        "view",
        "位订阅者",
        "个视频",
        "次观看",
    ] {
        stripped = stripped.replace(unit, "");
    }

    parse_scaled_number(&stripped)
}

/// 将相对时间字符串转换为绝对日期
///
/// 如"1个月前"、"2周前"、"3天前"、"3 days ago"。省略数字时按1计。
/// 单位按固定近似换算：年=365天、月=30天、周=7天，不做日历感知。
/// 无法解析的输入返回爬取日期本身。
pub fn parse_relative_time(raw: &str, now: DateTime<Utc>) -> NaiveDate {
    let fallback = now.date_naive();
    let text = raw.trim();
    if text.is_empty() {
        return fallback;
    }

    let captures = match RELATIVE_TIME_RE.captures(text) {
        Some(c) => c,
        None => return fallback,
    };

    let count: i64 = captures
        .get(1)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(1);
    let unit = captures.get(2).map(|m| m.as_str()).unwrap_or("");

    let unit_seconds: i64 = if unit.contains('年') || unit.contains("year") {
        365 * 24 * 3600
    } else if unit.contains("个月") || unit.contains("month") {
        30 * 24 * 3600
    } else if unit.contains('周') || unit.contains("week") {
        7 * 24 * 3600
    } else if unit.contains('天') || unit.contains("day") {
        24 * 3600
    } else if unit.contains("小时") || unit.contains("hour") {
        3600
    } else if unit.contains("分钟") || unit.contains("minute") {
        60
    } else if unit.contains('秒') || unit.contains("second") {
        1
    } else {
        return fallback;
    };

    (now - chrono::Duration::seconds(count * unit_seconds)).date_naive()
}

/// 解析频道加入日期，如 "Joined Mar 5, 2018"
pub fn parse_joined_date(raw: &str) -> Option<NaiveDate> {
    let rest = raw.trim().strip_prefix("Joined")?.replace(',', "");
    let parts: Vec<&str> = rest.split_whitespace().collect();
    if parts.len() < 3 {
        return None;
    }

    let month = MONTH_ABBREVIATIONS
        .iter()
        .find(|(abbr, _)| *abbr == parts[0])
        .map(|(_, number)| *number)
        .unwrap_or(1);
    let day: u32 = parts[1].parse().ok()?;
    let year: i32 = parts[2].parse().ok()?;

    NaiveDate::from_ymd_opt(year, month, day)
}

/// 把绝对规范URL裁剪为站内相对路径
pub fn trim_canonical_url(raw: &str) -> String {
    for prefix in ["https://www.youtube.com", "http://www.youtube.com"] {
        if let Some(rest) = raw.strip_prefix(prefix) {
            return rest.to_string();
        }
    }
    raw.to_string()
}

/// 从规范URL中提取 @handle 段作为频道名
pub fn handle_from_canonical_url(raw: &str) -> Option<String> {
    let (_, after) = raw.split_once('@')?;
    let handle = after.split('/').next().unwrap_or(after);
    if handle.is_empty() {
        None
    } else {
        Some(handle.to_string())
    }
}
