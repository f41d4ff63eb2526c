// Copyright (c) 2026 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 响应体的传输编码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ContentEncoding {
    /// 明文文本
    #[default]
    None,
    /// base64编码的二进制内容
    Base64,
}

/// 响应体的压缩算法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Compression {
    /// 未压缩
    #[serde(rename = "none")]
    #[default]
    None,
    /// brotli压缩
    #[serde(rename = "br")]
    Brotli,
}

/// 捕获的HTTP头
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedHeader {
    pub name: String,
    pub value: String,
}

/// 捕获的网络事务
///
/// 页面交互代理在一次会话中记录的单个请求/响应对。同一逻辑响应
/// 可能因轮询被重复观测到，摄取管线按内容哈希去重。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapturedTransaction {
    /// 请求URL
    pub request_url: String,
    /// HTTP方法
    pub method: String,
    /// 请求发起时间
    pub started_at: DateTime<Utc>,
    /// 响应体（明文或base64文本，见 `encoding`）
    pub body: String,
    /// 响应体编码
    #[serde(default)]
    pub encoding: ContentEncoding,
    /// 响应体压缩
    #[serde(default)]
    pub compression: Compression,
    /// 响应头
    #[serde(default)]
    pub headers: Vec<CapturedHeader>,
}

impl CapturedTransaction {
    /// 检查某个响应头是否包含给定值（大小写不敏感）
    pub fn header_contains(&self, name: &str, needle: &str) -> bool {
        self.headers.iter().any(|h| {
            h.name.eq_ignore_ascii_case(name) && h.value.to_lowercase().contains(needle)
        })
    }
}
