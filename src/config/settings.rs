// Copyright (c) 2026 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// 应用程序配置设置
///
/// 包含数据库、页面交互边车和爬取调度等所有配置项
#[derive(Debug, Deserialize)]
pub struct Settings {
    /// 数据库配置
    pub database: DatabaseSettings,
    /// 页面交互边车配置
    pub agent: AgentSettings,
    /// 爬取调度配置
    pub crawler: CrawlerSettings,
}

/// 数据库配置设置
#[derive(Debug, Deserialize)]
pub struct DatabaseSettings {
    /// 数据库连接URL
    pub url: String,
    /// 最大连接数
    pub max_connections: Option<u32>,
    /// 最小连接数
    pub min_connections: Option<u32>,
    /// 连接超时时间（秒）
    pub connect_timeout: Option<u64>,
    /// 空闲连接超时时间（秒）
    pub idle_timeout: Option<u64>,
}

/// 页面交互边车配置设置
#[derive(Debug, Deserialize)]
pub struct AgentSettings {
    /// 边车服务地址
    pub base_url: String,
    /// 单次请求超时时间（秒），页面交互可能长时间阻塞
    pub request_timeout_secs: u64,
}

/// 爬取调度配置设置
#[derive(Debug, Deserialize)]
pub struct CrawlerSettings {
    /// 频道工作器池大小
    pub channel_workers: usize,
    /// 关键词工作器池大小
    pub keyword_workers: usize,
    /// 基准URL工作器池大小
    pub benchmark_workers: usize,
    /// 积压为空时的等待时间（秒）
    pub idle_wait_secs: u64,
    /// 目标之间的间隔时间（秒）
    pub target_delay_secs: u64,
    /// 关停时等待工作器收尾的宽限时间（秒）
    pub shutdown_grace_secs: u64,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 从环境变量加载配置，支持默认值
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Config::builder()
            // Default DB pool settings
            .set_default("database.max_connections", 20)?
            .set_default("database.min_connections", 2)?
            .set_default("database.connect_timeout", 10)?
            .set_default("database.idle_timeout", 300)?
            // Default agent settings
            .set_default("agent.base_url", "http://127.0.0.1:8550")?
            .set_default("agent.request_timeout_secs", 600)?
            // Default crawler settings
            .set_default("crawler.channel_workers", 2)?
            .set_default("crawler.keyword_workers", 1)?
            .set_default("crawler.benchmark_workers", 1)?
            .set_default("crawler.idle_wait_secs", 300)?
            .set_default("crawler.target_delay_secs", 2)?
            .set_default("crawler.shutdown_grace_secs", 30)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("YTHARVEST").separator("__"));

        builder.build()?.try_deserialize()
    }
}
