// Copyright (c) 2026 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::agent::Harvest;
use crate::domain::repositories::backlog_repository::BacklogRepository;
use crate::domain::repositories::channel_repository::{ChannelRepository, SnapshotOutcome};
use crate::domain::repositories::video_repository::VideoRepository;
use crate::ingest::decode::decode_transaction;
use crate::ingest::probes::{classify_and_extract, Extraction, ScanContext};

/// 单目标摄取结果统计
#[derive(Debug, Clone, Copy, Default)]
pub struct IngestReport {
    /// 收到的事务总数
    pub transactions: usize,
    /// 内容哈希重复而跳过的事务数
    pub duplicates: usize,
    /// 解码失败的事务数
    pub decode_failures: usize,
    /// JSON解析失败的事务数
    pub parse_failures: usize,
    /// 没有探针匹配的事务数
    pub unmatched: usize,
    /// 提取出的视频记录数
    pub videos_extracted: usize,
    /// 新插入的视频行数
    pub videos_inserted: u64,
    /// 覆盖更新的视频行数
    pub videos_updated: u64,
    /// 因拉黑跳过的视频记录数
    pub skipped_blacklisted: u64,
    /// 因字段缺失丢弃的视频记录数
    pub dropped_invalid: u64,
    /// 落库的频道快照数
    pub channel_snapshots: usize,
    /// 新注册的频道目标数
    pub channels_discovered: u64,
}

/// 响应摄取管线
///
/// 每个领取到的目标对应一个管线实例：内容哈希去重的作用域是
/// 单次扫描会话，跨目标不共享。
pub struct IngestPipeline {
    videos: Arc<dyn VideoRepository>,
    channels: Arc<dyn ChannelRepository>,
    backlog: Arc<dyn BacklogRepository>,
    seen_hashes: HashSet<String>,
}

impl IngestPipeline {
    pub fn new(
        videos: Arc<dyn VideoRepository>,
        channels: Arc<dyn ChannelRepository>,
        backlog: Arc<dyn BacklogRepository>,
    ) -> Self {
        Self {
            videos,
            channels,
            backlog,
            seen_hashes: HashSet::new(),
        }
    }

    /// 以当前时刻为基准摄取一次捕获结果
    pub async fn ingest(&mut self, harvest: &Harvest) -> IngestReport {
        self.ingest_at(harvest, Utc::now()).await
    }

    /// 摄取一次捕获结果
    ///
    /// 逐事务处理：解码 → 哈希去重 → JSON解析 → 形态分类提取 → 落库。
    /// 任何单个事务或记录的失败都只影响它自己，整批继续。
    pub async fn ingest_at(&mut self, harvest: &Harvest, crawl_time: DateTime<Utc>) -> IngestReport {
        let mut report = IngestReport {
            transactions: harvest.transactions.len(),
            ..Default::default()
        };

        let ctx = ScanContext {
            crawl_time,
            page_channel_name: harvest.page_channel_name.clone(),
            avatar_url: harvest.avatar_url.clone(),
        };

        for txn in &harvest.transactions {
            let text = match decode_transaction(txn) {
                Ok(text) => text,
                Err(err) => {
                    warn!(url = %txn.request_url, error = %err, "响应解码失败，跳过该事务");
                    report.decode_failures += 1;
                    continue;
                }
            };

            let digest = hex::encode(Sha256::digest(text.as_bytes()));
            if !self.seen_hashes.insert(digest) {
                debug!(url = %txn.request_url, "响应内容已处理过，跳过");
                report.duplicates += 1;
                continue;
            }

            let json: Value = match serde_json::from_str(&text) {
                Ok(value) => value,
                Err(err) => {
                    warn!(url = %txn.request_url, error = %err, "JSON解析失败，跳过该事务");
                    report.parse_failures += 1;
                    continue;
                }
            };

            match classify_and_extract(&json, &ctx) {
                Some((probe, Extraction::Videos(videos))) => {
                    debug!(probe, count = videos.len(), "提取到视频记录");
                    report.videos_extracted += videos.len();
                    self.sink_videos(&videos, &mut report).await;
                }
                Some((probe, Extraction::Channel(snapshot))) => {
                    debug!(probe, channel_id = %snapshot.channel_id, "提取到频道快照");
                    self.sink_channel(&snapshot, &mut report).await;
                }
                None => {
                    info!(url = %txn.request_url, "未匹配任何已知JSON形态，丢弃该事务");
                    report.unmatched += 1;
                }
            }
        }

        report
    }

    async fn sink_videos(
        &self,
        videos: &[crate::domain::models::video::VideoRecord],
        report: &mut IngestReport,
    ) {
        if videos.is_empty() {
            return;
        }

        match self.videos.batch_upsert(videos).await {
            Ok(upsert) => {
                report.videos_inserted += upsert.inserted;
                report.videos_updated += upsert.updated;
                report.skipped_blacklisted += upsert.skipped_blacklisted;
                report.dropped_invalid += upsert.dropped_invalid;
            }
            Err(err) => {
                error!(error = %err, count = videos.len(), "视频批量落库失败，该批记录丢弃");
            }
        }

        // 搜索结果里出现的新频道进入频道积压
        let mut discovered: Vec<String> = videos
            .iter()
            .map(|v| v.channel_id.clone())
            .filter(|id| !id.is_empty())
            .collect();
        discovered.sort();
        discovered.dedup();

        if !discovered.is_empty() {
            match self.backlog.register_channels(&discovered).await {
                Ok(added) => report.channels_discovered += added,
                Err(err) => warn!(error = %err, "注册新发现频道失败"),
            }
        }
    }

    async fn sink_channel(
        &self,
        snapshot: &crate::domain::models::channel::ChannelSnapshot,
        report: &mut IngestReport,
    ) {
        match self.channels.insert_snapshot(snapshot).await {
            Ok(SnapshotOutcome::SkippedBlacklisted) => {
                info!(channel_id = %snapshot.channel_id, "频道已拉黑，快照跳过");
                report.skipped_blacklisted += 1;
            }
            Ok(_) => {
                report.channel_snapshots += 1;
                if let Err(err) = self.channels.update_registry(snapshot).await {
                    warn!(channel_id = %snapshot.channel_id, error = %err, "刷新频道注册表失败");
                }
            }
            Err(err) => {
                error!(channel_id = %snapshot.channel_id, error = %err, "频道快照落库失败，该快照丢弃");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::capture::{CapturedTransaction, Compression, ContentEncoding};
    use crate::domain::models::channel::ChannelSnapshot;
    use crate::domain::models::target::{CrawlTarget, TargetKind};
    use crate::domain::models::video::VideoRecord;
    use crate::domain::repositories::video_repository::{partition_records, UpsertReport};
    use crate::domain::repositories::RepositoryError;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingVideoRepo {
        batches: Mutex<Vec<Vec<VideoRecord>>>,
        blacklist: HashSet<String>,
    }

    #[async_trait]
    impl VideoRepository for RecordingVideoRepo {
        async fn batch_upsert(
            &self,
            records: &[VideoRecord],
        ) -> Result<UpsertReport, RepositoryError> {
            let (eligible, skipped, dropped) = partition_records(records, &self.blacklist);
            self.batches
                .lock()
                .unwrap()
                .push(eligible.iter().map(|r| (*r).clone()).collect());
            Ok(UpsertReport {
                inserted: eligible.len() as u64,
                updated: 0,
                skipped_blacklisted: skipped,
                dropped_invalid: dropped,
            })
        }
    }

    #[derive(Default)]
    struct RecordingChannelRepo {
        snapshots: Mutex<Vec<ChannelSnapshot>>,
        registry_updates: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ChannelRepository for RecordingChannelRepo {
        async fn load_blacklist(&self) -> Result<HashSet<String>, RepositoryError> {
            Ok(HashSet::new())
        }

        async fn insert_snapshot(
            &self,
            snapshot: &ChannelSnapshot,
        ) -> Result<SnapshotOutcome, RepositoryError> {
            self.snapshots.lock().unwrap().push(snapshot.clone());
            Ok(SnapshotOutcome::Inserted)
        }

        async fn update_registry(
            &self,
            snapshot: &ChannelSnapshot,
        ) -> Result<(), RepositoryError> {
            self.registry_updates
                .lock()
                .unwrap()
                .push(snapshot.channel_id.clone());
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingBacklog {
        registered: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl BacklogRepository for RecordingBacklog {
        async fn claim_next(
            &self,
            _kind: TargetKind,
        ) -> Result<Option<CrawlTarget>, RepositoryError> {
            Ok(None)
        }

        async fn release_as_missing(&self, _target: &CrawlTarget) -> Result<(), RepositoryError> {
            Ok(())
        }

        async fn register_channels(&self, channel_ids: &[String]) -> Result<u64, RepositoryError> {
            let mut registered = self.registered.lock().unwrap();
            registered.extend(channel_ids.iter().cloned());
            Ok(channel_ids.len() as u64)
        }
    }

    fn search_payload(video_id: &str) -> String {
        json!({
            "onResponseReceivedCommands": [{
                "appendContinuationItemsAction": {
                    "continuationItems": [{
                        "itemSectionRenderer": {
                            "contents": [{
                                "videoRenderer": {
                                    "videoId": video_id,
                                    "title": {"runs": [{"text": "t"}]},
                                    "viewCountText": {"simpleText": "100次观看"},
                                    "publishedTimeText": {"simpleText": "1天前"},
                                    "longBylineText": {"runs": [{
                                        "text": "c",
                                        "navigationEndpoint": {"browseEndpoint": {
                                            "browseId": "UCchan",
                                            "canonicalBaseUrl": "/@c"
                                        }}
                                    }]}
                                }
                            }]
                        }
                    }]
                }
            }]
        })
        .to_string()
    }

    fn plain_txn(body: String) -> CapturedTransaction {
        CapturedTransaction {
            request_url: "https://www.youtube.com/youtubei/v1/search".to_string(),
            method: "POST".to_string(),
            started_at: Utc::now(),
            body,
            encoding: ContentEncoding::None,
            compression: Compression::None,
            headers: Vec::new(),
        }
    }

    fn harvest_of(transactions: Vec<CapturedTransaction>) -> Harvest {
        Harvest {
            transactions,
            page_channel_name: None,
            avatar_url: None,
        }
    }

    #[tokio::test]
    async fn test_identical_bodies_processed_once() {
        let videos = Arc::new(RecordingVideoRepo::default());
        let channels = Arc::new(RecordingChannelRepo::default());
        let backlog = Arc::new(RecordingBacklog::default());
        let mut pipeline = IngestPipeline::new(videos.clone(), channels, backlog);

        let body = search_payload("vid_dup");
        let harvest = harvest_of(vec![plain_txn(body.clone()), plain_txn(body)]);
        let crawl_time = Utc.with_ymd_and_hms(2024, 6, 15, 8, 0, 0).unwrap();
        let report = pipeline.ingest_at(&harvest, crawl_time).await;

        assert_eq!(report.transactions, 2);
        assert_eq!(report.duplicates, 1);
        assert_eq!(report.videos_extracted, 1);
        // 字节级相同的两个响应只产生一组记录
        assert_eq!(videos.batches.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_bad_transactions_do_not_abort_batch() {
        let videos = Arc::new(RecordingVideoRepo::default());
        let channels = Arc::new(RecordingChannelRepo::default());
        let backlog = Arc::new(RecordingBacklog::default());
        let mut pipeline = IngestPipeline::new(videos.clone(), channels, backlog);

        let mut broken = plain_txn("@@@".to_string());
        broken.encoding = ContentEncoding::Base64;
        let harvest = harvest_of(vec![
            broken,
            plain_txn("not json at all".to_string()),
            plain_txn(json!({"unknown": true}).to_string()),
            plain_txn(search_payload("vid_ok")),
        ]);
        let report = pipeline.ingest(&harvest).await;

        assert_eq!(report.decode_failures, 1);
        assert_eq!(report.parse_failures, 1);
        assert_eq!(report.unmatched, 1);
        assert_eq!(report.videos_extracted, 1);
        assert_eq!(videos.batches.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_discovered_channels_registered() {
        let videos = Arc::new(RecordingVideoRepo::default());
        let channels = Arc::new(RecordingChannelRepo::default());
        let backlog = Arc::new(RecordingBacklog::default());
        let mut pipeline = IngestPipeline::new(videos, channels, backlog.clone());

        let harvest = harvest_of(vec![plain_txn(search_payload("vid_1"))]);
        let report = pipeline.ingest(&harvest).await;

        assert_eq!(report.channels_discovered, 1);
        assert_eq!(*backlog.registered.lock().unwrap(), vec!["UCchan"]);
    }

    #[tokio::test]
    async fn test_channel_snapshot_flows_to_registry() {
        let videos = Arc::new(RecordingVideoRepo::default());
        let channels = Arc::new(RecordingChannelRepo::default());
        let backlog = Arc::new(RecordingBacklog::default());
        let mut pipeline = IngestPipeline::new(videos, channels.clone(), backlog);

        let body = json!({
            "metadata": {
                "channelMetadataRenderer": {
                    "channelId": "UCabout",
                    "title": "About Channel",
                    "description": "d",
                    "canonicalBaseUrl": "/@about"
                }
            }
        })
        .to_string();
        let report = pipeline.ingest(&harvest_of(vec![plain_txn(body)])).await;

        assert_eq!(report.channel_snapshots, 1);
        assert_eq!(channels.snapshots.lock().unwrap().len(), 1);
        assert_eq!(*channels.registry_updates.lock().unwrap(), vec!["UCabout"]);
    }
}
