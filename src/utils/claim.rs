// Copyright (c) 2026 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::domain::repositories::RepositoryError;

/// 乐观领取重试策略
///
/// 领取事务在可串行化隔离级别下可能因序列化失败或死锁而被数据库
/// 主动中止，此时整个事务在随机退避后整体重试。随机退避避免了
/// 多个工作器同时重试再次相撞。
#[derive(Debug, Clone)]
pub struct ClaimRetryPolicy {
    /// 最大尝试次数（含首次）
    pub max_attempts: u32,
    /// 退避下限（毫秒）
    pub backoff_min_ms: u64,
    /// 退避上限（毫秒）
    pub backoff_max_ms: u64,
}

impl Default for ClaimRetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_min_ms: 100,
            backoff_max_ms: 500,
        }
    }
}

impl ClaimRetryPolicy {
    /// 生成一次均匀分布的随机退避时长
    pub fn backoff(&self) -> Duration {
        Duration::from_millis(rand::random_range(self.backoff_min_ms..=self.backoff_max_ms))
    }
}

/// 乐观领取原语
///
/// 对单次领取尝试 `attempt` 施加统一的冲突重试语义：仅当错误被
/// `RepositoryError::is_conflict()` 识别为写写冲突时重试；尝试次数
/// 耗尽后放弃并返回 `Ok(None)`——调用方必须把 `None` 当作"当前没有
/// 工作"，而非错误。非冲突错误原样上抛。
pub async fn claim_with_retries<T, F, Fut>(
    policy: &ClaimRetryPolicy,
    mut attempt: F,
) -> Result<Option<T>, RepositoryError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, RepositoryError>>,
{
    for round in 1..=policy.max_attempts {
        match attempt().await {
            Ok(outcome) => return Ok(outcome),
            Err(err) if err.is_conflict() => {
                if round == policy.max_attempts {
                    warn!(
                        attempts = policy.max_attempts,
                        "领取事务冲突重试次数耗尽，放弃本轮领取"
                    );
                    return Ok(None);
                }
                let backoff = policy.backoff();
                warn!(
                    round,
                    backoff_ms = backoff.as_millis() as u64,
                    "领取事务发生写写冲突，退避后重试"
                );
                tokio::time::sleep(backoff).await;
            }
            Err(err) => return Err(err),
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn fast_policy() -> ClaimRetryPolicy {
        ClaimRetryPolicy {
            max_attempts: 3,
            backoff_min_ms: 1,
            backoff_max_ms: 2,
        }
    }

    #[tokio::test]
    async fn test_conflict_then_success() {
        let calls = AtomicU32::new(0);
        let result = claim_with_retries(&fast_policy(), || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(RepositoryError::Conflict("deadlock".into()))
                } else {
                    Ok(Some("target".to_string()))
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(result.as_deref(), Some("target"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let result: Option<String> = claim_with_retries(&fast_policy(), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(RepositoryError::Conflict("serialization failure".into())) }
        })
        .await
        .unwrap();

        assert!(result.is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_non_conflict_error_propagates() {
        let calls = AtomicU32::new(0);
        let result: Result<Option<String>, _> = claim_with_retries(&fast_policy(), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(RepositoryError::NotFound) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    /// 事务性假存储：以互斥锁模拟数据库的行级串行化，
    /// 并在持锁期间注入人工延迟放大竞争窗口。
    struct FakeBacklog {
        today: NaiveDate,
        rows: tokio::sync::Mutex<HashMap<String, Option<NaiveDate>>>,
    }

    impl FakeBacklog {
        fn new(today: NaiveDate, locators: &[&str]) -> Self {
            Self {
                today,
                rows: tokio::sync::Mutex::new(
                    locators.iter().map(|l| (l.to_string(), None)).collect(),
                ),
            }
        }

        async fn try_claim(&self) -> Result<Option<String>, RepositoryError> {
            let mut rows = self.rows.lock().await;
            tokio::time::sleep(Duration::from_millis(rand::random_range(1..=5))).await;
            let mut eligible: Vec<String> = rows
                .iter()
                .filter(|(_, last)| last.map_or(true, |d| d != self.today))
                .map(|(locator, _)| locator.clone())
                .collect();
            eligible.sort();
            match eligible.into_iter().next() {
                Some(locator) => {
                    rows.insert(locator.clone(), Some(self.today));
                    Ok(Some(locator))
                }
                None => Ok(None),
            }
        }
    }

    #[tokio::test]
    async fn test_concurrent_claims_are_exclusive() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let store = Arc::new(FakeBacklog::new(today, &["a", "b", "c"]));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                claim_with_retries(&fast_policy(), || store.try_claim())
                    .await
                    .unwrap()
            }));
        }

        let mut claimed = Vec::new();
        for handle in handles {
            if let Some(locator) = handle.await.unwrap() {
                claimed.push(locator);
            }
        }

        // 3个目标，8个并发领取者：恰好3次成功且互不重复
        claimed.sort();
        assert_eq!(claimed, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_claimed_target_stays_claimed_same_day() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let store = FakeBacklog::new(today, &["only"]);

        let first = store.try_claim().await.unwrap();
        assert_eq!(first.as_deref(), Some("only"));
        // 同一天内再次领取应为空
        let second = store.try_claim().await.unwrap();
        assert!(second.is_none());
    }
}
