// Copyright (c) 2026 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库接口模块
///
/// 定义领域层对存储引擎的抽象：积压仓库、视频仓库和频道仓库。
/// 具体实现位于基础设施层。
pub mod backlog_repository;
pub mod channel_repository;
pub mod video_repository;

use thiserror::Error;

/// 仓库层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("数据库错误: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("未找到数据")]
    NotFound,

    #[error("无效参数: {0}")]
    InvalidParameter(String),

    #[error("写写冲突: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// 判断错误是否为事务写写冲突（序列化失败或死锁）
    ///
    /// 领取协议据此决定是否在随机退避后重试整个事务。
    pub fn is_conflict(&self) -> bool {
        match self {
            RepositoryError::Conflict(_) => true,
            RepositoryError::Database(err) => {
                let message = err.to_string().to_lowercase();
                message.contains("deadlock")
                    || message.contains("could not serialize")
                    || message.contains("serialization failure")
                    || message.contains("database is locked")
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_conflict_classification() {
        assert!(RepositoryError::Conflict("deadlock found".into()).is_conflict());
        assert!(RepositoryError::Database(sea_orm::DbErr::Custom(
            "ERROR: could not serialize access due to concurrent update".into()
        ))
        .is_conflict());
        assert!(RepositoryError::Database(sea_orm::DbErr::Custom(
            "Deadlock found when trying to get lock".into()
        ))
        .is_conflict());
        assert!(!RepositoryError::NotFound.is_conflict());
        assert!(!RepositoryError::Database(sea_orm::DbErr::Custom("syntax error".into()))
            .is_conflict());
    }
}
