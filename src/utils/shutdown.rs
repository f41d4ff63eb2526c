// Copyright (c) 2026 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::time::Duration;
use tokio::sync::watch;

/// 创建一对关停控制器与令牌
pub fn shutdown_channel() -> (ShutdownController, ShutdownToken) {
    let (tx, rx) = watch::channel(false);
    (ShutdownController { tx }, ShutdownToken { rx })
}

/// 关停控制器
///
/// 由信号处理路径持有，触发后所有克隆出去的令牌同时可见。
#[derive(Debug)]
pub struct ShutdownController {
    tx: watch::Sender<bool>,
}

impl ShutdownController {
    /// 请求协作式关停
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

/// 协作式关停令牌
///
/// 显式传入每个工作器循环，只在循环边界被采样——进行中的
/// 页面交互或摄取永远被允许完成，不会被打断到一半。
#[derive(Debug, Clone)]
pub struct ShutdownToken {
    rx: watch::Receiver<bool>,
}

impl ShutdownToken {
    /// 是否已请求关停
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// 等待关停被请求
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        // 发送端析构等同于关停
        let _ = rx.wait_for(|stop| *stop).await;
    }

    /// 可被关停打断的休眠
    pub async fn sleep(&self, duration: Duration) {
        tokio::select! {
            _ = tokio::time::sleep(duration) => {}
            _ = self.cancelled() => {}
        }
    }
}
