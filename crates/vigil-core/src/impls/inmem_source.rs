//! In-memory status source - インメモリのステータス取得元
//!
//! テスト・デモ用の [`StatusSource`] 実装。スクリプトに沿って応答を返し、
//! 遅延や失敗を注入できます。

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{EnrollmentId, PaymentStatus, PaymentStatusSnapshot, VigilError};
use crate::ports::StatusSource;

/// スクリプト駆動の StatusSource
///
/// スクリプトは 1 フェッチにつき 1 ステップ消費され、最後のステップは
/// 以降ずっと繰り返されます。
pub struct InMemoryStatusSource {
    script: Mutex<VecDeque<Result<PaymentStatusSnapshot, String>>>,
    latency: Option<Duration>,
    failure_rate: f64,
    fetch_count: AtomicU32,
}

impl InMemoryStatusSource {
    pub fn scripted(steps: Vec<Result<PaymentStatusSnapshot, String>>) -> Self {
        Self {
            script: Mutex::new(steps.into()),
            latency: None,
            failure_rate: 0.0,
            fetch_count: AtomicU32::new(0),
        }
    }

    /// 常に同じステータスを返すソース
    pub fn fixed(status: PaymentStatus) -> Self {
        Self::scripted(vec![Ok(PaymentStatusSnapshot::status_only(status))])
    }

    /// フェッチごとの擬似レイテンシを設定する
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// フェッチが失敗する確率を設定する（0.0〜1.0 に丸める)
    pub fn with_failure_rate(mut self, rate: f64) -> Self {
        self.failure_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// これまでのフェッチ回数
    pub fn fetch_count(&self) -> u32 {
        self.fetch_count.load(Ordering::SeqCst)
    }

    /// スクリプトの末尾にステップを足す
    pub async fn push(&self, step: Result<PaymentStatusSnapshot, String>) {
        self.script.lock().await.push_back(step);
    }
}

#[async_trait]
impl StatusSource for InMemoryStatusSource {
    async fn fetch(
        &self,
        _enrollment_id: &EnrollmentId,
    ) -> Result<PaymentStatusSnapshot, VigilError> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        if self.failure_rate > 0.0 && rand::random::<f64>() < self.failure_rate {
            return Err(VigilError::StatusFetch(
                "injected transient failure".to_string(),
            ));
        }

        let step = {
            let mut script = self.script.lock().await;
            if script.len() > 1 {
                script.pop_front()
            } else {
                script.front().cloned()
            }
        };

        match step {
            Some(step) => step.map_err(VigilError::StatusFetch),
            None => Err(VigilError::StatusFetch("status script exhausted".to_string())),
        }
    }
}
