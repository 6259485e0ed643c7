//! Clock port - 時刻の抽象化
//!
//! 期限計算（session expiry / fallback deadline）は全てこの port 経由で
//! 現在時刻を取得します。
//!
//! - **テスト容易性**: FixedClock で期限切れシナリオを決定的に再現できる
//! - **本番**: SystemClock がそのまま `Utc::now()` を返す

use chrono::{DateTime, Utc};

/// Clock は現在時刻を提供する
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// SystemClock - 本番用のシステム時計
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// FixedClock - テスト用の固定時計
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }
}
