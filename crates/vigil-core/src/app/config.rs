//! Tunable knobs for polling and the checker.

use std::time::Duration;

/// Polling behavior of a [`StatusSubscription`](super::poller::StatusSubscription).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollConfig {
    /// 自動ポーリングを行うか（false なら refetch 専用）
    pub auto_poll: bool,
    /// 自動ポーリングの間隔
    pub interval: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            auto_poll: true,
            interval: Duration::from_secs(15),
        }
    }
}

/// Behavior of a [`PaymentStatusChecker`](super::checker::PaymentStatusChecker).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckerConfig {
    /// ステータスの自動ポーリング間隔
    pub poll_interval: Duration,
    /// 支払い完了からコースページへ遷移するまでの待ち時間
    pub redirect_delay: Duration,
    /// スナップショットに期限が無い場合に使うフォールバック期限
    /// （起動時刻からの相対時間）
    pub fallback_expiry: Duration,
    /// 完了時にコースページへ自動遷移するか
    pub redirect_on_complete: bool,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(15),
            redirect_delay: Duration::from_secs(2),
            fallback_expiry: Duration::from_secs(24 * 60 * 60),
            redirect_on_complete: true,
        }
    }
}
