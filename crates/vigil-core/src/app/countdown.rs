//! Session-expiry countdown.
//!
//! Maps a wall-clock deadline (`DateTime<Utc>`) onto the tokio timer
//! wheel once, at arm time. The remaining duration is computed against
//! the injected [`Clock`], so tests can pin "now" wherever they need.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::{Instant, sleep_until};

use crate::ports::Clock;

/// Countdown は期限までの残り時間を追う
///
/// 期限は arm 時に絶対 `tokio::time::Instant` へ変換して固定します。
/// select! ループが何度回っても発火時刻はずれません。
#[derive(Debug)]
pub struct Countdown {
    deadline: DateTime<Utc>,
    target: Instant,
}

impl Countdown {
    /// 期限までのカウントダウンを作る（過去の期限は即座に発火する）
    pub fn until(deadline: DateTime<Utc>, clock: &dyn Clock) -> Self {
        let remaining = (deadline - clock.now()).to_std().unwrap_or(Duration::ZERO);
        Self {
            deadline,
            target: Instant::now() + remaining,
        }
    }

    /// arm されている期限
    pub fn deadline(&self) -> DateTime<Utc> {
        self.deadline
    }

    /// 残り時間（ゼロ未満はゼロに丸める）
    pub fn remaining(&self, clock: &dyn Clock) -> Duration {
        (self.deadline - clock.now()).to_std().unwrap_or(Duration::ZERO)
    }

    /// 期限まで待つ
    pub async fn expired(&self) {
        sleep_until(self.target).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::FixedClock;
    use chrono::TimeDelta;
    use tokio::time::timeout;

    #[tokio::test]
    async fn past_deadline_fires_immediately() {
        let now = Utc::now();
        let clock = FixedClock::new(now);
        let countdown = Countdown::until(now - TimeDelta::seconds(10), &clock);

        timeout(Duration::from_millis(50), countdown.expired())
            .await
            .expect("countdown with past deadline must fire at once");
    }

    #[test]
    fn remaining_clamps_at_zero() {
        let now = Utc::now();
        let clock = FixedClock::new(now);

        let past = Countdown::until(now - TimeDelta::seconds(5), &clock);
        assert_eq!(past.remaining(&clock), Duration::ZERO);

        let future = Countdown::until(now + TimeDelta::seconds(5), &clock);
        assert!(future.remaining(&clock) > Duration::from_secs(4));
    }

    #[tokio::test]
    async fn future_deadline_waits_for_the_gap() {
        let now = Utc::now();
        let clock = FixedClock::new(now);

        let start = std::time::Instant::now();
        let countdown = Countdown::until(now + TimeDelta::milliseconds(150), &clock);
        countdown.expired().await;
        assert!(start.elapsed() >= Duration::from_millis(150));
    }
}
