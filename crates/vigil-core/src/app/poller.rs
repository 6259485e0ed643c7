//! Status poller - 支払いステータスの購読
//!
//! Polls the [`StatusSource`] on an interval and publishes every result
//! as a [`PollState`] through a watch channel.
//!
//! Design:
//! - one background task per subscription, detached via `tokio::spawn`
//! - watch channel carries the state (consumers only care about the latest)
//! - manual refetch goes through an mpsc command channel and is acked with
//!   a oneshot, so callers can await completion
//! - fetches are serialized: a tick and a refetch never run concurrently

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::app::config::PollConfig;
use crate::domain::{EnrollmentId, PaymentStatus, PaymentStatusSnapshot, VigilError};
use crate::ports::StatusSource;

/// 購読側から見た最新のポーリング状態
///
/// - `is_loading` は最初のフェッチが完了するまで true
/// - フェッチ失敗時は `error` が埋まり、直前の `snapshot` は保持される
/// - 成功すると `error` はクリアされる
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollState {
    pub snapshot: Option<PaymentStatusSnapshot>,
    pub error: Option<VigilError>,
    pub is_loading: bool,
}

impl PollState {
    fn initial() -> Self {
        Self {
            snapshot: None,
            error: None,
            is_loading: true,
        }
    }

    /// 最後に取得できたステータス（まだ一度も成功していなければ None）
    pub fn status(&self) -> Option<PaymentStatus> {
        self.snapshot.as_ref().map(|snapshot| snapshot.status)
    }
}

struct RefetchCmd {
    done: oneshot::Sender<()>,
}

/// StatusPoller はポーリングタスクを起動する
pub struct StatusPoller;

impl StatusPoller {
    /// ポーリングを開始し、購読ハンドルを返す
    ///
    /// 返された [`StatusSubscription`] が drop されるとタスクは停止します。
    pub fn subscribe(
        source: Arc<dyn StatusSource>,
        enrollment_id: EnrollmentId,
        config: PollConfig,
    ) -> StatusSubscription {
        let (state_tx, state_rx) = watch::channel(PollState::initial());
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let join = tokio::spawn(poll_loop(
            source,
            enrollment_id,
            config,
            state_tx,
            cmd_rx,
            shutdown_rx,
        ));

        StatusSubscription {
            state_rx,
            cmd_tx,
            shutdown_tx,
            join,
        }
    }
}

/// ポーリングタスクへのハンドル
pub struct StatusSubscription {
    state_rx: watch::Receiver<PollState>,
    cmd_tx: mpsc::UnboundedSender<RefetchCmd>,
    shutdown_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl StatusSubscription {
    /// 現在の状態のコピーを返す
    pub fn latest(&self) -> PollState {
        self.state_rx.borrow().clone()
    }

    /// 状態が変わるまで待ち、新しい状態を返す
    ///
    /// タスクが停止していたら None を返します。
    pub async fn changed(&mut self) -> Option<PollState> {
        self.state_rx.changed().await.ok()?;
        Some(self.state_rx.borrow_and_update().clone())
    }

    /// 次の自動ポーリングを待たずに一度だけフェッチさせ、完了まで待つ
    ///
    /// フェッチ自体の成否は [`PollState`] に反映されます。ここでの Err は
    /// タスクが既に停止している場合だけです。
    pub async fn refetch(&self) -> Result<(), VigilError> {
        let (done_tx, done_rx) = oneshot::channel();
        self.cmd_tx
            .send(RefetchCmd { done: done_tx })
            .map_err(|_| VigilError::CheckerStopped)?;
        done_rx.await.map_err(|_| VigilError::CheckerStopped)
    }

    /// 停止を依頼する（待たない）
    pub fn request_stop(&self) {
        // ignore send error: the poll task may already be gone
        let _ = self.shutdown_tx.send(true);
    }

    /// 停止を依頼し、タスクの終了まで待つ
    pub async fn stop_and_join(self) {
        self.request_stop();
        let _ = self.join.await;
    }
}

async fn poll_loop(
    source: Arc<dyn StatusSource>,
    enrollment_id: EnrollmentId,
    config: PollConfig,
    state_tx: watch::Sender<PollState>,
    mut cmd_rx: mpsc::UnboundedReceiver<RefetchCmd>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    // 初回フェッチ。これが完了すると is_loading が false になる。
    fetch_once(source.as_ref(), &enrollment_id, &state_tx).await;

    // interval() は period ゼロで panic する
    let period = config.interval.max(Duration::from_millis(1));
    let mut tick = tokio::time::interval(period);
    tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tick.reset();

    loop {
        tokio::select! {
            changed = shutdown_rx.changed() => {
                if changed.is_err() || *shutdown_rx.borrow() {
                    break;
                }
            }
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(RefetchCmd { done }) => {
                        fetch_once(source.as_ref(), &enrollment_id, &state_tx).await;
                        // 結果がどうであれ完了だけ伝える。失敗は state に載る。
                        let _ = done.send(());
                    }
                    None => break,
                }
            }
            _ = tick.tick(), if config.auto_poll => {
                fetch_once(source.as_ref(), &enrollment_id, &state_tx).await;
            }
        }
    }

    tracing::debug!("status poller for {} stopped", enrollment_id);
}

async fn fetch_once(
    source: &dyn StatusSource,
    enrollment_id: &EnrollmentId,
    state_tx: &watch::Sender<PollState>,
) {
    let fetched = source.fetch(enrollment_id).await;
    if let Err(err) = &fetched {
        tracing::debug!("status fetch failed for {}: {}", enrollment_id, err);
    }
    state_tx.send_modify(|state| {
        state.is_loading = false;
        match fetched {
            Ok(snapshot) => {
                state.snapshot = Some(snapshot);
                state.error = None;
            }
            Err(err) => {
                state.error = Some(err);
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impls::InMemoryStatusSource;
    use tokio::time::timeout;

    fn enrollment() -> EnrollmentId {
        EnrollmentId::new("enr_test").unwrap()
    }

    fn no_auto_poll() -> PollConfig {
        PollConfig {
            auto_poll: false,
            interval: Duration::from_secs(600),
        }
    }

    async fn settled(sub: &mut StatusSubscription) -> PollState {
        loop {
            let state = timeout(Duration::from_secs(2), sub.changed())
                .await
                .expect("poller must publish a state")
                .expect("poller task must be alive");
            if !state.is_loading {
                return state;
            }
        }
    }

    #[tokio::test]
    async fn first_fetch_settles_loading() {
        let source = Arc::new(InMemoryStatusSource::fixed(PaymentStatus::Pending));
        let mut sub = StatusPoller::subscribe(source, enrollment(), no_auto_poll());

        let state = settled(&mut sub).await;
        assert_eq!(state.status(), Some(PaymentStatus::Pending));
        assert_eq!(state.error, None);
        assert!(!state.is_loading);
    }

    #[tokio::test]
    async fn refetch_triggers_exactly_one_fetch() {
        let source = Arc::new(InMemoryStatusSource::fixed(PaymentStatus::Pending));
        let mut sub = StatusPoller::subscribe(source.clone(), enrollment(), no_auto_poll());

        settled(&mut sub).await;
        assert_eq!(source.fetch_count(), 1);

        sub.refetch().await.unwrap();
        assert_eq!(source.fetch_count(), 2);
    }

    #[tokio::test]
    async fn auto_poll_advances_through_the_script() {
        let source = Arc::new(InMemoryStatusSource::scripted(vec![
            Ok(PaymentStatusSnapshot::status_only(PaymentStatus::Pending)),
            Ok(PaymentStatusSnapshot::status_only(PaymentStatus::Pending)),
            Ok(PaymentStatusSnapshot::status_only(PaymentStatus::Completed)),
        ]));
        let config = PollConfig {
            auto_poll: true,
            interval: Duration::from_millis(25),
        };
        let mut sub = StatusPoller::subscribe(source.clone(), enrollment(), config);

        loop {
            let state = timeout(Duration::from_secs(2), sub.changed())
                .await
                .expect("poller must reach COMPLETED")
                .expect("poller task must be alive");
            if state.status() == Some(PaymentStatus::Completed) {
                break;
            }
        }
        assert!(source.fetch_count() >= 3);
    }

    #[tokio::test]
    async fn fetch_error_keeps_the_last_snapshot() {
        let source = Arc::new(InMemoryStatusSource::scripted(vec![
            Ok(PaymentStatusSnapshot::status_only(PaymentStatus::Pending)),
            Err("boom".to_string()),
            Ok(PaymentStatusSnapshot::status_only(PaymentStatus::Completed)),
        ]));
        let mut sub = StatusPoller::subscribe(source, enrollment(), no_auto_poll());

        let state = settled(&mut sub).await;
        assert_eq!(state.status(), Some(PaymentStatus::Pending));

        sub.refetch().await.unwrap();
        let state = sub.latest();
        assert_eq!(state.error, Some(VigilError::StatusFetch("boom".to_string())));
        // 失敗しても直前のスナップショットは残る
        assert_eq!(state.status(), Some(PaymentStatus::Pending));

        sub.refetch().await.unwrap();
        let state = sub.latest();
        assert_eq!(state.error, None);
        assert_eq!(state.status(), Some(PaymentStatus::Completed));
    }

    #[tokio::test]
    async fn dropping_the_subscription_stops_polling() {
        let source = Arc::new(InMemoryStatusSource::fixed(PaymentStatus::Pending));
        let config = PollConfig {
            auto_poll: true,
            interval: Duration::from_millis(20),
        };
        let sub = StatusPoller::subscribe(source.clone(), enrollment(), config);

        tokio::time::sleep(Duration::from_millis(100)).await;
        drop(sub);

        let after_drop = source.fetch_count();
        tokio::time::sleep(Duration::from_millis(100)).await;
        // 進行中だった 1 回までは許容する
        assert!(source.fetch_count() <= after_drop + 1);
    }

    #[tokio::test]
    async fn stop_and_join_terminates_the_task() {
        let source = Arc::new(InMemoryStatusSource::fixed(PaymentStatus::Pending));
        let sub = StatusPoller::subscribe(source, enrollment(), no_auto_poll());

        timeout(Duration::from_secs(1), sub.stop_and_join())
            .await
            .expect("stop_and_join must complete quickly");
    }

    #[tokio::test]
    async fn refetch_after_stop_reports_stopped() {
        let source = Arc::new(InMemoryStatusSource::fixed(PaymentStatus::Pending));
        let sub = StatusPoller::subscribe(source, enrollment(), no_auto_poll());

        sub.request_stop();
        // 停止が select で処理されるまで少し待つ
        tokio::time::sleep(Duration::from_millis(50)).await;

        let result = sub.refetch().await;
        assert_eq!(result, Err(VigilError::CheckerStopped));
    }
}
