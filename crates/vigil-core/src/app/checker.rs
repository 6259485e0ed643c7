//! Payment status checker - 支払いステータス監視の本体
//!
//! [`PaymentStatusChecker`] は enrollment の支払いステータスを購読し、
//! 表示状態（[`CheckerView`]）と副作用（リダイレクト・トースト・期限切れ）を
//! 1 つのタスクに集約します。
//!
//! - ビューは watch channel で配信する（最新値だけが意味を持つ）
//! - 操作（check_now / restart_payment / open_course）は mpsc でタスクに
//!   届き、oneshot で完了が返る
//! - リダイレクトと期限切れのタイマーはタスク内で管理し、ビューが対応する
//!   状態を離れたらキャンセルする

use std::future;
use std::pin::Pin;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{Sleep, sleep};

use super::config::{CheckerConfig, PollConfig};
use super::countdown::Countdown;
use super::poller::{PollState, StatusPoller, StatusSubscription};
use super::view::CheckerView;
use crate::domain::{CourseId, EnrollmentId, PaymentStatus, Route, VigilError};
use crate::ports::{Clock, Navigator, Notifier, StatusSource, SystemClock};

/// ステータスが変わるたびに呼ばれるコールバック
pub type StatusCallback = Box<dyn Fn(PaymentStatus) + Send + Sync>;

/// 支払いステータス監視のビルダー
///
/// # 使用例
/// ```ignore
/// let handle = PaymentStatusChecker::new(enrollment_id, course_id, source, navigator, notifier)
///     .config(CheckerConfig::default())
///     .on_status_change(|status| println!("status: {status:?}"))
///     .spawn();
///
/// while let Some(view) = handle.changed().await {
///     render(view);
/// }
/// ```
pub struct PaymentStatusChecker {
    enrollment_id: EnrollmentId,
    course_id: CourseId,
    source: Arc<dyn StatusSource>,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    config: CheckerConfig,
    on_status_change: Option<StatusCallback>,
}

impl PaymentStatusChecker {
    pub fn new(
        enrollment_id: EnrollmentId,
        course_id: CourseId,
        source: Arc<dyn StatusSource>,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            enrollment_id,
            course_id,
            source,
            navigator,
            notifier,
            clock: Arc::new(SystemClock),
            config: CheckerConfig::default(),
            on_status_change: None,
        }
    }

    /// 時計を差し替える（テスト用）
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(mut self, config: CheckerConfig) -> Self {
        self.config = config;
        self
    }

    /// ステータス変化の通知先を登録する
    ///
    /// 同じステータスが連続して観測されても 1 回しか呼ばれません。
    pub fn on_status_change(
        mut self,
        callback: impl Fn(PaymentStatus) + Send + Sync + 'static,
    ) -> Self {
        self.on_status_change = Some(Box::new(callback));
        self
    }

    /// 監視タスクを起動してハンドルを返す
    pub fn spawn(self) -> CheckerHandle {
        let sub = StatusPoller::subscribe(
            self.source,
            self.enrollment_id.clone(),
            PollConfig {
                auto_poll: true,
                interval: self.config.poll_interval,
            },
        );

        // フォールバック期限は起動時刻から一度だけ決める
        let fallback_deadline = self.clock.now() + self.config.fallback_expiry;
        let countdown = Countdown::until(fallback_deadline, self.clock.as_ref());

        let (view_tx, view_rx) = watch::channel(CheckerView::Loading);
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let task = CheckerTask {
            enrollment_id: self.enrollment_id,
            course_id: self.course_id,
            config: self.config,
            clock: self.clock,
            navigator: self.navigator,
            notifier: self.notifier,
            on_status_change: self.on_status_change,
            fallback_deadline,
            sub,
            view_tx,
            cmd_rx,
            shutdown_rx,
            countdown,
            redirect: None,
            manual_checks: 0,
            manual_checking: false,
            last_reported: None,
        };
        let join = tokio::spawn(task.run());

        CheckerHandle {
            view_rx,
            cmd_tx,
            shutdown_tx,
            join,
        }
    }
}

enum CheckerCmd {
    CheckNow { done: oneshot::Sender<()> },
    RestartPayment { done: oneshot::Sender<()> },
    OpenCourse { done: oneshot::Sender<()> },
}

/// 監視タスクへのハンドル
///
/// drop すると監視タスクは停止します。
pub struct CheckerHandle {
    view_rx: watch::Receiver<CheckerView>,
    cmd_tx: mpsc::UnboundedSender<CheckerCmd>,
    shutdown_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl CheckerHandle {
    /// 現在の表示状態
    pub fn view(&self) -> CheckerView {
        self.view_rx.borrow().clone()
    }

    /// 表示状態が変わるまで待つ。タスクが終了していたら None。
    pub async fn changed(&mut self) -> Option<CheckerView> {
        self.view_rx.changed().await.ok()?;
        Some(self.view_rx.borrow_and_update().clone())
    }

    /// 表示状態の独立した購読口を作る
    ///
    /// それぞれのクローンが自分のペースで変更を追えます。
    pub fn views(&self) -> watch::Receiver<CheckerView> {
        self.view_rx.clone()
    }

    /// 次のポーリングを待たずに今すぐ確認させ、完了まで待つ
    pub async fn check_now(&self) -> Result<(), VigilError> {
        self.command(|done| CheckerCmd::CheckNow { done }).await
    }

    /// チェックアウトページへ遷移させる（支払いやり直し）
    pub async fn restart_payment(&self) -> Result<(), VigilError> {
        self.command(|done| CheckerCmd::RestartPayment { done }).await
    }

    /// コースページへ遷移させる
    pub async fn open_course(&self) -> Result<(), VigilError> {
        self.command(|done| CheckerCmd::OpenCourse { done }).await
    }

    /// 停止を依頼する（待たない）
    pub fn request_stop(&self) {
        // ignore send error: the checker task may already be gone
        let _ = self.shutdown_tx.send(true);
    }

    /// 停止を依頼し、タスクの終了まで待つ
    pub async fn stop_and_join(self) {
        self.request_stop();
        let _ = self.join.await;
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    async fn command(
        &self,
        make: impl FnOnce(oneshot::Sender<()>) -> CheckerCmd,
    ) -> Result<(), VigilError> {
        let (done_tx, done_rx) = oneshot::channel();
        self.cmd_tx
            .send(make(done_tx))
            .map_err(|_| VigilError::CheckerStopped)?;
        done_rx.await.map_err(|_| VigilError::CheckerStopped)
    }
}

struct CheckerTask {
    enrollment_id: EnrollmentId,
    course_id: CourseId,
    config: CheckerConfig,
    clock: Arc<dyn Clock>,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
    on_status_change: Option<StatusCallback>,
    fallback_deadline: DateTime<Utc>,
    sub: StatusSubscription,
    view_tx: watch::Sender<CheckerView>,
    cmd_rx: mpsc::UnboundedReceiver<CheckerCmd>,
    shutdown_rx: watch::Receiver<bool>,
    countdown: Countdown,
    redirect: Option<Pin<Box<Sleep>>>,
    manual_checks: u32,
    manual_checking: bool,
    last_reported: Option<PaymentStatus>,
}

impl CheckerTask {
    async fn run(mut self) {
        loop {
            // 毎周、最新のポーリング状態から表示を導出し直す
            let poll = self.sub.latest();
            self.observe(&poll);
            let view = self.publish(&poll);

            // 完了ビューに入った瞬間だけトーストを出してタイマーを張る。
            // ビューが完了以外に変わったらタイマーは外す。
            if view.is_completed() && self.config.redirect_on_complete {
                if self.redirect.is_none() {
                    self.notifier
                        .success("Payment successful! Redirecting to course...");
                    self.redirect = Some(Box::pin(sleep(self.config.redirect_delay)));
                    tracing::debug!(
                        "payment for {} completed, redirecting in {:?}",
                        self.enrollment_id,
                        self.config.redirect_delay
                    );
                }
            } else if self.redirect.take().is_some() {
                tracing::debug!("redirect timer for {} cancelled", self.enrollment_id);
            }

            tokio::select! {
                changed = self.shutdown_rx.changed() => {
                    if changed.is_err() || *self.shutdown_rx.borrow() {
                        break;
                    }
                }
                cmd = self.cmd_rx.recv() => {
                    match cmd {
                        Some(CheckerCmd::CheckNow { done }) => {
                            self.manual_check().await;
                            let _ = done.send(());
                        }
                        Some(CheckerCmd::RestartPayment { done }) => {
                            self.navigator.navigate(Route::Checkout(self.course_id.clone()));
                            let _ = done.send(());
                        }
                        Some(CheckerCmd::OpenCourse { done }) => {
                            self.navigator.navigate(Route::Course(self.course_id.clone()));
                            let _ = done.send(());
                        }
                        None => break,
                    }
                }
                state = self.sub.changed() => {
                    // poller が止まっていたら checker も止める
                    if state.is_none() {
                        break;
                    }
                    // 新しい状態はループ先頭で読み直す
                }
                _ = self.countdown.expired(), if view.is_pending() => {
                    self.notifier.error("Payment session has expired");
                    self.navigator.navigate(Route::Checkout(self.course_id.clone()));
                    tracing::info!("payment session for {} expired", self.enrollment_id);
                    break;
                }
                _ = redirect_fired(&mut self.redirect) => {
                    self.navigator.navigate(Route::Course(self.course_id.clone()));
                    tracing::info!("redirecting {} to the course page", self.enrollment_id);
                    break;
                }
            }
        }

        self.sub.stop_and_join().await;
        tracing::debug!("payment status checker for {} stopped", self.enrollment_id);
    }

    /// ステータス変化の通知と期限の張り替え
    fn observe(&mut self, poll: &PollState) {
        if let Some(status) = poll.status() {
            if self.last_reported != Some(status) {
                self.last_reported = Some(status);
                tracing::debug!(
                    "payment status for {} is now {:?}",
                    self.enrollment_id,
                    status
                );
                if let Some(callback) = &self.on_status_change {
                    callback(status);
                }
            }
        }

        // スナップショットの期限が無ければフォールバック期限を使う
        let deadline = poll
            .snapshot
            .as_ref()
            .and_then(|snapshot| snapshot.expiry_time)
            .unwrap_or(self.fallback_deadline);
        if deadline != self.countdown.deadline() {
            self.countdown = Countdown::until(deadline, self.clock.as_ref());
        }
    }

    /// 表示状態を導出し、変わっていれば配信する
    fn publish(&self, poll: &PollState) -> CheckerView {
        let view = CheckerView::derive(
            poll,
            self.manual_checks,
            self.manual_checking,
            self.countdown.deadline(),
            self.config.redirect_on_complete,
        );
        self.view_tx.send_if_modified(|current| {
            if *current == view {
                false
            } else {
                *current = view.clone();
                true
            }
        });
        view
    }

    /// 手動チェック。実行中は busy フラグ付きのビューを配信する。
    async fn manual_check(&mut self) {
        self.manual_checking = true;
        let poll = self.sub.latest();
        self.publish(&poll);

        // フェッチの成否は poll 状態に載るので、ここでは完了だけ待つ
        let _ = self.sub.refetch().await;

        self.manual_checks += 1;
        self.manual_checking = false;
    }
}

/// arm されていれば発火を待ち、いなければ待ち続ける
async fn redirect_fired(redirect: &mut Option<Pin<Box<Sleep>>>) {
    match redirect.as_mut() {
        Some(timer) => timer.await,
        None => future::pending::<()>().await,
    }
}
