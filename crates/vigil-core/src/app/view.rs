//! Checker view - 表示状態の導出
//!
//! [`CheckerView`] is the single value consumers render. It is a pure
//! projection of the poll state plus checker-local flags: the same
//! inputs always produce the same view.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::poller::PollState;
use crate::domain::PaymentStatus;

/// ウォッチャーが公開する 5 つの表示状態
///
/// 優先順位は上から:
/// 1. 初回ロード中（手動チェック前）
/// 2. フェッチエラー
/// 3. ステータス（COMPLETED / FAILED / PENDING）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum CheckerView {
    /// 最初のステータスがまだ届いていない
    Loading,
    /// ステータスの取得に失敗した（再チェックで回復できる）
    Error { message: String, checking: bool },
    /// 支払い完了
    Completed { redirecting: bool },
    /// 支払い失敗
    Failed,
    /// 支払い待ち。`expires_at` はセッション期限。
    Pending {
        expires_at: DateTime<Utc>,
        checking: bool,
    },
}

impl CheckerView {
    /// ポーリング状態と checker ローカルのフラグから表示状態を導出する
    pub fn derive(
        poll: &PollState,
        manual_checks: u32,
        manual_checking: bool,
        deadline: DateTime<Utc>,
        redirect_on_complete: bool,
    ) -> Self {
        // 手動チェックを一度でも行ったら、初回ロード中でもスピナーには戻さない
        if poll.is_loading && manual_checks == 0 {
            return CheckerView::Loading;
        }

        if let Some(err) = &poll.error {
            return CheckerView::Error {
                message: err.to_string(),
                checking: manual_checking,
            };
        }

        match poll.status() {
            Some(PaymentStatus::Completed) => CheckerView::Completed {
                redirecting: redirect_on_complete,
            },
            Some(PaymentStatus::Failed) => CheckerView::Failed,
            // スナップショットがまだ無い場合も「支払い待ち」として扱う
            Some(PaymentStatus::Pending) | None => CheckerView::Pending {
                expires_at: deadline,
                checking: manual_checking,
            },
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, CheckerView::Pending { .. })
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, CheckerView::Completed { .. })
    }
}
