//! Application layer - 監視の本体
//!
//! - [`PaymentStatusChecker`]: 監視タスクのビルダーと [`CheckerHandle`]
//! - [`StatusPoller`]: ステータスの定期取得
//! - [`CheckerView`]: 消費側が描画する表示状態
//! - [`Countdown`]: セッション期限のカウントダウン

pub mod checker;
pub mod config;
pub mod countdown;
pub mod poller;
pub mod view;

pub use self::checker::{CheckerHandle, PaymentStatusChecker, StatusCallback};
pub use self::config::{CheckerConfig, PollConfig};
pub use self::countdown::Countdown;
pub use self::poller::{PollState, StatusPoller, StatusSubscription};
pub use self::view::CheckerView;
