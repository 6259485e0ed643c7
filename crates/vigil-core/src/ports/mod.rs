//! Ports - 外界との境界
//!
//! watcher が外界に触る箇所は全て trait（port）として切り出しています。
//! アプリケーション層は port にのみ依存し、具体的な実装（adapter）は
//! 組み込み先が差し込みます。
//!
//! - [`StatusSource`]: 支払いステータスの取得元
//! - [`Navigator`]: 画面遷移
//! - [`Notifier`]: ユーザー通知
//! - [`Clock`]: 現在時刻

pub mod clock;
pub mod navigator;
pub mod notifier;
pub mod status_source;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::navigator::Navigator;
pub use self::notifier::Notifier;
pub use self::status_source::StatusSource;
