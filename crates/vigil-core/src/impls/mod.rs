//! Adapters - port のリファレンス実装
//!
//! 含まれるのはテスト・デモ・組み込み先の雛形に使える実装だけです。
//! 本番の HTTP ソースや実際の画面遷移は組み込み先が実装します。
//!
//! - [`InMemoryStatusSource`]: スクリプト駆動のステータス取得元
//! - [`RecordingNavigator`] / [`RecordingNotifier`]: 副作用の記録

pub mod inmem_source;
pub mod recording;

pub use self::inmem_source::InMemoryStatusSource;
pub use self::recording::{RecordingNavigator, RecordingNotifier};
