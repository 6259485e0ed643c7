//! Notifier port - ユーザー通知（トースト）
//!
//! 支払い完了やセッション期限切れをユーザーに知らせる手段を抽象化します。

/// Notifier はユーザー向けの通知を表示する
pub trait Notifier: Send + Sync {
    /// 成功トースト（例: 支払い完了）
    fn success(&self, message: &str);

    /// エラートースト（例: セッション期限切れ）
    fn error(&self, message: &str);
}
