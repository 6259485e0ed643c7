//! Navigator port - 画面遷移
//!
//! リダイレクト副作用（コースページ / チェックアウトへの遷移）を
//! 抽象化します。

use crate::domain::Route;

/// Navigator はホスト環境に画面遷移を依頼する
///
/// fire-and-forget: 遷移の成否は watcher の関心外なので戻り値はありません。
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}
