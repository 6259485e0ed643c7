//! StatusSource port - 支払いステータスの取得元
//!
//! プラットフォーム API への問い合わせを抽象化します。HTTP クライアント、
//! GraphQL、テスト用のインメモリ実装などがこの trait を実装します。

use async_trait::async_trait;

use crate::domain::{EnrollmentId, PaymentStatusSnapshot, VigilError};

/// StatusSource は enrollment の現在の支払いステータスを取得する
///
/// # 契約
///
/// - `fetch` 1 回が 1 回の問い合わせに対応する
/// - 呼び出し側（poller）が直列化するので、実装は並行呼び出しを
///   気にしなくてよい
/// - 失敗は `VigilError::StatusFetch` で返す（panic しない）
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn fetch(
        &self,
        enrollment_id: &EnrollmentId,
    ) -> Result<PaymentStatusSnapshot, VigilError>;
}
