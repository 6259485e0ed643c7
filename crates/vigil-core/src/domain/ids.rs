//! Domain identifiers (strongly-typed IDs).
//!
//! # 設計
//! enrollment / course の ID はプラットフォーム側で発行された不透明な文字列
//! として受け取ります。ここでは Phantom type で型を分け、空文字列だけを
//! 弾きます。
//!
//! - **型安全性**: EnrollmentId と CourseId は混同できない
//! - **検証**: 生成時に非空チェック（fail-fast）
//! - **生成**: デモ・テスト用にプレフィックス付き ULID の `random()` を提供

use std::fmt;
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};
use ulid::Ulid;

use super::errors::VigilError;

/// IdMarker は各 ID 型のマーカー trait
pub trait IdMarker: Send + Sync + 'static {
    /// エラーメッセージで使う名前（例: "enrollment_id"）
    fn kind() -> &'static str;

    /// `random()` で使うプレフィックス（例: "enr-"）
    fn prefix() -> &'static str;
}

/// ジェネリック ID 型
///
/// `T` は PhantomData で、実行時にはメモリを消費しませんが、
/// コンパイル時に型安全性を提供します。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id<T: IdMarker> {
    value: String,
    #[serde(skip)]
    _marker: PhantomData<T>,
}

impl<T: IdMarker> Id<T> {
    /// 外部から渡された ID を検証して作成（空白のみはエラー）
    pub fn new(value: impl Into<String>) -> Result<Self, VigilError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(VigilError::EmptyId(T::kind()));
        }
        Ok(Self {
            value,
            _marker: PhantomData,
        })
    }

    /// デモ・テスト用: プレフィックス付き ULID で生成
    pub fn random() -> Self {
        Self {
            value: format!("{}{}", T::prefix(), Ulid::new()),
            _marker: PhantomData,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl<T: IdMarker> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.value.fmt(f)
    }
}

// ========================================
// マーカー型の定義
// ========================================

/// Enrollment のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Enrollment {}

impl IdMarker for Enrollment {
    fn kind() -> &'static str {
        "enrollment_id"
    }

    fn prefix() -> &'static str {
        "enr-"
    }
}

/// Course のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Course {}

impl IdMarker for Course {
    fn kind() -> &'static str {
        "course_id"
    }

    fn prefix() -> &'static str {
        "crs-"
    }
}

/// Identifier of an enrollment (the unit whose payment we watch).
pub type EnrollmentId = Id<Enrollment>;

/// Identifier of a course (parameterizes the navigation targets).
pub type CourseId = Id<Course>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_distinct_types() {
        let enrollment = EnrollmentId::new("enr_123").unwrap();
        let course = CourseId::new("rust-101").unwrap();

        assert_eq!(enrollment.as_str(), "enr_123");
        assert_eq!(course.as_str(), "rust-101");

        // The whole point: you can't accidentally mix these types.
        // (This is a compile-time property, so we just keep it as a comment.)
        // let _: EnrollmentId = course; // <- does not compile
    }

    #[test]
    fn empty_and_blank_ids_are_rejected() {
        assert_eq!(
            EnrollmentId::new(""),
            Err(VigilError::EmptyId("enrollment_id"))
        );
        assert_eq!(CourseId::new("   "), Err(VigilError::EmptyId("course_id")));
    }

    #[test]
    fn random_ids_carry_their_prefix() {
        let enrollment = EnrollmentId::random();
        let course = CourseId::random();

        assert!(enrollment.as_str().starts_with("enr-"));
        assert!(course.as_str().starts_with("crs-"));
        assert_ne!(EnrollmentId::random(), EnrollmentId::random());
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let course = CourseId::new("rust-101").unwrap();

        let s = serde_json::to_string(&course).unwrap();
        assert_eq!(s, "\"rust-101\"");

        let back: CourseId = serde_json::from_str(&s).unwrap();
        assert_eq!(back, course);
    }

    #[test]
    fn display_shows_the_raw_value() {
        let course = CourseId::new("rust-101").unwrap();
        assert_eq!(course.to_string(), "rust-101");
    }
}
