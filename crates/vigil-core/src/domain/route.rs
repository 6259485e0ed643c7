//! Navigation targets the watcher can send the host to.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::ids::CourseId;

/// Route は遷移先を表す
///
/// The watcher never builds URLs out of raw strings; every navigation
/// goes through this enum so adapters can render it however the host
/// needs (URL, screen id, log line...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "course_id", rename_all = "snake_case")]
pub enum Route {
    /// The course page (`/courses/{course_id}`).
    Course(CourseId),
    /// The checkout page for a course (`/courses/{course_id}/checkout`).
    Checkout(CourseId),
}

impl Route {
    /// プラットフォームの URL レイアウトに沿ったパスを返す
    pub fn path(&self) -> String {
        match self {
            Route::Course(course_id) => format!("/courses/{course_id}"),
            Route::Checkout(course_id) => format!("/courses/{course_id}/checkout"),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
