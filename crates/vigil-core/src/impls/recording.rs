//! Recording adapters - 記録するだけのアダプタ
//!
//! [`Navigator`] と [`Notifier`] のテスト・デモ用実装。受け取った副作用を
//! そのまま覚えておき、後から検証できるようにします。

use std::sync::Mutex;

use crate::domain::Route;
use crate::ports::{Navigator, Notifier};

/// 遷移先を記録する Navigator
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    visited: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 記録された遷移先（古い順）
    pub fn visited(&self) -> Vec<Route> {
        self.visited.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        self.visited.lock().unwrap().push(route);
    }
}

/// トーストを記録する Notifier
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    successes: Mutex<Vec<String>>,
    errors: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn successes(&self) -> Vec<String> {
        self.successes.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn success(&self, message: &str) {
        self.successes.lock().unwrap().push(message.to_string());
    }

    fn error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CourseId;

    #[test]
    fn navigator_records_routes_in_order() {
        let navigator = RecordingNavigator::new();
        let course_id = CourseId::new("c1").unwrap();

        navigator.navigate(Route::Checkout(course_id.clone()));
        navigator.navigate(Route::Course(course_id.clone()));

        assert_eq!(
            navigator.visited(),
            vec![Route::Checkout(course_id.clone()), Route::Course(course_id)]
        );
    }

    #[test]
    fn notifier_keeps_successes_and_errors_apart() {
        let notifier = RecordingNotifier::new();

        notifier.success("done");
        notifier.error("nope");

        assert_eq!(notifier.successes(), vec!["done".to_string()]);
        assert_eq!(notifier.errors(), vec!["nope".to_string()]);
    }
}
