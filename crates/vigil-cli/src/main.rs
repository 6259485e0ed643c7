use async_trait::async_trait;
use std::sync::Arc;
use tokio::time::{Duration, sleep};
use tracing_subscriber::EnvFilter;

use std::sync::atomic::{AtomicU32, Ordering};
use vigil_core::app::{CheckerConfig, CheckerView, PaymentStatusChecker};
use vigil_core::domain::{
    CourseId, EnrollmentId, PaymentStatus, PaymentStatusSnapshot, Route, VigilError,
};
use vigil_core::ports::{Navigator, Notifier, StatusSource};

/// デモ用ソース：最初の n 回は失敗し、その後 PENDING を 2 回
/// 返してから COMPLETED になる
struct DemoSource {
    remaining_failures: AtomicU32,
    serves: AtomicU32,
}

impl DemoSource {
    fn new(failures: u32) -> Self {
        Self {
            remaining_failures: AtomicU32::new(failures),
            serves: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl StatusSource for DemoSource {
    async fn fetch(
        &self,
        _enrollment_id: &EnrollmentId,
    ) -> Result<PaymentStatusSnapshot, VigilError> {
        // 擬似ネットワーク遅延
        sleep(Duration::from_millis(40)).await;

        let left = self.remaining_failures.load(Ordering::Relaxed);
        if left > 0 {
            self.remaining_failures.fetch_sub(1, Ordering::Relaxed);
            return Err(VigilError::StatusFetch(format!(
                "status endpoint unreachable (left={left})"
            )));
        }

        let served = self.serves.fetch_add(1, Ordering::Relaxed);
        let status = if served < 2 {
            PaymentStatus::Pending
        } else {
            PaymentStatus::Completed
        };
        Ok(PaymentStatusSnapshot::status_only(status))
    }
}

struct ConsoleNavigator;

impl Navigator for ConsoleNavigator {
    fn navigate(&self, route: Route) {
        println!("[navigate] -> {}", route.path());
    }
}

struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn success(&self, message: &str) {
        println!("[toast/success] {message}");
    }

    fn error(&self, message: &str) {
        println!("[toast/error] {message}");
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // (A) アダプタを用意（1 回だけ失敗するデモ用ソースとコンソール出力）
    let source = Arc::new(DemoSource::new(1));
    let navigator = Arc::new(ConsoleNavigator);
    let notifier = Arc::new(ConsoleNotifier);

    // (B) checker を起動（デモ用に短い間隔）
    let config = CheckerConfig {
        poll_interval: Duration::from_millis(300),
        redirect_delay: Duration::from_secs(1),
        fallback_expiry: Duration::from_secs(120),
        redirect_on_complete: true,
    };
    let enrollment_id = EnrollmentId::random();
    let course_id = CourseId::new("rust-101").expect("valid course id");
    println!("watching payment for enrollment {enrollment_id}");

    let mut handle =
        PaymentStatusChecker::new(enrollment_id, course_id, source, navigator, notifier)
            .config(config)
            .on_status_change(|status| {
                let terminal = if status.is_terminal() { " (terminal)" } else { "" };
                println!("[callback] status -> {status:?}{terminal}");
            })
            .spawn();

    // (C) ビューの変化を追いかける。最初のエラーでは一度だけ再チェックする。
    let mut last = handle.view();
    println!("view: {last:?}");
    let mut retried = false;
    while let Some(view) = handle.changed().await {
        println!("view: {view:?}");
        if matches!(view, CheckerView::Error { .. }) && !retried {
            retried = true;
            println!("fetch failed, checking once more...");
            handle.check_now().await.expect("checker is running");
        }
        last = view;
    }

    // (D) 最後のビューを JSON で出力（組み込み先にそのまま渡せる形）
    println!(
        "final view:\n{}",
        serde_json::to_string_pretty(&last).expect("view serializes")
    );
}
