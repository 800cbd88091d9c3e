//! Poll loop - fetch, validate, translate, notify, sleep
//!
//! The orchestrator owns the cursor and drives one cycle at a time.
//! Every recoverable error is caught at this single boundary: logged,
//! reported through a best-effort error notification, and the loop
//! continues after the flat inter-cycle delay. The cursor only advances
//! after a cycle that either had nothing to send or delivered its
//! notification successfully.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::Value;

use crate::api::StatusApi;
use crate::error::Result;
use crate::notify::Notifier;
use crate::status::parse_status;
use crate::validate::check_response;

/// What happened during one cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// A status change was delivered
    Notified,
    /// Nothing new to report
    Quiet,
    /// The notification could not be delivered; the cursor was held so
    /// the same change is retried next cycle
    DeliveryFailed,
    /// A recoverable error aborted the cycle; it was logged and reported
    Failed(String),
}

/// The poll orchestrator
pub struct PollLoop {
    api: Arc<dyn StatusApi>,
    notifier: Notifier,
    timestamp: i64,
    period: Duration,
}

impl PollLoop {
    /// Create a loop starting from the current wall-clock time
    pub fn new(api: Arc<dyn StatusApi>, notifier: Notifier, period: Duration) -> Self {
        Self {
            api,
            notifier,
            timestamp: Utc::now().timestamp(),
            period,
        }
    }

    /// Override the starting cursor
    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Current cursor value
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Run one cycle, handling every recoverable error at this boundary
    pub async fn cycle(&mut self) -> CycleOutcome {
        match self.try_cycle().await {
            Ok(outcome) => outcome,
            Err(err) => {
                log::error!("Cycle failed: {}", err);
                let report = format!("Сбой в работе программы: {}", err);
                if !self.notifier.notify(&report).await {
                    log::error!("Failure report was not delivered");
                }
                CycleOutcome::Failed(err.to_string())
            }
        }
    }

    async fn try_cycle(&mut self) -> Result<CycleOutcome> {
        let response = self.api.fetch(self.timestamp).await?;
        let homeworks = check_response(&response)?;

        let outcome = match homeworks.first() {
            Some(newest) => {
                let message = parse_status(newest)?;
                if !self.notifier.notify(&message).await {
                    return Ok(CycleOutcome::DeliveryFailed);
                }
                CycleOutcome::Notified
            }
            None => CycleOutcome::Quiet,
        };

        self.timestamp = response
            .get("current_date")
            .and_then(Value::as_i64)
            .unwrap_or(self.timestamp);

        Ok(outcome)
    }

    /// Run forever; the inter-cycle sleep is interruptible by ctrl-c
    pub async fn run(&mut self) {
        log::info!(
            "Poll loop started with from_date={} period={}s",
            self.timestamp,
            self.period.as_secs()
        );

        loop {
            let outcome = self.cycle().await;
            log::debug!("Cycle finished: {:?}", outcome);

            tokio::select! {
                _ = tokio::time::sleep(self.period) => {}
                _ = tokio::signal::ctrl_c() => {
                    log::info!("Shutdown signal received, stopping poll loop");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReviewbotError;
    use crate::notify::Messenger;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Mock API returning a fixed sequence of canned results
    struct MockStatusApi {
        responses: Mutex<Vec<Result<Value>>>,
    }

    impl MockStatusApi {
        fn new(responses: Vec<Result<Value>>) -> Self {
            Self {
                responses: Mutex::new(responses),
            }
        }

        fn single(response: Value) -> Self {
            Self::new(vec![Ok(response)])
        }
    }

    #[async_trait]
    impl StatusApi for MockStatusApi {
        async fn fetch(&self, _from_date: i64) -> Result<Value> {
            self.responses
                .lock()
                .unwrap()
                .remove(0)
        }
    }

    /// Mock messenger that records sends and can be told to fail
    struct MockMessenger {
        sent: Arc<Mutex<Vec<String>>>,
        fail: AtomicBool,
    }

    impl MockMessenger {
        fn new() -> (Self, Arc<Mutex<Vec<String>>>) {
            let sent = Arc::new(Mutex::new(Vec::new()));
            let mock = Self {
                sent: Arc::clone(&sent),
                fail: AtomicBool::new(false),
            };
            (mock, sent)
        }

        fn failing() -> (Self, Arc<Mutex<Vec<String>>>) {
            let (mock, sent) = Self::new();
            mock.fail.store(true, Ordering::SeqCst);
            (mock, sent)
        }
    }

    #[async_trait]
    impl Messenger for MockMessenger {
        async fn send(&self, text: &str) -> Result<()> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(ReviewbotError::Delivery("chat not found".to_string()));
            }
            self.sent.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    fn make_loop(api: MockStatusApi, messenger: MockMessenger) -> PollLoop {
        PollLoop::new(
            Arc::new(api),
            Notifier::new(Box::new(messenger)),
            Duration::from_secs(600),
        )
        .with_timestamp(0)
    }

    #[tokio::test]
    async fn test_scenario_a_status_change_delivered_cursor_advances() {
        let api = MockStatusApi::single(json!({
            "homeworks": [{"homework_name": "hw1", "status": "approved"}],
            "current_date": 1000
        }));
        let (messenger, sent) = MockMessenger::new();
        let mut poll = make_loop(api, messenger);

        let outcome = poll.cycle().await;

        assert_eq!(outcome, CycleOutcome::Notified);
        assert_eq!(poll.timestamp(), 1000);
        assert_eq!(
            *sent.lock().unwrap(),
            vec![
                "Изменился статус проверки работы \"hw1\". Работа проверена: ревьюеру всё понравилось. Ура!"
            ]
        );
    }

    #[tokio::test]
    async fn test_scenario_b_empty_list_no_send_cursor_fallback() {
        let api = MockStatusApi::single(json!({"homeworks": []}));
        let (messenger, sent) = MockMessenger::new();
        let mut poll = make_loop(api, messenger);

        let outcome = poll.cycle().await;

        assert_eq!(outcome, CycleOutcome::Quiet);
        // current_date absent: cursor unchanged
        assert_eq!(poll.timestamp(), 0);
        assert!(sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_scenario_b_empty_list_advances_to_current_date() {
        let api = MockStatusApi::single(json!({"homeworks": [], "current_date": 2000}));
        let (messenger, _sent) = MockMessenger::new();
        let mut poll = make_loop(api, messenger);

        assert_eq!(poll.cycle().await, CycleOutcome::Quiet);
        assert_eq!(poll.timestamp(), 2000);
    }

    #[tokio::test]
    async fn test_scenario_c_unknown_status_reported_cursor_held() {
        let api = MockStatusApi::single(json!({
            "homeworks": [{"homework_name": "hw2", "status": "unknown"}],
            "current_date": 3000
        }));
        let (messenger, sent) = MockMessenger::new();
        let mut poll = make_loop(api, messenger);

        let outcome = poll.cycle().await;

        assert!(matches!(outcome, CycleOutcome::Failed(_)));
        assert_eq!(poll.timestamp(), 0);

        // The error notification was attempted, with the failure described
        let sent = sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].starts_with("Сбой в работе программы:"));
        assert!(sent[0].contains("unknown homework status: unknown"));
    }

    #[tokio::test]
    async fn test_scenario_d_http_503_reported_cursor_held() {
        let api = MockStatusApi::new(vec![Err(ReviewbotError::StatusCode {
            status: 503,
            from_date: 0,
        })]);
        let (messenger, sent) = MockMessenger::new();
        let mut poll = make_loop(api, messenger);

        let outcome = poll.cycle().await;

        assert_eq!(
            outcome,
            CycleOutcome::Failed("API returned HTTP 503 for from_date=0".to_string())
        );
        assert_eq!(poll.timestamp(), 0);
        assert!(sent.lock().unwrap()[0].contains("HTTP 503"));
    }

    #[tokio::test]
    async fn test_invalid_shape_reported_cursor_held() {
        let api = MockStatusApi::single(json!(["not", "a", "mapping"]));
        let (messenger, sent) = MockMessenger::new();
        let mut poll = make_loop(api, messenger);

        let outcome = poll.cycle().await;

        assert!(matches!(outcome, CycleOutcome::Failed(_)));
        assert_eq!(poll.timestamp(), 0);
        assert!(sent.lock().unwrap()[0].contains("not an object"));
    }

    #[tokio::test]
    async fn test_delivery_failure_holds_cursor_for_retry() {
        let api = MockStatusApi::single(json!({
            "homeworks": [{"homework_name": "hw1", "status": "approved"}],
            "current_date": 1000
        }));
        let (messenger, _sent) = MockMessenger::failing();
        let mut poll = make_loop(api, messenger);

        let outcome = poll.cycle().await;

        assert_eq!(outcome, CycleOutcome::DeliveryFailed);
        // No advance: the same change is retried next cycle
        assert_eq!(poll.timestamp(), 0);
    }

    #[tokio::test]
    async fn test_error_report_failure_is_swallowed() {
        let api = MockStatusApi::new(vec![Err(ReviewbotError::StatusCode {
            status: 500,
            from_date: 0,
        })]);
        let (messenger, _sent) = MockMessenger::failing();
        let mut poll = make_loop(api, messenger);

        // Both the cycle and its error report fail; neither panics
        let outcome = poll.cycle().await;
        assert!(matches!(outcome, CycleOutcome::Failed(_)));
        assert_eq!(poll.timestamp(), 0);
    }

    #[tokio::test]
    async fn test_only_first_homework_acted_upon() {
        let api = MockStatusApi::single(json!({
            "homeworks": [
                {"homework_name": "newest", "status": "rejected"},
                {"homework_name": "older", "status": "approved"}
            ],
            "current_date": 4000
        }));
        let (messenger, sent) = MockMessenger::new();
        let mut poll = make_loop(api, messenger);

        assert_eq!(poll.cycle().await, CycleOutcome::Notified);

        let sent = sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains("newest"));
        assert!(sent[0].contains("у ревьюера есть замечания"));
    }

    #[tokio::test]
    async fn test_cycle_idempotent_with_same_response() {
        let response = json!({
            "homeworks": [{"homework_name": "hw1", "status": "reviewing"}],
            "current_date": 0
        });
        let api = MockStatusApi::new(vec![Ok(response.clone()), Ok(response)]);
        let (messenger, sent) = MockMessenger::new();
        let mut poll = make_loop(api, messenger);

        let first = poll.cycle().await;
        let cursor_after_first = poll.timestamp();
        let second = poll.cycle().await;

        assert_eq!(first, second);
        assert_eq!(poll.timestamp(), cursor_after_first);
        let sent = sent.lock().unwrap();
        assert_eq!(sent[0], sent[1]);
    }

    #[tokio::test]
    async fn test_failure_then_recovery_advances_cursor() {
        let api = MockStatusApi::new(vec![
            Err(ReviewbotError::StatusCode {
                status: 503,
                from_date: 0,
            }),
            Ok(json!({"homeworks": [], "current_date": 5000})),
        ]);
        let (messenger, _sent) = MockMessenger::new();
        let mut poll = make_loop(api, messenger);

        assert!(matches!(poll.cycle().await, CycleOutcome::Failed(_)));
        assert_eq!(poll.timestamp(), 0);

        assert_eq!(poll.cycle().await, CycleOutcome::Quiet);
        assert_eq!(poll.timestamp(), 5000);
    }

    #[test]
    fn test_new_starts_from_now() {
        struct NeverApi;

        #[async_trait]
        impl StatusApi for NeverApi {
            async fn fetch(&self, _from_date: i64) -> Result<Value> {
                unreachable!("not called in this test")
            }
        }

        let (messenger, _sent) = MockMessenger::new();
        let before = Utc::now().timestamp();
        let poll = PollLoop::new(
            Arc::new(NeverApi),
            Notifier::new(Box::new(messenger)),
            Duration::from_secs(600),
        );
        let after = Utc::now().timestamp();

        assert!(poll.timestamp() >= before && poll.timestamp() <= after);
    }
}
