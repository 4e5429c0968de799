//! Completion notification with bounded retries.
//!
//! The notifier POSTs the completion payload to the caller-supplied
//! evaluation URL. An attempt succeeds on HTTP 200 exactly; anything else,
//! including timeouts and transport errors, is retried on a fixed backoff
//! schedule. Exhausting the schedule is not a pipeline failure: the caller
//! records the outcome and reports partial success, since the site is
//! already live.

pub mod transport;

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::config::NotifierConfig;
use crate::error::{DeployError, DeployResult};
use crate::types::{NotifyOutcome, NotifyPayload};

pub use transport::{AttemptOutcome, HttpTransport, MockTransport, NotifyTransport};

/// Maximum delivery attempts per notification.
pub const MAX_ATTEMPTS: usize = 5;

/// Backoff delays in seconds, indexed by the attempt that just failed.
///
/// Only the first four slots are reachable with five attempts; the schedule
/// is kept whole because its shape is part of the documented contract.
pub const BACKOFF_SCHEDULE_SECS: [u64; 5] = [1, 2, 4, 8, 16];

/// Drives the retry loop over a [`NotifyTransport`].
pub struct Notifier {
    transport: Arc<dyn NotifyTransport>,
}

impl Notifier {
    /// Build the notifier with an HTTP transport from configuration.
    pub fn from_config(config: &NotifierConfig) -> DeployResult<Self> {
        let transport = HttpTransport::new(Duration::from_secs(config.timeout_secs))
            .map_err(|e| DeployError::config(format!("notifier http client: {e}")))?;
        Ok(Self::new(Arc::new(transport)))
    }

    /// Build the notifier over an explicit transport.
    #[must_use]
    pub fn new(transport: Arc<dyn NotifyTransport>) -> Self {
        Self { transport }
    }

    /// Deliver the payload, retrying per the fixed schedule. Always returns
    /// an outcome; a failed outcome carries the final attempt's error.
    pub async fn notify(&self, url: &str, payload: &NotifyPayload) -> NotifyOutcome {
        let mut last_error = String::new();

        for attempt in 1..=MAX_ATTEMPTS {
            let outcome = self.transport.send(url, payload).await;
            if outcome.is_success() {
                info!(attempt, "evaluation endpoint acknowledged notification");
                return NotifyOutcome::delivered();
            }

            last_error = outcome.describe();
            if attempt < MAX_ATTEMPTS {
                let delay_secs = BACKOFF_SCHEDULE_SECS[attempt - 1];
                warn!(
                    attempt,
                    error = %last_error,
                    delay_secs,
                    "notification attempt failed, retrying"
                );
                tokio::time::sleep(Duration::from_secs(delay_secs)).await;
            }
        }

        warn!(error = %last_error, "all notification attempts failed");
        NotifyOutcome::failed(last_error)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    fn payload() -> NotifyPayload {
        NotifyPayload {
            email: "dev@example.com".to_owned(),
            task: "clock-app".to_owned(),
            round: 1,
            nonce: "n-1".to_owned(),
            repo_url: "https://github.com/o/clock-app".to_owned(),
            commit_sha: "abc123".to_owned(),
            pages_url: "https://o.github.io/clock-app/".to_owned(),
        }
    }

    #[tokio::test]
    async fn test_first_attempt_success_sends_once() {
        let transport = Arc::new(MockTransport::always_ok());
        let notifier = Notifier::new(Arc::clone(&transport) as Arc<dyn NotifyTransport>);

        let outcome = notifier.notify("https://eval.test/hook", &payload()).await;
        assert!(outcome.success);
        assert_eq!(transport.attempts(), 1);

        let deliveries = transport.deliveries();
        assert_eq!(deliveries[0].0, "https://eval.test/hook");
        assert_eq!(deliveries[0].1.nonce, "n-1");
    }

    #[tokio::test(start_paused = true)]
    async fn test_persistent_failure_stops_after_five_attempts() {
        let transport = Arc::new(MockTransport::always_status(500, "boom"));
        let notifier = Notifier::new(Arc::clone(&transport) as Arc<dyn NotifyTransport>);

        let started = Instant::now();
        let outcome = notifier.notify("https://eval.test/hook", &payload()).await;

        assert!(!outcome.success);
        assert_eq!(outcome.error.as_deref(), Some("status 500: boom"));
        assert_eq!(transport.attempts(), MAX_ATTEMPTS);
        // Four sleeps: 1 + 2 + 4 + 8 seconds of virtual time.
        assert_eq!(started.elapsed(), Duration::from_secs(15));
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovery_mid_schedule() {
        let transport = Arc::new(MockTransport::scripted(vec![
            AttemptOutcome::Timeout,
            AttemptOutcome::Transport("connection refused".to_owned()),
            AttemptOutcome::Status {
                code: 200,
                body: String::new(),
            },
        ]));
        let notifier = Notifier::new(Arc::clone(&transport) as Arc<dyn NotifyTransport>);

        let started = Instant::now();
        let outcome = notifier.notify("https://eval.test/hook", &payload()).await;

        assert!(outcome.success);
        assert_eq!(transport.attempts(), 3);
        // Slept 1s after the timeout and 2s after the transport error.
        assert_eq!(started.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_final_outcome_reports_last_error() {
        let transport = Arc::new(MockTransport::scripted(vec![
            AttemptOutcome::Status {
                code: 500,
                body: "first".to_owned(),
            },
            AttemptOutcome::Status {
                code: 502,
                body: "second".to_owned(),
            },
            AttemptOutcome::Timeout,
            AttemptOutcome::Transport("dns failure".to_owned()),
            AttemptOutcome::Status {
                code: 503,
                body: "last".to_owned(),
            },
        ]));
        let notifier = Notifier::new(Arc::clone(&transport) as Arc<dyn NotifyTransport>);

        let outcome = notifier.notify("https://eval.test/hook", &payload()).await;
        assert!(!outcome.success);
        assert_eq!(outcome.error.as_deref(), Some("status 503: last"));
    }
}
