//! Transport layer for completion notifications.
//!
//! The retry loop in [`super::Notifier`] drives a [`NotifyTransport`], so the
//! schedule can be exercised in tests with paused time and a scripted
//! transport instead of a live endpoint.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::types::NotifyPayload;

/// Outcome of a single delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// The endpoint answered; carries the status code and body.
    Status {
        /// HTTP status code.
        code: u16,
        /// Response body, truncated by the transport.
        body: String,
    },
    /// The attempt exceeded the per-attempt timeout.
    Timeout,
    /// The request could not be sent at all.
    Transport(String),
}

impl AttemptOutcome {
    /// Whether this attempt ends the retry loop successfully.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Status { code: 200, .. })
    }

    /// Human-readable failure description for the final outcome.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Status { code, body } => format!("status {code}: {body}"),
            Self::Timeout => "notification request timed out".to_owned(),
            Self::Transport(message) => message.clone(),
        }
    }
}

/// Sends one notification attempt to an evaluation endpoint.
#[async_trait]
pub trait NotifyTransport: Send + Sync {
    /// Deliver the payload once. Infallible at the type level; every failure
    /// mode is an [`AttemptOutcome`] variant so the retry loop can decide.
    async fn send(&self, url: &str, payload: &NotifyPayload) -> AttemptOutcome;
}

/// Response bodies are truncated to this length in failure descriptions.
const BODY_PREVIEW_LIMIT: usize = 500;

/// Real transport: one JSON POST per attempt via reqwest.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Build the transport with the given per-attempt timeout.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl NotifyTransport for HttpTransport {
    async fn send(&self, url: &str, payload: &NotifyPayload) -> AttemptOutcome {
        let response = match self.client.post(url).json(payload).send().await {
            Ok(response) => response,
            Err(e) if e.is_timeout() => return AttemptOutcome::Timeout,
            Err(e) => return AttemptOutcome::Transport(e.to_string()),
        };

        let code = response.status().as_u16();
        let mut body = response.text().await.unwrap_or_default();
        truncate_preview(&mut body);
        AttemptOutcome::Status { code, body }
    }
}

/// Cap a response body at [`BODY_PREVIEW_LIMIT`] bytes, backing off to the
/// nearest character boundary so a multi-byte character straddling the cap
/// cannot panic the truncation.
fn truncate_preview(body: &mut String) {
    if body.len() <= BODY_PREVIEW_LIMIT {
        return;
    }
    let mut cut = BODY_PREVIEW_LIMIT;
    while !body.is_char_boundary(cut) {
        cut -= 1;
    }
    body.truncate(cut);
}

/// Scripted transport for tests and dry runs.
///
/// Plays back a fixed sequence of outcomes, repeating the last one once the
/// script is exhausted, and records every delivered payload.
#[derive(Debug)]
pub struct MockTransport {
    script: Vec<AttemptOutcome>,
    deliveries: Mutex<Vec<(String, NotifyPayload)>>,
}

impl MockTransport {
    /// A transport that plays back `script` in order.
    #[must_use]
    pub fn scripted(script: Vec<AttemptOutcome>) -> Self {
        Self {
            script,
            deliveries: Mutex::new(Vec::new()),
        }
    }

    /// A transport whose every attempt succeeds with HTTP 200.
    #[must_use]
    pub fn always_ok() -> Self {
        Self::scripted(vec![AttemptOutcome::Status {
            code: 200,
            body: String::new(),
        }])
    }

    /// A transport whose every attempt fails with the given status.
    #[must_use]
    pub fn always_status(code: u16, body: &str) -> Self {
        Self::scripted(vec![AttemptOutcome::Status {
            code,
            body: body.to_owned(),
        }])
    }

    /// Number of attempts delivered so far.
    pub fn attempts(&self) -> usize {
        self.deliveries.lock().map(|d| d.len()).unwrap_or(0)
    }

    /// Every `(url, payload)` pair delivered so far.
    pub fn deliveries(&self) -> Vec<(String, NotifyPayload)> {
        self.deliveries.lock().map(|d| d.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl NotifyTransport for MockTransport {
    async fn send(&self, url: &str, payload: &NotifyPayload) -> AttemptOutcome {
        let index = {
            let mut deliveries = match self.deliveries.lock() {
                Ok(deliveries) => deliveries,
                Err(poisoned) => poisoned.into_inner(),
            };
            deliveries.push((url.to_owned(), payload.clone()));
            deliveries.len() - 1
        };
        self.script
            .get(index)
            .or_else(|| self.script.last())
            .cloned()
            .unwrap_or(AttemptOutcome::Transport("empty mock script".to_owned()))
    }
}
