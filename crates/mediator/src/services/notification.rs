//! Customer notification gateway.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::{Notify, RwLock};

/// Reasons a notification could not be delivered.
///
/// These never reach the caller of the pipeline; they are logged and
/// metered only.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// The gateway could not be reached.
    #[error("Notification gateway unavailable: {0}")]
    Unavailable(String),

    /// The contact address was not acceptable to the gateway.
    #[error("Invalid contact address: {0}")]
    InvalidAddress(String),

    /// The gateway did not answer in time.
    #[error("Notification timed out after {}ms", .0.as_millis())]
    Timeout(Duration),
}

/// Best-effort message dispatch to a customer address.
///
/// One gateway is shared by every in-flight pipeline.
#[async_trait]
pub trait NotificationGateway: Send + Sync {
    /// Sends `message` to `contact`.
    async fn send(&self, contact: &str, message: &str) -> Result<(), NotificationError>;
}

/// A notification accepted by the in-memory gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentNotification {
    pub contact: String,
    pub message: String,
}

#[derive(Debug, Default)]
struct InMemoryNotificationState {
    sent: Vec<SentNotification>,
    attempts: usize,
    fail_on_send: bool,
    send_delay: Option<Duration>,
}

/// In-memory notification gateway for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNotificationGateway {
    state: Arc<RwLock<InMemoryNotificationState>>,
    changed: Arc<Notify>,
}

impl InMemoryNotificationGateway {
    /// Creates a new in-memory notification gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent send fail.
    pub async fn set_fail_on_send(&self, fail: bool) {
        self.state.write().await.fail_on_send = fail;
    }

    /// Delays every send by the given duration.
    pub async fn set_send_delay(&self, delay: Option<Duration>) {
        self.state.write().await.send_delay = delay;
    }

    /// Returns how many times `send` has been called.
    pub async fn attempts(&self) -> usize {
        self.state.read().await.attempts
    }

    /// Returns the number of notifications accepted.
    pub async fn sent_count(&self) -> usize {
        self.state.read().await.sent.len()
    }

    /// Returns all accepted notifications in the order they were sent.
    pub async fn messages(&self) -> Vec<SentNotification> {
        self.state.read().await.sent.clone()
    }

    /// Waits until at least `n` sends have been attempted.
    ///
    /// Returns false if `timeout` elapses first.
    pub async fn wait_for_attempts(&self, n: usize, timeout: Duration) -> bool {
        self.wait_until(timeout, |state| state.attempts >= n).await
    }

    /// Waits until at least `n` notifications have been accepted.
    ///
    /// Returns false if `timeout` elapses first.
    pub async fn wait_for_sent(&self, n: usize, timeout: Duration) -> bool {
        self.wait_until(timeout, |state| state.sent.len() >= n).await
    }

    async fn wait_until<F>(&self, timeout: Duration, done: F) -> bool
    where
        F: Fn(&InMemoryNotificationState) -> bool,
    {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let changed = self.changed.notified();
            if done(&*self.state.read().await) {
                return true;
            }
            if tokio::time::timeout_at(deadline, changed).await.is_err() {
                return done(&*self.state.read().await);
            }
        }
    }
}

#[async_trait]
impl NotificationGateway for InMemoryNotificationGateway {
    async fn send(&self, contact: &str, message: &str) -> Result<(), NotificationError> {
        let (fail, delay) = {
            let mut state = self.state.write().await;
            state.attempts += 1;
            (state.fail_on_send, state.send_delay)
        };
        self.changed.notify_waiters();

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if fail {
            return Err(NotificationError::Unavailable(
                "in-memory gateway configured to fail".to_string(),
            ));
        }

        self.state.write().await.sent.push(SentNotification {
            contact: contact.to_string(),
            message: message.to_string(),
        });
        self.changed.notify_waiters();
        Ok(())
    }
}

/// SMS gateway that only logs what it would send.
///
/// Used when no SMS provider session is configured. Destination numbers are
/// still validated so malformed contacts show up as notification failures.
#[derive(Debug, Clone)]
pub struct LogSmsGateway {
    source_address: String,
}

impl LogSmsGateway {
    pub fn new(source_address: impl Into<String>) -> Self {
        Self {
            source_address: source_address.into(),
        }
    }

    pub fn source_address(&self) -> &str {
        &self.source_address
    }
}

impl Default for LogSmsGateway {
    fn default() -> Self {
        Self::new("12345")
    }
}

/// An optional leading `+` followed by 3 to 15 digits.
fn is_phone_number(contact: &str) -> bool {
    let digits = contact.strip_prefix('+').unwrap_or(contact);
    (3..=15).contains(&digits.len()) && digits.bytes().all(|b| b.is_ascii_digit())
}

#[async_trait]
impl NotificationGateway for LogSmsGateway {
    async fn send(&self, contact: &str, message: &str) -> Result<(), NotificationError> {
        if !is_phone_number(contact) {
            return Err(NotificationError::InvalidAddress(contact.to_string()));
        }
        tracing::info!(
            source = %self.source_address,
            destination = %contact,
            %message,
            "SMS gateway not bound, message logged only"
        );
        Ok(())
    }
}
