//! In-memory alert sink.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use sessionward_core::error::AppError;
use sessionward_core::result::AppResult;
use sessionward_core::traits::SecurityNotifier;

/// One alert captured by [`RecordingNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentAlert {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

/// Records every alert instead of delivering it.
///
/// Can be switched to fail or to stall, to exercise delivery-failure and
/// deadline paths.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<SentAlert>>>,
    failing: Arc<AtomicBool>,
    delay: Option<Duration>,
}

impl RecordingNotifier {
    /// Creates a notifier that accepts everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a notifier that sleeps for `delay` before recording.
    pub fn stalling(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    /// Makes subsequent sends fail (`true`) or succeed (`false`).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Alerts recorded so far, oldest first.
    pub async fn sent(&self) -> Vec<SentAlert> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl SecurityNotifier for RecordingNotifier {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> AppResult<()> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::external_service(format!(
                "Alert delivery to {recipient} refused"
            )));
        }

        self.sent.lock().await.push(SentAlert {
            recipient: recipient.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}
