//! Log-only alert delivery.

use async_trait::async_trait;

use sessionward_core::result::AppResult;
use sessionward_core::traits::SecurityNotifier;

/// Emits each alert as a WARN event and never fails.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

impl LogNotifier {
    /// Creates a log notifier.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SecurityNotifier for LogNotifier {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> AppResult<()> {
        tracing::warn!(
            recipient = %recipient,
            subject = %subject,
            body = %body,
            "Security alert (SMTP disabled)"
        );
        Ok(())
    }
}
