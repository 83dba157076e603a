//! Security notifier trait for out-of-band account alerts.

use async_trait::async_trait;

use crate::result::AppResult;

/// Side channel used to warn a user about suspicious account activity.
///
/// Implementations deliver over e-mail, SMS, push, or just the log. The
/// engine only ever calls [`SecurityNotifier::send`] and treats any error as
/// a delivery failure.
#[async_trait]
pub trait SecurityNotifier: Send + Sync + std::fmt::Debug + 'static {
    /// Deliver a message to `recipient`.
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> AppResult<()>;
}
