//! SMTP alert delivery.

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use sessionward_core::config::SmtpConfig;
use sessionward_core::error::{AppError, ErrorKind};
use sessionward_core::result::AppResult;
use sessionward_core::traits::SecurityNotifier;

/// Sends alerts as plain-text mail through a STARTTLS relay.
///
/// The transport pools its connections and is built once at startup.
#[derive(Clone)]
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    relay: String,
}

impl std::fmt::Debug for SmtpNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpNotifier")
            .field("relay", &self.relay)
            .field("from", &self.from.to_string())
            .finish_non_exhaustive()
    }
}

impl SmtpNotifier {
    /// Builds the relay transport from configuration.
    pub fn new(config: &SmtpConfig) -> AppResult<Self> {
        let from: Mailbox = config.from.parse().map_err(|e| {
            AppError::with_source(
                ErrorKind::Configuration,
                format!("Invalid SMTP sender address '{}'", config.from),
                e,
            )
        })?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    format!("Invalid SMTP relay '{}'", config.host),
                    e,
                )
            })?
            .port(config.port);

        if let (Some(user), Some(pass)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            from,
            relay: format!("{}:{}", config.host, config.port),
        })
    }

    /// Assembles the MIME message for one alert.
    fn build_message(&self, recipient: &str, subject: &str, body: &str) -> AppResult<Message> {
        let to: Mailbox = recipient.parse().map_err(|e| {
            AppError::with_source(
                ErrorKind::ExternalService,
                "Alert recipient is not a valid mailbox",
                e,
            )
        })?;

        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| {
                AppError::with_source(ErrorKind::ExternalService, "Failed to build alert mail", e)
            })
    }
}

#[async_trait]
impl SecurityNotifier for SmtpNotifier {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> AppResult<()> {
        let message = self.build_message(recipient, subject, body)?;

        self.transport.send(message).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::ExternalService,
                format!("SMTP relay {} rejected alert", self.relay),
                e,
            )
        })?;

        tracing::info!(relay = %self.relay, "Security alert mailed");
        Ok(())
    }
}
