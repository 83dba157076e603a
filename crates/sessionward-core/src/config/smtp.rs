//! SMTP delivery settings for security alerts.

use serde::{Deserialize, Serialize};

/// Outbound mail configuration.
///
/// When `enabled` is false the server logs alerts instead of mailing them.
#[derive(Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    /// Whether alerts are delivered over SMTP.
    #[serde(default)]
    pub enabled: bool,
    /// SMTP relay hostname.
    #[serde(default)]
    pub host: String,
    /// SMTP relay port (STARTTLS).
    #[serde(default = "default_port")]
    pub port: u16,
    /// RFC 5322 "From" address.
    #[serde(default = "default_from")]
    pub from: String,
    /// Optional SMTP username.
    #[serde(default)]
    pub username: Option<String>,
    /// Optional SMTP password.
    #[serde(default)]
    pub password: Option<String>,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: String::new(),
            port: default_port(),
            from: default_from(),
            username: None,
            password: None,
        }
    }
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("enabled", &self.enabled)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("from", &self.from)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

fn default_port() -> u16 {
    587
}

fn default_from() -> String {
    "noreply@sessionward.local".to_string()
}
