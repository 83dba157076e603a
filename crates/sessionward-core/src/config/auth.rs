//! Authentication configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Authentication and credential configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for access token signing (HMAC-SHA512). Must not be empty.
    #[serde(default)]
    pub jwt_secret: String,
    /// Access token TTL in minutes.
    #[serde(default = "default_access_ttl")]
    pub access_ttl_minutes: u64,
    /// Refresh token (session) TTL in hours.
    #[serde(default = "default_refresh_ttl")]
    pub refresh_ttl_hours: u64,
    /// Minimum password length.
    #[serde(default = "default_password_min")]
    pub password_min_length: usize,
    /// Maximum password length.
    #[serde(default = "default_password_max")]
    pub password_max_length: usize,
    /// Deadline for each store or notifier call, in seconds.
    #[serde(default = "default_operation_timeout")]
    pub operation_timeout_seconds: u64,
    /// What to do when the IP-change alert cannot be delivered.
    #[serde(default)]
    pub ip_change_alert: AlertPolicy,
    /// Argon2id work factor for password and refresh-token hashes.
    #[serde(default)]
    pub hashing: HashingConfig,
}

impl AuthConfig {
    /// Returns the per-call deadline as a [`Duration`].
    pub fn operation_timeout(&self) -> Duration {
        Duration::from_secs(self.operation_timeout_seconds)
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            access_ttl_minutes: default_access_ttl(),
            refresh_ttl_hours: default_refresh_ttl(),
            password_min_length: default_password_min(),
            password_max_length: default_password_max(),
            operation_timeout_seconds: default_operation_timeout(),
            ip_change_alert: AlertPolicy::default(),
            hashing: HashingConfig::default(),
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("access_ttl_minutes", &self.access_ttl_minutes)
            .field("refresh_ttl_hours", &self.refresh_ttl_hours)
            .field("password_min_length", &self.password_min_length)
            .field("password_max_length", &self.password_max_length)
            .field("operation_timeout_seconds", &self.operation_timeout_seconds)
            .field("ip_change_alert", &self.ip_change_alert)
            .field("hashing", &self.hashing)
            .finish()
    }
}

/// Delivery policy for the security alert sent when a refresh comes from a
/// different IP than the one bound into the access token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AlertPolicy {
    /// A failed alert fails the refresh call, even though the new session
    /// has already been committed.
    #[default]
    Required,
    /// A failed alert is logged and the new tokens are still returned.
    BestEffort,
}

impl std::fmt::Display for AlertPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertPolicy::Required => write!(f, "required"),
            AlertPolicy::BestEffort => write!(f, "best_effort"),
        }
    }
}

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashingConfig {
    /// Memory cost in KiB.
    #[serde(default = "default_memory_kib")]
    pub memory_kib: u32,
    /// Number of passes.
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    /// Degree of parallelism.
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            memory_kib: default_memory_kib(),
            iterations: default_iterations(),
            parallelism: default_parallelism(),
        }
    }
}

fn default_access_ttl() -> u64 {
    15
}

fn default_refresh_ttl() -> u64 {
    720
}

fn default_password_min() -> usize {
    6
}

fn default_password_max() -> usize {
    64
}

fn default_operation_timeout() -> u64 {
    10
}

// Argon2 crate defaults (OWASP minimum for Argon2id).
fn default_memory_kib() -> u32 {
    19 * 1024
}

fn default_iterations() -> u32 {
    2
}

fn default_parallelism() -> u32 {
    1
}
