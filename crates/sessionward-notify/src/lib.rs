//! # sessionward-notify
//!
//! [`SecurityNotifier`](sessionward_core::traits::SecurityNotifier)
//! implementations:
//!
//! - [`SmtpNotifier`]: plain-text mail over an async STARTTLS relay
//! - [`LogNotifier`]: writes the alert to the tracing log only
//! - [`RecordingNotifier`]: keeps alerts in memory, for tests and local runs

pub mod log;
pub mod recording;
pub mod smtp;

pub use log::LogNotifier;
pub use recording::{RecordingNotifier, SentAlert};
pub use smtp::SmtpNotifier;
