//! Wording of the IP-change security alert.

use std::net::IpAddr;

use chrono::{DateTime, Utc};

/// Subject line of the IP-change alert.
pub const IP_CHANGE_SUBJECT: &str = "Security alert: your session was refreshed from a new IP address";

/// Body of the IP-change alert sent to the account's e-mail.
pub fn ip_change_body(previous_ip: IpAddr, current_ip: IpAddr, at: DateTime<Utc>) -> String {
    format!(
        "Your session was refreshed from {current_ip} at {} UTC.\n\
         The previous token had been issued to {previous_ip}.\n\n\
         If this was not you, sign in again and change your password.",
        at.format("%Y-%m-%d %H:%M:%S")
    )
}
