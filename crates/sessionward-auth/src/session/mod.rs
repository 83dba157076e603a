//! Session lifecycle: sign-up, sign-in, rotation, and sign-out.

pub mod alert;
pub mod manager;

pub use manager::SessionManager;
