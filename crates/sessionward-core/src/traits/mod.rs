//! Core traits defined in `sessionward-core` and implemented by other crates.

pub mod notifier;

pub use notifier::SecurityNotifier;
