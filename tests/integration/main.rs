//! HTTP-level integration tests over in-memory stores.

mod auth_test;
mod helpers;
