//! # sessionward-api
//!
//! HTTP API layer for SessionWard built on Axum.
//!
//! Exposes the session engine as JSON endpoints under `/auth`, plus a
//! health check. Handlers stay thin: they validate the body, resolve the
//! client IP, call [`SessionManager`](sessionward_auth::SessionManager),
//! and map errors to status codes.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::build_app;
pub use error::ApiError;
pub use state::AppState;
