//! Health check handler.

use axum::Json;
use axum::extract::State;

use sessionward_core::error::AppError;

use crate::dto::response::{ApiResponse, HealthResponse};
use crate::error::ApiError;
use crate::state::AppState;

/// GET /health
pub async fn health(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<HealthResponse>>, ApiError> {
    let database = match &state.db_pool {
        Some(pool) => {
            pool.ping().await.map_err(|e| {
                tracing::warn!(error = %e, "Health check: database unreachable");
                AppError::service_unavailable("Database unreachable")
            })?;
            Some("connected".to_string())
        }
        None => None,
    };

    Ok(Json(ApiResponse::ok(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database,
    })))
}
