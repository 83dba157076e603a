//! Auth handlers: sign-up, sign-in, refresh, sign-out.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use crate::dto::request::{
    RefreshRequest, SignInRequest, SignOutRequest, SignUpRequest, validate_body,
};
use crate::dto::response::{ApiResponse, TokenResponse, UserResponse};
use crate::error::ApiError;
use crate::extractors::ClientIp;
use crate::state::AppState;

/// POST /auth/sign-up
pub async fn sign_up(
    State(state): State<AppState>,
    Json(req): Json<SignUpRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), ApiError> {
    validate_body(&req)?;

    let user = state
        .session_manager
        .sign_up(&req.email, &req.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(UserResponse::from(user))),
    ))
}

/// POST /auth/sign-in
pub async fn sign_in(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    Json(req): Json<SignInRequest>,
) -> Result<Json<ApiResponse<TokenResponse>>, ApiError> {
    validate_body(&req)?;

    let tokens = state
        .session_manager
        .sign_in(&req.email, &req.password, ip)
        .await?;

    Ok(Json(ApiResponse::ok(tokens.into())))
}

/// POST /auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<ApiResponse<TokenResponse>>, ApiError> {
    validate_body(&req)?;

    let tokens = state
        .session_manager
        .refresh_tokens(ip, &req.access_token, &req.refresh_token)
        .await?;

    Ok(Json(ApiResponse::ok(tokens.into())))
}

/// POST /auth/sign-out
pub async fn sign_out(
    State(state): State<AppState>,
    Json(req): Json<SignOutRequest>,
) -> Result<StatusCode, ApiError> {
    validate_body(&req)?;

    state.session_manager.sign_out(&req.access_token).await?;

    Ok(StatusCode::NO_CONTENT)
}
