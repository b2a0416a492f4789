use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};

use super::json_body;
use crate::{
    error::AppResult,
    models::user::{LoginRequest, LoginResponse, RegisterRequest, User},
    response::ApiResponse,
    state::AppState,
};

pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<ApiResponse<User>>)> {
    let body = json_body(payload)?;
    let user = state.auth_service().register(&body).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new("User registered successfully", user)),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<Json<ApiResponse<LoginResponse>>> {
    let body = json_body(payload)?;
    let response = state.auth_service().login(&body).await?;
    Ok(Json(ApiResponse::new("Login successful", response)))
}

/// Tokens are stateless; there is nothing to revoke.
pub async fn logout() -> Json<ApiResponse<()>> {
    Json(ApiResponse::message("Logout successful"))
}
