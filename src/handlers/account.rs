//! Account HTTP handlers

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;
use validator::Validate;

use crate::{
    auth::PasswordHasher,
    error::AppError,
    middleware::AppState,
    models::account::{LoginRequest, RegisterRequest},
};

/// Register a new account
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    PasswordHasher::validate_password_policy(&req.password, &state.config)?;

    let account = state.auth_service.register(req).await?;

    Ok((StatusCode::CREATED, Json(account)))
}

/// Log in to an existing account
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let account = state.auth_service.login(req).await?;

    Ok(Json(account))
}
