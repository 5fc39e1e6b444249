// src/handlers/users.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;
use validator::Validate;

use crate::{
    error::AppError,
    extract::Json,
    models::user::{CreateUserRequest, LoginRequest, hash_password, verify_password},
    state::AppState,
    utils::jwt::sign_jwt,
};

/// Registers a new user.
///
/// Hashes the password with Argon2 before storing it. Returns 201 and the
/// user object (the hash is never serialized).
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let password_hash = hash_password(&payload.password)?;
    let user = state
        .users
        .insert(&payload.username, &password_hash, "user")
        .await?;

    Ok((StatusCode::CREATED, Json(json!({ "user": user }))))
}

/// Authenticates a user and returns a JWT bearer token.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let user = state
        .users
        .get_by_username(&payload.username)
        .await?
        .ok_or_else(|| AppError::AuthError("User not found".to_string()))?;

    if !verify_password(&payload.password, &user.password)? {
        return Err(AppError::AuthError("Invalid password".to_string()));
    }

    let token = sign_jwt(
        user.id,
        &user.role,
        &state.config.jwt_secret,
        state.config.jwt_expiration,
    )?;

    Ok(Json(json!({ "token": token, "type": "Bearer" })))
}
