//! `/api/auth` route handlers: register and login.

use axum::extract::State;
use axum::Json;
use shared::{LoginRequest, LoginResponse, MsgResponse, RegisterRequest};

use crate::auth::password;
use crate::error::ApiError;
use crate::store::User;
use crate::AppState;

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<MsgResponse>, ApiError> {
    let username = req.username.trim();
    if username.is_empty() || req.password.trim().is_empty() {
        return Err(ApiError::Validation("Username and password are required".into()));
    }
    let hash = password::hash_password(&req.password)?;
    let user = User::new(username.to_string(), hash);
    state.users.insert(&user).await?;
    tracing::info!(username, "registered new user");
    Ok(Json(MsgResponse {
        msg: "Registered successfully".into(),
    }))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user = state
        .users
        .find_by_username(req.username.trim())
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid credentials".into()))?;

    if !password::verify_password(&req.password, &user.password_hash) {
        return Err(ApiError::Unauthorized("Invalid credentials".into()));
    }

    let token = state.jwt.issue(user.id, &user.username, user.role)?;
    tracing::info!(username = %user.username, "login");
    Ok(Json(LoginResponse {
        token,
        username: user.username,
        role: user.role,
    }))
}
