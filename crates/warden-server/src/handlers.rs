use crate::{error::ApiError, state::AppState};
use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use warden_core::UserError;
use warden_token::{Claims, TokenPair};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh: String,
}

pub async fn healthz() -> Json<Value> {
    Json(json!({ "ok": true, "service": "warden-server" }))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<TokenPair>, ApiError> {
    let Ok(Json(input)) = body else {
        return Err(ApiError::InvalidCredentials);
    };
    if input.email.is_empty() || input.password.is_empty() {
        return Err(ApiError::InvalidCredentials);
    }

    let user = state
        .users
        .authenticate(&input.email, &input.password)
        .map_err(|e| match e {
            UserError::NotFound | UserError::BadCredentials => ApiError::Unauthorized,
            UserError::Internal(msg) => ApiError::Internal(msg),
        })?;

    let pair = state.sessions.issue_for(&user)?;
    tracing::info!(sub = user.id, "issued token pair");
    Ok(Json(pair))
}

pub async fn refresh(
    State(state): State<Arc<AppState>>,
    body: Result<Json<RefreshRequest>, JsonRejection>,
) -> Result<Json<TokenPair>, ApiError> {
    let presented = refresh_token_from(body)?;
    let pair = state.sessions.refresh_token_pair(&presented)?;
    Ok(Json(pair))
}

pub async fn logout(
    State(state): State<Arc<AppState>>,
    body: Result<Json<RefreshRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let presented = refresh_token_from(body)?;
    state.sessions.invalidate(&presented);
    Ok(Json(json!({ "status": "logged_out" })))
}

pub async fn me(Extension(claims): Extension<Claims>) -> Json<Value> {
    Json(json!({
        "id": claims.subject(),
        "email": claims.email(),
        "role": claims.role(),
    }))
}

/// Admins may read any user; plain users only themselves.
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(raw_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id: i64 = raw_id.parse().map_err(|_| ApiError::BadId)?;

    if claims.role() == "user" && claims.subject() != id {
        return Err(ApiError::Forbidden);
    }

    let user = state.users.lookup(id).map_err(|e| match e {
        UserError::Internal(msg) => ApiError::Internal(msg),
        _ => ApiError::UserNotFound,
    })?;

    Ok(Json(json!({
        "id": user.id,
        "email": user.email,
        "role": user.role,
    })))
}

pub async fn admin_stats(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "revoked_tokens": state.sessions.registry().len(),
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().timestamp(),
    }))
}

fn refresh_token_from(body: Result<Json<RefreshRequest>, JsonRejection>) -> Result<String, ApiError> {
    match body {
        Ok(Json(input)) if !input.refresh.trim().is_empty() => Ok(input.refresh),
        _ => Err(ApiError::RefreshTokenRequired),
    }
}
