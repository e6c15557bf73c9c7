use crate::{error::ApiError, state::AppState};
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use warden_token::{Claims, RoleSet, authorize};

/// Axum middleware running the authentication gate once per request.
///
/// On success the verified [`Claims`] are stored in the request extensions for
/// downstream handlers; on failure the request ends with 401.
pub async fn authenticate(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .unwrap_or_default();

    let claims = state.sessions.authenticate_bearer(header)?;
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Axum middleware admitting only the roles in `allowed`. Must run after
/// [`authenticate`].
pub async fn require_roles(
    State(allowed): State<Arc<RoleSet>>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = req
        .extensions()
        .get::<Claims>()
        .ok_or_else(|| ApiError::Internal("role check without authenticated claims".to_string()))?;

    let decision = authorize(claims, &allowed);
    if !decision.is_permit() {
        tracing::debug!(sub = claims.subject(), role = claims.role(), "role not permitted");
    }
    decision.into_result()?;

    Ok(next.run(req).await)
}
