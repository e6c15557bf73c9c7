use crate::{
    handlers,
    middleware::{authenticate, require_roles},
    state::AppState,
};
use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use warden_token::RoleSet;

/// Build the full HTTP router.
///
/// - public: `/healthz`, `/api/v1/login`, `/api/v1/refresh`, `/api/v1/logout`
/// - authenticated: `/api/v1/me`, `/api/v1/users/{id}`
/// - authenticated + admin: `/api/v1/admin/stats`
pub fn build_router(state: Arc<AppState>) -> Router {
    let admins: Arc<RoleSet> = Arc::new(["admin"].into_iter().collect());

    let admin = Router::new()
        .route("/api/v1/admin/stats", get(handlers::admin_stats))
        .route_layer(middleware::from_fn_with_state(admins, require_roles));

    let protected = Router::new()
        .route("/api/v1/me", get(handlers::me))
        .route("/api/v1/users/{id}", get(handlers::get_user))
        .merge(admin)
        .route_layer(middleware::from_fn_with_state(state.clone(), authenticate));

    Router::new()
        .route("/healthz", get(handlers::healthz))
        .route("/api/v1/login", post(handlers::login))
        .route("/api/v1/refresh", post(handlers::refresh))
        .route("/api/v1/logout", post(handlers::logout))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
