//! HTTP error responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use warden_token::{Rejection, SigningError};

/// Errors returned by handlers and middleware.
///
/// Every token verification failure becomes [`ApiError::Unauthorized`]; the
/// detailed reason is logged where it happens and never sent to the client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Login body missing or incomplete.
    #[error("invalid credentials payload")]
    InvalidCredentials,

    /// Refresh/logout body without a refresh token.
    #[error("refresh token required")]
    RefreshTokenRequired,

    /// Path id is not an integer.
    #[error("bad user id")]
    BadId,

    #[error("unauthorized")]
    Unauthorized,

    /// Refresh token was already rotated or logged out.
    #[error("refresh token revoked")]
    TokenRevoked,

    #[error("forbidden")]
    Forbidden,

    #[error("user not found")]
    UserNotFound,

    /// A token could not be signed.
    #[error("token error: {0}")]
    Token(#[from] SigningError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Stable error code written to the response body.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidCredentials => "invalid_credentials",
            ApiError::RefreshTokenRequired => "refresh_token_required",
            ApiError::BadId => "bad_id",
            ApiError::Unauthorized => "unauthorized",
            ApiError::TokenRevoked => "token_revoked",
            ApiError::Forbidden => "forbidden",
            ApiError::UserNotFound => "user_not_found",
            ApiError::Token(_) => "token_error",
            ApiError::Internal(_) => "internal",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidCredentials | ApiError::RefreshTokenRequired | ApiError::BadId => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Unauthorized | ApiError::TokenRevoked => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::UserNotFound => StatusCode::NOT_FOUND,
            ApiError::Token(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<Rejection> for ApiError {
    fn from(rejection: Rejection) -> Self {
        match rejection {
            Rejection::Unauthenticated(_) => ApiError::Unauthorized,
            Rejection::Revoked => ApiError::TokenRevoked,
            Rejection::Forbidden => ApiError::Forbidden,
            Rejection::Internal(e) => ApiError::Token(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status().is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (self.status(), Json(json!({ "error": self.code() }))).into_response()
    }
}
