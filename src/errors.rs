use crate::services::{
    bucketlist_service::BucketlistError, identity_service::IdentityError, item_service::ItemError,
    token_service::TokenError,
};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

/// A lightweight wrapper for general errors that keeps the message local.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    /// Create a new AppError with a specific status and message.
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
        }
    }

    /// Shortcut for a 500 Internal Server Error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }

    /// Shortcut for 404 Not Found
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, msg)
    }

    /// The one generic 401 body every authentication failure collapses to.
    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Invalid token")
    }

    /// 400 for a missing or empty required field.
    pub fn invalid_payload() -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Invalid payload")
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.message,
            "status": self.status.as_u16()
        }));

        (self.status, body).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::internal(err.to_string())
    }
}

/// Unexpected failures get logged with detail and answered generically.
fn internal(err: impl fmt::Display) -> AppError {
    tracing::error!("internal error: {err}");
    AppError::internal("internal error")
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Sqlx(err) => internal(err),
            TokenError::Signing(err) => internal(err),
            // Malformed / Expired / Revoked / DuplicateToken all collapse to
            // the generic 401; callers log the distinguishing kind.
            _ => AppError::unauthorized(),
        }
    }
}

impl From<IdentityError> for AppError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::InvalidPayload => AppError::invalid_payload(),
            IdentityError::DuplicateUser(_) => AppError::new(StatusCode::CONFLICT, err.to_string()),
            IdentityError::InvalidCredentials => {
                AppError::new(StatusCode::UNAUTHORIZED, err.to_string())
            }
            IdentityError::Constraint(msg) => AppError::new(StatusCode::BAD_REQUEST, msg),
            IdentityError::Token(err) => err.into(),
            IdentityError::Credential(err) => internal(err),
            IdentityError::Sqlx(err) => internal(err),
        }
    }
}

impl From<BucketlistError> for AppError {
    fn from(err: BucketlistError) -> Self {
        match err {
            BucketlistError::NotFound => AppError::not_found("Bucketlist not found"),
            BucketlistError::DuplicateName(_) => {
                AppError::new(StatusCode::CONFLICT, err.to_string())
            }
            BucketlistError::Constraint(msg) => AppError::new(StatusCode::BAD_REQUEST, msg),
            BucketlistError::Sqlx(err) => internal(err),
        }
    }
}

impl From<ItemError> for AppError {
    fn from(err: ItemError) -> Self {
        match err {
            ItemError::BucketlistNotFound => AppError::not_found("Bucketlist not found"),
            ItemError::ItemNotFound => AppError::not_found("Item not found"),
            ItemError::DuplicateItem(_) => AppError::new(StatusCode::CONFLICT, err.to_string()),
            ItemError::Constraint(msg) => AppError::new(StatusCode::BAD_REQUEST, msg),
            ItemError::Sqlx(err) => internal(err),
        }
    }
}
