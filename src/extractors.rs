//! Request guards applied before handlers run.

use crate::{errors::AppError, services::token_service::TokenError, state::AppState};
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use uuid::Uuid;

/// The authenticated caller, extracted from the `Authorization` header.
///
/// Verification covers signature, expiry, and revocation; every failure mode
/// collapses to the same generic 401 response while the distinguishing kind
/// is logged. Handlers that take an `AuthUser` argument are therefore only
/// invoked for live sessions.
pub struct AuthUser {
    /// Subject embedded in the verified token.
    pub id: Uuid,
    /// The serialized token as presented, kept for revocation on logout.
    pub token: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(AppError::unauthorized)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(AppError::unauthorized)?;

        match state.tokens.verify(token).await {
            Ok(id) => Ok(AuthUser {
                id,
                token: token.to_string(),
            }),
            Err(err) => match err {
                TokenError::Sqlx(_) | TokenError::Signing(_) => Err(err.into()),
                _ => {
                    tracing::debug!("rejected bearer token: {err}");
                    Err(AppError::unauthorized())
                }
            },
        }
    }
}
