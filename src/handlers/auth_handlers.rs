//! Registration, login, password reset, and logout.

use crate::{
    errors::AppError,
    extractors::AuthUser,
    handlers::required,
    services::{identity_service::NewUser, token_service::TokenError},
    state::AppState,
};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
pub struct RegisterPayload {
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordPayload {
    pub username: Option<String>,
    pub old_password: Option<String>,
    pub new_password: Option<String>,
}

/// `POST /v1/auth/register` — create an account.
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> Result<impl IntoResponse, AppError> {
    let new_user = NewUser {
        firstname: required(payload.firstname.as_deref())?.to_string(),
        lastname: required(payload.lastname.as_deref())?.to_string(),
        username: required(payload.username.as_deref())?.to_string(),
        password: required(payload.password.as_deref())?.to_string(),
        email: required(payload.email.as_deref())?.to_string(),
    };
    let user = state.identity.register(new_user).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// `POST /v1/auth/login` — exchange credentials for a bearer token.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse, AppError> {
    let username = required(payload.username.as_deref())?;
    let password = required(payload.password.as_deref())?;
    let token = state.identity.authenticate(username, password).await?;
    Ok(Json(json!({ "auth_token": token })))
}

/// `POST /v1/auth/reset-password` — replace the password after re-checking
/// the old one.
pub async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordPayload>,
) -> Result<impl IntoResponse, AppError> {
    let username = required(payload.username.as_deref())?;
    let old_password = required(payload.old_password.as_deref())?;
    let new_password = required(payload.new_password.as_deref())?;
    state
        .identity
        .reset_password(username, old_password, new_password)
        .await?;
    Ok(Json(json!({ "message": "Successfully changed password" })))
}

/// `POST /v1/auth/logout` — revoke the presented token.
///
/// The extractor has already verified the token, so a duplicate revocation
/// only happens on a race; it is logged and answered like any other dead
/// token.
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    match state.tokens.revoke(&auth.token).await {
        Ok(()) => Ok(Json(json!({ "message": "Successfully logged out" }))),
        Err(TokenError::DuplicateToken) => {
            tracing::warn!("token for user {} was already revoked", auth.id);
            Err(AppError::unauthorized())
        }
        Err(err) => Err(err.into()),
    }
}
