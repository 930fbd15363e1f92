//! User registration, authentication, and password reset.

use crate::{
    models::user::User,
    services::{
        credentials::{CredentialError, CredentialStore},
        is_unique_violation,
        token_service::{TokenError, TokenService},
    },
};
use sqlx::SqlitePool;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Registration payload. Every field is required and must be non-empty.
#[derive(Clone, Debug)]
pub struct NewUser {
    pub firstname: String,
    pub lastname: String,
    pub username: String,
    pub password: String,
    pub email: String,
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("invalid payload")]
    InvalidPayload,
    #[error("username `{0}` is already taken")]
    DuplicateUser(String),
    /// Unknown username and wrong password collapse to this one variant so
    /// responses cannot be used to enumerate accounts.
    #[error("unknown username or password")]
    InvalidCredentials,
    /// A storage-level uniqueness violation not pre-checked here, e.g. a
    /// duplicate email address.
    #[error("{0}")]
    Constraint(String),
    #[error(transparent)]
    Credential(#[from] CredentialError),
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type IdentityResult<T> = Result<T, IdentityError>;

/// Manages the users table, delegating hashing to [`CredentialStore`] and
/// session issuance to [`TokenService`].
#[derive(Clone)]
pub struct IdentityService {
    db: Arc<SqlitePool>,
    credentials: CredentialStore,
    tokens: TokenService,
}

impl IdentityService {
    pub fn new(db: Arc<SqlitePool>, credentials: CredentialStore, tokens: TokenService) -> Self {
        Self {
            db,
            credentials,
            tokens,
        }
    }

    async fn fetch_by_username(&self, username: &str) -> IdentityResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, firstname, lastname, username, password_hash, email
             FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&*self.db)
        .await?;
        Ok(user)
    }

    /// Create a new account.
    ///
    /// The username is pre-checked with an exact match; email uniqueness is
    /// left to the storage constraint and surfaces as a generic constraint
    /// failure rather than a distinguished duplicate.
    pub async fn register(&self, new_user: NewUser) -> IdentityResult<User> {
        let NewUser {
            firstname,
            lastname,
            username,
            password,
            email,
        } = new_user;

        if [&firstname, &lastname, &username, &password, &email]
            .iter()
            .any(|field| field.trim().is_empty())
        {
            return Err(IdentityError::InvalidPayload);
        }

        if self.fetch_by_username(&username).await?.is_some() {
            return Err(IdentityError::DuplicateUser(username));
        }

        let user = User {
            id: Uuid::new_v4(),
            firstname,
            lastname,
            username,
            password_hash: self.credentials.hash(&password)?,
            email,
        };

        match sqlx::query(
            "INSERT INTO users (id, firstname, lastname, username, password_hash, email)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(user.id)
        .bind(&user.firstname)
        .bind(&user.lastname)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.email)
        .execute(&*self.db)
        .await
        {
            Ok(_) => Ok(user),
            Err(err) if is_unique_violation(&err) => {
                Err(IdentityError::Constraint(err.to_string()))
            }
            Err(err) => Err(IdentityError::Sqlx(err)),
        }
    }

    /// Check credentials and issue a session token.
    pub async fn authenticate(&self, username: &str, password: &str) -> IdentityResult<String> {
        let user = self
            .fetch_by_username(username)
            .await?
            .ok_or(IdentityError::InvalidCredentials)?;
        if !self.credentials.verify(&user.password_hash, password) {
            return Err(IdentityError::InvalidCredentials);
        }
        Ok(self.tokens.issue(user.id)?)
    }

    /// Replace the stored hash after the same credential check as
    /// [`authenticate`](Self::authenticate).
    pub async fn reset_password(
        &self,
        username: &str,
        old_password: &str,
        new_password: &str,
    ) -> IdentityResult<()> {
        let user = self
            .fetch_by_username(username)
            .await?
            .ok_or(IdentityError::InvalidCredentials)?;
        if !self.credentials.verify(&user.password_hash, old_password) {
            return Err(IdentityError::InvalidCredentials);
        }

        let new_hash = self.credentials.hash(new_password)?;
        sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
            .bind(&new_hash)
            .bind(user.id)
            .execute(&*self.db)
            .await?;
        Ok(())
    }
}
