//! Bearer token lifecycle: issue, verify, revoke, prune.
//!
//! Tokens are HS256 JWTs carrying `{sub, iat, exp}` signed with the
//! process-wide secret. A token is valid until it expires or its serialized
//! form lands in the `revoked_tokens` table; neither transition reverses.

use crate::services::is_unique_violation;
use chrono::{Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: Uuid,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token is structurally invalid")]
    Malformed,
    #[error("token has expired")]
    Expired,
    #[error("token has been revoked")]
    Revoked,
    #[error("token is already revoked")]
    DuplicateToken,
    #[error("failed to sign token: {0}")]
    Signing(jsonwebtoken::errors::Error),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type TokenResult<T> = Result<T, TokenError>;

/// Issues and checks session tokens against the shared revocation table.
#[derive(Clone)]
pub struct TokenService {
    db: Arc<SqlitePool>,
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(db: Arc<SqlitePool>, secret: &str, ttl_secs: i64) -> Self {
        Self {
            db,
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::seconds(ttl_secs),
        }
    }

    /// Expiry is checked exactly, with no clock leeway.
    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation
    }

    /// Issue a fresh token for `subject_id`, expiring `ttl` from now.
    pub fn issue(&self, subject_id: Uuid) -> TokenResult<String> {
        let iat = Utc::now();
        let exp = iat + self.ttl;
        let claims = Claims {
            sub: subject_id,
            iat: iat.timestamp(),
            exp: exp.timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(TokenError::Signing)
    }

    /// Decode and check a presented token, returning the embedded subject.
    ///
    /// Signature/structure failures map to `Malformed`, a past `exp` to
    /// `Expired`, and a blacklisted serialized form to `Revoked`.
    pub async fn verify(&self, token: &str) -> TokenResult<Uuid> {
        let data =
            decode::<Claims>(token, &self.decoding, &Self::validation()).map_err(|err| {
                match err.kind() {
                    ErrorKind::ExpiredSignature => TokenError::Expired,
                    _ => TokenError::Malformed,
                }
            })?;

        if self.is_revoked(token).await? {
            return Err(TokenError::Revoked);
        }
        Ok(data.claims.sub)
    }

    async fn is_revoked(&self, token: &str) -> TokenResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM revoked_tokens WHERE token = ?")
            .bind(token)
            .fetch_one(&*self.db)
            .await?;
        Ok(count > 0)
    }

    /// Record a token's serialized form in the revoked set.
    ///
    /// Revoking the same token twice is an observable error, never a silent
    /// success: the unique constraint surfaces as `DuplicateToken`.
    pub async fn revoke(&self, token: &str) -> TokenResult<()> {
        match sqlx::query("INSERT INTO revoked_tokens (id, token) VALUES (?, ?)")
            .bind(Uuid::new_v4())
            .bind(token)
            .execute(&*self.db)
            .await
        {
            Ok(_) => Ok(()),
            Err(err) if is_unique_violation(&err) => Err(TokenError::DuplicateToken),
            Err(err) => Err(TokenError::Sqlx(err)),
        }
    }

    /// Drop revoked rows whose embedded expiry has passed, returning how many
    /// were removed. Rows that no longer decode at all are removed too; they
    /// can never verify again, so keeping them only grows the table.
    pub async fn prune_expired(&self) -> TokenResult<u64> {
        let rows: Vec<(Uuid, String)> =
            sqlx::query_as("SELECT id, token FROM revoked_tokens")
                .fetch_all(&*self.db)
                .await?;

        let mut validation = Self::validation();
        validation.validate_exp = false;
        let now = Utc::now().timestamp();

        let mut pruned = 0u64;
        for (id, token) in rows {
            let dead = match decode::<Claims>(&token, &self.decoding, &validation) {
                Ok(data) => data.claims.exp <= now,
                Err(err) => {
                    debug!("pruning undecodable revoked token: {err}");
                    true
                }
            };
            if dead {
                sqlx::query("DELETE FROM revoked_tokens WHERE id = ?")
                    .bind(id)
                    .execute(&*self.db)
                    .await?;
                pruned += 1;
            }
        }
        Ok(pruned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::tests::test_pool;

    fn service(db: Arc<SqlitePool>, ttl_secs: i64) -> TokenService {
        TokenService::new(db, "test-secret", ttl_secs)
    }

    #[tokio::test]
    async fn issue_then_verify_returns_subject() {
        let svc = service(test_pool().await, 60);
        let subject = Uuid::new_v4();
        let token = svc.issue(subject).unwrap();
        assert_eq!(svc.verify(&token).await.unwrap(), subject);
    }

    #[tokio::test]
    async fn garbage_is_malformed() {
        let svc = service(test_pool().await, 60);
        assert!(matches!(
            svc.verify("not.a.jwt").await,
            Err(TokenError::Malformed)
        ));
    }

    #[tokio::test]
    async fn wrong_secret_is_malformed() {
        let db = test_pool().await;
        let token = service(db.clone(), 60).issue(Uuid::new_v4()).unwrap();
        let other = TokenService::new(db, "different-secret", 60);
        assert!(matches!(
            other.verify(&token).await,
            Err(TokenError::Malformed)
        ));
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let svc = service(test_pool().await, 1);
        let token = svc.issue(Uuid::new_v4()).unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(2100)).await;
        assert!(matches!(
            svc.verify(&token).await,
            Err(TokenError::Expired)
        ));
    }

    #[tokio::test]
    async fn revoked_token_fails_verification() {
        let svc = service(test_pool().await, 60);
        let token = svc.issue(Uuid::new_v4()).unwrap();
        svc.revoke(&token).await.unwrap();
        assert!(matches!(
            svc.verify(&token).await,
            Err(TokenError::Revoked)
        ));
    }

    #[tokio::test]
    async fn second_revoke_is_a_duplicate() {
        let svc = service(test_pool().await, 60);
        let token = svc.issue(Uuid::new_v4()).unwrap();
        svc.revoke(&token).await.unwrap();
        assert!(matches!(
            svc.revoke(&token).await,
            Err(TokenError::DuplicateToken)
        ));
    }

    #[tokio::test]
    async fn prune_removes_only_dead_rows() {
        let db = test_pool().await;
        let long_lived = service(db.clone(), 3600);
        let short_lived = service(db.clone(), -10);

        let live = long_lived.issue(Uuid::new_v4()).unwrap();
        let dead = short_lived.issue(Uuid::new_v4()).unwrap();
        long_lived.revoke(&live).await.unwrap();
        long_lived.revoke(&dead).await.unwrap();
        long_lived.revoke("never-was-a-token").await.unwrap();

        assert_eq!(long_lived.prune_expired().await.unwrap(), 2);

        let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM revoked_tokens")
            .fetch_one(&*db)
            .await
            .unwrap();
        assert_eq!(remaining, 1);
        assert!(matches!(
            long_lived.verify(&live).await,
            Err(TokenError::Revoked)
        ));
    }
}
