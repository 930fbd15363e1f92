//! Password hashing and verification.
//!
//! One-way salted Argon2id hashes in PHC string format. Verification goes
//! through the algorithm's own routine, which compares in constant time.

use argon2::{
    Argon2, Params,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("failed to hash password: {0}")]
    Hash(argon2::password_hash::Error),
}

/// Hashes and verifies passwords with a fixed set of Argon2 parameters.
///
/// The work factor is chosen at construction time; `default()` uses the
/// argon2 crate's recommended parameters.
#[derive(Clone, Default)]
pub struct CredentialStore {
    argon: Argon2<'static>,
}

impl CredentialStore {
    /// Build a store with explicit Argon2 parameters. Lighter parameters are
    /// useful where hashing latency matters more than attack resistance.
    pub fn with_params(params: Params) -> Self {
        Self {
            argon: Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params),
        }
    }

    /// Hash a password with a freshly generated salt.
    pub fn hash(&self, password: &str) -> Result<String, CredentialError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(CredentialError::Hash)
    }

    /// Check a password against a stored PHC hash. An unparseable hash
    /// verifies as false rather than erroring.
    pub fn verify(&self, hash: &str, password: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(p) => p,
            Err(_) => return false,
        };
        self.argon
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }
}
