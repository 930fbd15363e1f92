//! Represents a registered user — the owner of bucketlists.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A registered account in the system.
///
/// Users authenticate with username + password and own zero or more
/// bucketlists. Username and email are globally unique.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
pub struct User {
    /// Unique identifier for this user (UUID for internal DB use).
    pub id: Uuid,

    pub firstname: String,

    pub lastname: String,

    /// Globally unique login name.
    pub username: String,

    /// Argon2 PHC-format hash of the password. Never serialized.
    #[serde(skip)]
    pub password_hash: String,

    /// Globally unique email address.
    pub email: String,
}
