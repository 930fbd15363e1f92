//! Represents a bucketlist — a named, owned collection of items.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A named collection of items belonging to a single user.
///
/// The `normalized_name` column (lowercase, whitespace stripped) carries the
/// uniqueness constraint and never appears in JSON.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
pub struct Bucketlist {
    /// Unique identifier for this bucketlist.
    pub id: Uuid,

    /// Display name as the user typed it.
    pub name: String,

    /// Uniqueness key derived from `name`.
    #[serde(skip)]
    pub normalized_name: String,

    pub description: String,

    /// ID of the owning user.
    pub owner: Uuid,

    /// When this bucketlist was created.
    pub date_created: DateTime<Utc>,

    /// Stamped on every successful update, absent until then.
    pub date_modified: Option<DateTime<Utc>>,
}
