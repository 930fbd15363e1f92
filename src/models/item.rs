//! Represents a single entry inside a bucketlist.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One item within a bucketlist, addressed by `(bucketlist_id, id)` in all
/// lookups.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
pub struct Item {
    pub id: Uuid,

    pub name: String,

    /// Uniqueness key derived from `name`.
    #[serde(skip)]
    pub normalized_name: String,

    pub description: String,

    /// Foreign key linking to the parent bucketlist.
    pub bucketlist_id: Uuid,
}
