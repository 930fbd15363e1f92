//! Core services: credential hashing, token lifecycle, identity management,
//! and the bucketlist/item repositories.
//!
//! Each service owns a clone of the shared SQLite pool and exposes a small,
//! synchronous-per-request API that the HTTP handlers translate to responses.

use serde::Serialize;

pub mod bucketlist_service;
pub mod credentials;
pub mod identity_service;
pub mod item_service;
pub mod token_service;

/// Collapse a display name into its uniqueness key: lowercase with every run
/// of whitespace removed, so "Before 30" and "before  30" collide.
pub(crate) fn normalize_name(name: &str) -> String {
    name.to_lowercase().split_whitespace().collect()
}

/// Return true if a SQLx error indicates a unique constraint violation.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db_err) if db_err.message().to_ascii_lowercase().contains("unique")
    )
}

/// Filter/pagination inputs shared by the bucketlist and item listings.
///
/// Presence of each field drives the precedence ladder in the repositories:
/// query+limit+page, then limit+page, then limit, then query, then nothing.
#[derive(Clone, Debug, Default)]
pub struct ListParams {
    /// Case-insensitive substring match on `name`.
    pub query: Option<String>,
    /// Page size.
    pub limit: Option<u32>,
    /// 1-indexed page number.
    pub page: Option<u32>,
}

/// Result of a listing: either a plain sequence or a full page with
/// navigation metadata, depending on which parameters were supplied.
#[derive(Debug)]
pub enum Listing<T> {
    All(Vec<T>),
    Page(Page<T>),
}

/// One page of results plus navigation metadata.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Total number of pages for the underlying query.
    pub pages: u32,
    pub current_page: u32,
    pub next_page: Option<u32>,
    pub prev_page: Option<u32>,
    pub has_next: bool,
    pub has_prev: bool,
}

impl<T> Page<T> {
    /// Assemble page metadata from a total row count. An out-of-range page
    /// yields an empty `items` with truthful navigation fields.
    pub(crate) fn assemble(items: Vec<T>, total: i64, page: u32, limit: u32) -> Self {
        let pages = if total == 0 {
            0
        } else {
            ((total + i64::from(limit) - 1) / i64::from(limit)) as u32
        };
        let has_next = page < pages;
        let has_prev = page > 1;
        Self {
            items,
            pages,
            current_page: page,
            next_page: has_next.then(|| page + 1),
            prev_page: has_prev.then(|| page - 1),
            has_next,
            has_prev,
        }
    }
}
