//! Core data models for the bucketlist service.
//!
//! These entities represent users, their bucketlists, and the items inside
//! each list. They map cleanly to database tables via `sqlx::FromRow` and
//! serialize naturally as JSON via `serde`.

pub mod bucketlist;
pub mod item;
pub mod user;
