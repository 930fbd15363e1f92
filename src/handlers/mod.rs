//! HTTP handlers, grouped by resource. Each handler translates a payload
//! into a service call and renders the result; authentication happens in the
//! [`AuthUser`](crate::extractors::AuthUser) extractor before any of them run.

use crate::errors::AppError;

pub mod auth_handlers;
pub mod bucketlist_handlers;
pub mod health_handlers;
pub mod item_handlers;

/// Guard for a required payload field: present and not blank, or the request
/// fails with the generic invalid-payload 400.
pub(crate) fn required(field: Option<&str>) -> Result<&str, AppError> {
    match field {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(AppError::invalid_payload()),
    }
}
