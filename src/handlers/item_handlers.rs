//! HTTP handlers for item operations, scoped under a parent bucketlist.

use crate::{
    errors::AppError,
    extractors::AuthUser,
    handlers::{bucketlist_handlers::ListQuery, required},
    models::{bucketlist::Bucketlist, item::Item},
    services::{Listing, Page},
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

/// Body for create and update: both fields required.
#[derive(Debug, Deserialize)]
pub struct ItemPayload {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Paginated item listings embed the parent bucketlist next to the page.
#[derive(Debug, Serialize)]
struct ItemPageResponse {
    #[serde(flatten)]
    page: Page<Item>,
    bucketlist: Bucketlist,
}

/// `POST /v1/bucketlists/{id}/items` — add an item to an owned bucketlist.
pub async fn create_item(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(bucketlist_id): Path<Uuid>,
    Json(payload): Json<ItemPayload>,
) -> Result<impl IntoResponse, AppError> {
    let name = required(payload.name.as_deref())?;
    let description = required(payload.description.as_deref())?;
    let item = state
        .items
        .create(auth.id, bucketlist_id, name, description)
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// `GET /v1/bucketlists/{id}/items` — list a bucketlist's items with the
/// same `q`/`limit`/`page` semantics as the bucketlist listing.
pub async fn list_items(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(bucketlist_id): Path<Uuid>,
    Query(query): Query<ListQuery>,
) -> Result<Response, AppError> {
    let (bucketlist, listing) = state
        .items
        .list(auth.id, bucketlist_id, query.into_params())
        .await?;
    Ok(match listing {
        Listing::All(rows) => Json(rows).into_response(),
        Listing::Page(page) => Json(ItemPageResponse { page, bucketlist }).into_response(),
    })
}

/// `PUT /v1/bucketlists/{id}/items/{item_id}` — rename and/or redescribe an
/// item.
pub async fn update_item(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((bucketlist_id, item_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<ItemPayload>,
) -> Result<impl IntoResponse, AppError> {
    let name = required(payload.name.as_deref())?;
    let description = required(payload.description.as_deref())?;
    let item = state
        .items
        .update(auth.id, bucketlist_id, item_id, name, description)
        .await?;
    Ok(Json(item))
}

/// `DELETE /v1/bucketlists/{id}/items/{item_id}` — remove an item.
pub async fn delete_item(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((bucketlist_id, item_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    state.items.delete(auth.id, bucketlist_id, item_id).await?;
    Ok(Json(json!({ "deleted": item_id })))
}
