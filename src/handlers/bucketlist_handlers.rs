//! HTTP handlers for bucketlist operations.

use crate::{
    errors::AppError,
    extractors::AuthUser,
    handlers::required,
    services::{ListParams, Listing},
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

/// Body for create and update: both fields required.
#[derive(Debug, Deserialize)]
pub struct BucketlistPayload {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Query params accepted by the listings.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub q: Option<String>,
    pub limit: Option<u32>,
    pub page: Option<u32>,
}

impl ListQuery {
    /// An empty `q` counts as absent in the precedence ladder.
    pub(crate) fn into_params(self) -> ListParams {
        ListParams {
            query: self.q.filter(|q| !q.is_empty()),
            limit: self.limit,
            page: self.page,
        }
    }
}

/// `POST /v1/bucketlists` — create a bucketlist for the caller.
pub async fn create_bucketlist(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<BucketlistPayload>,
) -> Result<impl IntoResponse, AppError> {
    let name = required(payload.name.as_deref())?;
    let description = required(payload.description.as_deref())?;
    let bucketlist = state.bucketlists.create(auth.id, name, description).await?;
    Ok((StatusCode::CREATED, Json(bucketlist)))
}

/// `GET /v1/bucketlists` — list the caller's bucketlists, optionally
/// filtered and paginated via `q`, `limit`, and `page`.
pub async fn list_bucketlists(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListQuery>,
) -> Result<Response, AppError> {
    let listing = state.bucketlists.list(auth.id, query.into_params()).await?;
    Ok(match listing {
        Listing::All(rows) => Json(rows).into_response(),
        Listing::Page(page) => Json(page).into_response(),
    })
}

/// `GET /v1/bucketlists/{id}` — fetch one of the caller's bucketlists.
pub async fn get_bucketlist(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let bucketlist = state.bucketlists.get(auth.id, id).await?;
    Ok(Json(bucketlist))
}

/// `PUT /v1/bucketlists/{id}` — rename and/or redescribe a bucketlist.
pub async fn update_bucketlist(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<BucketlistPayload>,
) -> Result<impl IntoResponse, AppError> {
    let name = required(payload.name.as_deref())?;
    let description = required(payload.description.as_deref())?;
    let bucketlist = state
        .bucketlists
        .update(auth.id, id, name, description)
        .await?;
    Ok(Json(bucketlist))
}

/// `DELETE /v1/bucketlists/{id}` — remove a bucketlist and its items.
pub async fn delete_bucketlist(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    state.bucketlists.delete(auth.id, id).await?;
    Ok(Json(json!({ "deleted": id })))
}
