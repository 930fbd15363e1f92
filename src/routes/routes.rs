//! Defines routes for the auth and bucketlist APIs.
//!
//! ## Structure
//! - **Auth endpoints** (`/v1/auth`)
//!   - `POST /register` — create an account
//!   - `POST /login` — exchange credentials for a bearer token
//!   - `POST /reset-password` — replace a password
//!   - `POST /logout` — revoke the presented token
//!
//! - **Bucketlist endpoints** (`/v1/bucketlists`, bearer-authenticated)
//!   - `POST   /` and `GET /` — create / list (supports q, limit, page)
//!   - `GET    /{id}`, `PUT /{id}`, `DELETE /{id}`
//!
//! - **Item endpoints** (`/v1/bucketlists/{id}/items`, bearer-authenticated)
//!   - `POST   /` and `GET /` — create / list within one bucketlist
//!   - `PUT    /{item_id}`, `DELETE /{item_id}`

use crate::{
    handlers::{
        auth_handlers::{login, logout, register, reset_password},
        bucketlist_handlers::{
            create_bucketlist, delete_bucketlist, get_bucketlist, list_bucketlists,
            update_bucketlist,
        },
        health_handlers::{healthz, readyz},
        item_handlers::{create_item, delete_item, list_items, update_item},
    },
    state::AppState,
};
use axum::{
    Router,
    routing::{get, post, put},
};

/// Build and return the router for every endpoint.
///
/// The router carries shared state (`AppState`) to all handlers.
pub fn routes() -> Router<AppState> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // auth
        .route("/v1/auth/register", post(register))
        .route("/v1/auth/login", post(login))
        .route("/v1/auth/reset-password", post(reset_password))
        .route("/v1/auth/logout", post(logout))
        // bucketlists
        .route(
            "/v1/bucketlists",
            post(create_bucketlist).get(list_bucketlists),
        )
        .route(
            "/v1/bucketlists/{id}",
            get(get_bucketlist)
                .put(update_bucketlist)
                .delete(delete_bucketlist),
        )
        // items
        .route(
            "/v1/bucketlists/{id}/items",
            post(create_item).get(list_items),
        )
        .route(
            "/v1/bucketlists/{id}/items/{item_id}",
            put(update_item).delete(delete_item),
        )
}
