//! Shared application state: the database pool and every service, wired
//! once at startup and cloned into handlers by the router.

use crate::{
    config::AppConfig,
    services::{
        bucketlist_service::BucketlistService, credentials::CredentialStore,
        identity_service::IdentityService, item_service::ItemService, token_service::TokenService,
    },
};
use sqlx::SqlitePool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<SqlitePool>,
    pub tokens: TokenService,
    pub identity: IdentityService,
    pub bucketlists: BucketlistService,
    pub items: ItemService,
}

impl AppState {
    pub fn new(db: Arc<SqlitePool>, cfg: &AppConfig) -> Self {
        let credentials = CredentialStore::default();
        let tokens = TokenService::new(db.clone(), &cfg.secret, cfg.token_ttl_secs);
        let identity = IdentityService::new(db.clone(), credentials, tokens.clone());
        let bucketlists = BucketlistService::new(db.clone());
        let items = ItemService::new(db.clone());
        Self {
            db,
            tokens,
            identity,
            bucketlists,
            items,
        }
    }
}
