//! SQLite pool construction and embedded migrations.

use anyhow::Result;
use sqlx::{
    SqlitePool,
    migrate::Migrator,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::{fs, path::Path, str::FromStr, sync::Arc};

/// Migrations embedded at compile time from `migrations/`, shared by the
/// `--migrate` mode and the test suites.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Open the SQLite pool, creating the database file if needed and enabling
/// foreign-key enforcement so list/item cascades actually fire.
pub async fn connect(database_url: &str) -> Result<Arc<SqlitePool>> {
    // SQLite creates a missing file but not a missing directory.
    let db_path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("file:");
    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
            tracing::info!("Created missing directory {:?}", parent);
        }
    }

    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    Ok(Arc::new(pool))
}
