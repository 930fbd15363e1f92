use anyhow::Result;
use axum::Router;
use bucketlist_api::{config::AppConfig, db, routes::routes::routes, state::AppState};
use std::{io::ErrorKind, time::Duration};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // --- Parse config + migrate flag ---
    let (cfg, migrate) = AppConfig::from_env_and_args()?;

    tracing::info!("Starting bucketlist-api with config: {:?}", cfg);

    // --- Initialize SQLite connection ---
    let pool = db::connect(&cfg.database_url).await?;

    // --- Handle migration mode ---
    if migrate {
        db::MIGRATOR.run(&*pool).await?;
        tracing::info!("Database migration complete.");
        return Ok(()); // exit after migration
    }

    // --- Wire services ---
    let state = AppState::new(pool, &cfg);

    // --- Periodic revoked-token pruning ---
    let prune_tokens = state.tokens.clone();
    let prune_period = Duration::from_secs(cfg.token_ttl_secs.max(60) as u64);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(prune_period);
        ticker.tick().await; // first tick fires immediately, skip it
        loop {
            ticker.tick().await;
            match prune_tokens.prune_expired().await {
                Ok(0) => {}
                Ok(pruned) => tracing::info!("pruned {} expired revoked tokens", pruned),
                Err(err) => tracing::warn!("revoked-token pruning failed: {}", err),
            }
        }
    });

    // --- Build router ---
    let app: Router = routes()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    // --- Start server ---
    let addr = cfg.addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err)
            if err.kind() == ErrorKind::PermissionDenied
                && matches!(cfg.host.as_str(), "0.0.0.0" | "::") =>
        {
            let fallback_addr = format!("127.0.0.1:{}", cfg.port);
            tracing::warn!(
                "Permission denied binding to {} ({}). Falling back to {}",
                addr,
                err,
                fallback_addr
            );
            TcpListener::bind(&fallback_addr).await?
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
