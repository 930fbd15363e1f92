use anyhow::{Context, Result};
use clap::Parser;
use std::{env, fmt};

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Symmetric signing secret for session tokens.
    pub secret: String,
    /// Session lifetime in seconds.
    pub token_ttl_secs: i64,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "Bucketlist REST API")]
pub struct Args {
    /// Host to bind to (overrides BUCKETLIST_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides BUCKETLIST_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Database URL (overrides BUCKETLIST_DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Token signing secret (overrides BUCKETLIST_SECRET)
    #[arg(long)]
    pub secret: Option<String>,

    /// Session TTL in seconds (overrides BUCKETLIST_TOKEN_TTL)
    #[arg(long)]
    pub token_ttl_secs: Option<i64>,

    /// Run migrations and exit
    #[arg(long)]
    pub migrate: bool,
}

const DEV_SECRET: &str = "insecure-dev-secret";

// Keeps the signing secret out of startup logs.
impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database_url", &self.database_url)
            .field("secret", &"<redacted>")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .finish()
    }
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and migrate flag.
    pub fn from_env_and_args() -> Result<(Self, bool)> {
        // Parse CLI once
        let args = Args::parse();

        // --- Environment fallback ---
        let env_host = env::var("BUCKETLIST_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = match env::var("BUCKETLIST_PORT") {
            Ok(value) => value
                .parse::<u16>()
                .with_context(|| format!("parsing BUCKETLIST_PORT value `{}`", value))?,
            Err(env::VarError::NotPresent) => 3000,
            Err(err) => return Err(err).context("reading BUCKETLIST_PORT"),
        };
        let env_db = env::var("BUCKETLIST_DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://./data/bucketlist.db".into());
        let env_secret = env::var("BUCKETLIST_SECRET").unwrap_or_else(|_| DEV_SECRET.into());
        let env_ttl = match env::var("BUCKETLIST_TOKEN_TTL") {
            Ok(value) => value
                .parse::<i64>()
                .with_context(|| format!("parsing BUCKETLIST_TOKEN_TTL value `{}`", value))?,
            Err(env::VarError::NotPresent) => 3600,
            Err(err) => return Err(err).context("reading BUCKETLIST_TOKEN_TTL"),
        };

        // --- Merge ---
        let cfg = Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            database_url: args.database_url.unwrap_or(env_db),
            secret: args.secret.unwrap_or(env_secret),
            token_ttl_secs: args.token_ttl_secs.unwrap_or(env_ttl),
        };

        if cfg.secret == DEV_SECRET {
            tracing::warn!("using the built-in development signing secret; set BUCKETLIST_SECRET");
        }

        Ok((cfg, args.migrate))
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
