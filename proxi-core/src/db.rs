use anyhow::{anyhow, Context, Result};
use diesel_async::pooled_connection::deadpool::{Object, Pool};
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::{AsyncPgConnection, SimpleAsyncConnection};
use std::sync::Arc;
use tokio::time::Duration;
use tracing;

use crate::config::DatabaseConfig;

pub type DbPool = Pool<AsyncPgConnection>;
pub type DbConnection = Object<AsyncPgConnection>;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// Idempotent bootstrap for the three tables. Foreign keys tie notifications
/// and positions to an existing user.
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id UUID PRIMARY KEY,
    name VARCHAR(100) NOT NULL,
    email VARCHAR(100) UNIQUE NOT NULL
);

CREATE TABLE IF NOT EXISTS notifications (
    id UUID PRIMARY KEY,
    message TEXT NOT NULL,
    notif_song_id VARCHAR(100) NOT NULL DEFAULT '',
    created_at TIMESTAMPTZ DEFAULT NOW(),
    is_view BOOLEAN NOT NULL DEFAULT FALSE,
    receiver_id UUID NOT NULL REFERENCES users(id),
    avatar VARCHAR(255)
);

CREATE TABLE IF NOT EXISTS pro_positions (
    id UUID PRIMARY KEY,
    pro_id UUID NOT NULL REFERENCES users(id),
    latitude DOUBLE PRECISION NOT NULL,
    longitude DOUBLE PRECISION NOT NULL,
    timestamp TIMESTAMPTZ DEFAULT NOW()
);
"#;

/// Builds the pool and checks out one connection to prove the database is
/// reachable. A single attempt is made.
pub async fn create_pool(config: &DatabaseConfig) -> Result<Arc<DbPool>> {
    tracing::info!("Setting up database connection pool");
    tracing::info!("Database URL: {}", mask_database_url(&config.url));

    let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(&config.url);

    let pool = Pool::builder(manager)
        .max_size(config.max_connections as usize)
        .build()
        .map_err(|e| anyhow!("Failed to create connection pool: {}", e))?;

    match tokio::time::timeout(CONNECT_TIMEOUT, pool.get()).await {
        Ok(Ok(_conn)) => {
            tracing::info!("Database connection established");
            Ok(Arc::new(pool))
        }
        Ok(Err(e)) => Err(anyhow!("Database connection failed: {}", e)),
        Err(_) => Err(anyhow!(
            "Database connection timed out after {:?}",
            CONNECT_TIMEOUT
        )),
    }
}

pub async fn init_schema(pool: &DbPool) -> Result<()> {
    let mut conn = pool
        .get()
        .await
        .map_err(|e| anyhow!("Failed to get connection for schema setup: {}", e))?;

    conn.batch_execute(SCHEMA_SQL)
        .await
        .context("Failed to create tables")?;

    tracing::info!("Database schema initialized");
    Ok(())
}

pub fn mask_database_url(url: &str) -> String {
    if let Some(at_pos) = url.rfind('@') {
        let (before_at, after_at) = url.split_at(at_pos);
        let scheme_end = before_at.find("://").map(|p| p + 3).unwrap_or(0);
        if let Some(colon_pos) = before_at[scheme_end..].find(':') {
            let (protocol_user, _password) = before_at.split_at(scheme_end + colon_pos);
            format!("{}:****{}", protocol_user, after_at)
        } else {
            url.to_string()
        }
    } else {
        url.to_string()
    }
}
