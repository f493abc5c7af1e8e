use std::sync::Arc;
use crate::config::Config;
use crate::db::{create_pool, init_schema, DbPool};
use crate::service::{SharedOperations, StoreOperations};
use crate::store::PgStore;

#[derive(Clone)]
pub struct ProxiContext {
    pub config: Arc<Config>,
    pub db_pool: Arc<DbPool>,
}

impl ProxiContext {
    /// Connects to the database and makes sure the tables exist.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let db_pool = create_pool(&config.database).await?;
        init_schema(&db_pool).await?;

        Ok(ProxiContext {
            config: Arc::new(config),
            db_pool,
        })
    }

    pub fn operations(&self) -> SharedOperations {
        Arc::new(StoreOperations::new(PgStore::new(self.db_pool.clone())))
    }
}
