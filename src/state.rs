use std::sync::Arc;

use sqlx::SqlitePool;

use crate::{config::Config, database};

pub struct AppState {
    pub config: Config,
    pub pool: SqlitePool,
}

impl AppState {
    /// Builds the process-wide state: config, pool, schema, seed catalog.
    ///
    /// Startup is the only place allowed to abort the process; once serving,
    /// failures stay inside the request envelope.
    pub async fn new() -> Arc<Self> {
        let config = Config::load();

        let pool = database::connect(&config.database_url)
            .await
            .expect("Database misconfigured!");

        database::init_schema(&pool)
            .await
            .expect("Schema initialization failed!");

        database::seed_menu(&pool)
            .await
            .expect("Catalog seeding failed!");

        Arc::new(Self { config, pool })
    }
}
