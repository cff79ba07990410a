use std::sync::Arc;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use crate::{cache::TtlCache, config::Config, error::Error};

/// Connect to the database and run migrations
pub async fn connect_to_database(config: &Config) -> Result<DatabaseConnection, Error> {
    use migration::{Migrator, MigratorTrait};

    let mut opt = ConnectOptions::new(&config.database_url);
    opt.sqlx_logging(false);

    let db = Database::connect(opt).await?;

    Migrator::up(&db, None).await?;

    Ok(db)
}

/// Build the shared TTL cache from configuration
pub fn build_cache(config: &Config) -> Arc<TtlCache> {
    Arc::new(TtlCache::new(&config.cache))
}

/// Spawn the periodic cache sweep task.
///
/// Redundant with lazy expiry on read; reclaims memory held by expired
/// entries that are never read again.
pub fn spawn_cache_sweeper(cache: Arc<TtlCache>, config: &Config) {
    let interval = config.cache.sweep_interval;

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The first tick fires immediately; skip it so a fresh cache is not
        // swept before anything was written
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let removed = cache.sweep();
            if removed > 0 {
                tracing::debug!(removed, "cache sweep reclaimed expired entries");
            }
        }
    });
}
