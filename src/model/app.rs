use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{cache::TtlCache, config::Config};

/// Shared application state handed to every handler.
///
/// The cache is constructed once at startup and injected here rather than
/// living as a global, so tests can run against isolated instances.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub cache: Arc<TtlCache>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: DatabaseConnection, cache: Arc<TtlCache>, config: Arc<Config>) -> Self {
        Self { db, cache, config }
    }
}
