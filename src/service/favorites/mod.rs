//! Favorites reconciliation between the cache and the store.
//!
//! Reads never block on store latency: a cache hit is served directly, and a
//! miss answers with the empty default view while a detached task refreshes
//! the real view through the retry wrapper. The default is cached under a
//! short TTL so concurrent misses in the same window share it instead of
//! each triggering a store read. Refreshes are version-tagged; a completion
//! that lost a race with an invalidation is discarded.
//!
//! Writes go to the store first (through retry), then invalidate the owner's
//! cache keys so the next read repopulates rather than serving stale data.
//! Repeated adds of the same item are absorbed by per-item marker keys,
//! which the invalidation clears by prefix along with the view.

pub mod store;

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{
    cache::TtlCache,
    config::Config,
    error::Error,
    model::{
        app::AppState,
        favorites::{FavoriteKind, FavoriteOutcome, FavoritesView},
    },
    service::{favorites::store::FavoriteStore, retry::RetryContext},
};

#[derive(Clone)]
pub struct FavoritesService {
    db: DatabaseConnection,
    cache: Arc<TtlCache>,
    config: Arc<Config>,
}

impl FavoritesService {
    /// Creates a new instance of [`FavoritesService`]
    pub fn new(state: &AppState) -> Self {
        Self {
            db: state.db.clone(),
            cache: state.cache.clone(),
            config: state.config.clone(),
        }
    }

    /// Serves a user's favorites view without blocking on the store.
    ///
    /// Cache hit: the cached view is returned as-is. Cache miss: the empty
    /// default is written under the placeholder TTL and returned
    /// immediately, and a background refresh is scheduled. Reads never fail;
    /// the worst case is a stale or empty view.
    pub async fn get_favorites(&self, user_id: i32) -> FavoritesView {
        let key = TtlCache::favorites_key(user_id);

        if let Some(cached) = self.cache.get(&key) {
            match serde_json::from_value::<FavoritesView>(cached) {
                Ok(view) => return view,
                // Shape mismatch means the entry is unusable; treat as a miss
                Err(err) => {
                    tracing::warn!(user_id, "discarding malformed cached favorites: {err}");
                    self.cache.delete(&key);
                }
            }
        }

        let default = FavoritesView::default();

        if let Ok(value) = serde_json::to_value(&default) {
            self.cache
                .set_with_ttl(&key, value, self.config.cache.placeholder_ttl);
        }

        // Tagged with the placeholder's version: if a mutation invalidates
        // the entry while the refresh is in flight, the completion is stale
        // and gets dropped.
        let version = self.cache.version(&key);
        self.spawn_refresh(user_id, version);

        default
    }

    /// Adds a favorite, invalidating the owner's cached view on creation.
    ///
    /// Idempotent: adding an existing favorite reports
    /// [`FavoriteOutcome::AlreadyFavorited`] and leaves exactly one row. A
    /// repeated add is remembered under a per-item marker key so it answers
    /// from the cache without another store round trip; markers are cleared
    /// by [`Self::invalidate`] alongside the view.
    pub async fn add_favorite(
        &self,
        user_id: i32,
        kind: &str,
        item_id: &str,
    ) -> Result<FavoriteOutcome, Error> {
        let (kind, item_id) = validate_mutation(kind, item_id)?;

        let marker_key = TtlCache::favorite_key(user_id, kind.as_str(), &item_id);
        if self.cache.has(&marker_key) {
            return Ok(FavoriteOutcome::AlreadyFavorited);
        }

        let retry = RetryContext::new(&self.config.retry);
        let created = retry
            .execute_with_retry(&format!("favorite add for user {user_id}"), || {
                let item_id = item_id.clone();
                async move {
                    let store = FavoriteStore::new(&self.db, self.config.store_timeout);
                    Ok(store.add_favorite(user_id, kind, &item_id).await?)
                }
            })
            .await?;

        if created {
            self.invalidate(user_id);
            Ok(FavoriteOutcome::Created)
        } else {
            // Nothing changed in the store, so the cached view stays valid;
            // remember the hit for the next repeat
            self.cache.set(&marker_key, serde_json::Value::Bool(true));
            Ok(FavoriteOutcome::AlreadyFavorited)
        }
    }

    /// Removes a favorite, invalidating the owner's cache entries.
    ///
    /// Idempotent: removing a favorite that does not exist still reports
    /// [`FavoriteOutcome::Removed`].
    pub async fn remove_favorite(
        &self,
        user_id: i32,
        kind: &str,
        item_id: &str,
    ) -> Result<FavoriteOutcome, Error> {
        let (kind, item_id) = validate_mutation(kind, item_id)?;

        let retry = RetryContext::new(&self.config.retry);
        retry
            .execute_with_retry(&format!("favorite removal for user {user_id}"), || {
                let item_id = item_id.clone();
                async move {
                    let store = FavoriteStore::new(&self.db, self.config.store_timeout);
                    store.remove_favorite(user_id, kind, &item_id).await?;
                    Ok(())
                }
            })
            .await?;

        self.invalidate(user_id);

        Ok(FavoriteOutcome::Removed)
    }

    /// Fetches the real view from the store and applies it to the cache
    /// under the normal TTL, unless the entry moved past `version` in the
    /// meantime.
    ///
    /// Runs detached after the original response was sent, so failures are
    /// returned to the spawning task for logging and never to a caller.
    pub async fn refresh_favorites(&self, user_id: i32, version: u64) -> Result<(), Error> {
        let retry = RetryContext::new(&self.config.retry);

        let view = retry
            .execute_with_retry(&format!("favorites fetch for user {user_id}"), || async move {
                let store = FavoriteStore::new(&self.db, self.config.store_timeout);
                Ok(store.fetch_favorites(user_id).await?)
            })
            .await?;

        let value = serde_json::to_value(&view)
            .map_err(|err| Error::InternalError(format!("favorites view serialization: {err}")))?;

        let key = TtlCache::favorites_key(user_id);
        let applied =
            self.cache
                .set_if_version(&key, value, self.config.cache.favorites_ttl, version);

        if !applied {
            tracing::debug!(user_id, "discarded stale favorites refresh");
        }

        Ok(())
    }

    fn spawn_refresh(&self, user_id: i32, version: u64) {
        let service = self.clone();

        tokio::spawn(async move {
            // No caller is waiting; failures are logged and swallowed
            if let Err(err) = service.refresh_favorites(user_id, version).await {
                tracing::warn!(user_id, "background favorites refresh failed: {err}");
            }
        });
    }

    fn invalidate(&self, user_id: i32) {
        self.cache.delete(&TtlCache::favorites_key(user_id));
        self.cache.delete_by_prefix(&TtlCache::favorite_prefix(user_id));
    }
}

fn validate_mutation(kind: &str, item_id: &str) -> Result<(FavoriteKind, String), Error> {
    let kind: FavoriteKind = kind.parse()?;

    let item_id = item_id.trim();
    if item_id.is_empty() {
        return Err(Error::ValidationError("id must not be empty".to_string()));
    }

    Ok((kind, item_id.to_string()))
}
