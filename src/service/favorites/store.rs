//! Store adapter for favorites.
//!
//! Translates favorites operations into repository queries, races every call
//! against a fixed deadline, and classifies raw `DbErr` values into the
//! typed [`StoreError`] taxonomy so retry and response logic upstream never
//! parse error text.

use std::future::Future;
use std::time::Duration;

use sea_orm::{DatabaseConnection, DbErr, SqlErr};

use crate::{
    data::favorite::FavoriteRepository,
    error::store::StoreError,
    model::favorites::{FavoriteKind, FavoritesView},
};

/// Longest item identifier the store accepts, in characters.
const MAX_ITEM_ID_LEN: usize = 64;

pub struct FavoriteStore<'a> {
    db: &'a DatabaseConnection,
    timeout: Duration,
}

impl<'a> FavoriteStore<'a> {
    /// Creates a new instance of [`FavoriteStore`]
    pub fn new(db: &'a DatabaseConnection, timeout: Duration) -> Self {
        Self { db, timeout }
    }

    /// Fetches a user's favorites grouped by kind.
    ///
    /// An empty store state yields the empty view, never an error.
    pub async fn fetch_favorites(&self, user_id: i32) -> Result<FavoritesView, StoreError> {
        let repository = FavoriteRepository::new(self.db);

        let rows = self
            .with_deadline(repository.get_all_by_user_id(user_id))
            .await?;

        Ok(FavoritesView::from_rows(rows))
    }

    /// Adds a favorite if absent. Returns whether a row was created.
    ///
    /// The existence check treats "no rows" as a normal miss. A concurrent
    /// insert of the same tuple can still win the race past the check; the
    /// unique index arbitrates and the lost race is reported as `false`
    /// ("already favorited"), not an error.
    pub async fn add_favorite(
        &self,
        user_id: i32,
        kind: FavoriteKind,
        item_id: &str,
    ) -> Result<bool, StoreError> {
        validate_item_id(item_id)?;
        let repository = FavoriteRepository::new(self.db);

        let existing = self
            .with_deadline(repository.find_by_item(user_id, kind.as_str(), item_id))
            .await?;

        if existing.is_some() {
            return Ok(false);
        }

        match self
            .with_deadline(repository.create(user_id, kind.as_str(), item_id))
            .await
        {
            Ok(_) => Ok(true),
            Err(StoreError::UniqueViolation) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Removes a favorite. Deleting zero rows is not an error.
    pub async fn remove_favorite(
        &self,
        user_id: i32,
        kind: FavoriteKind,
        item_id: &str,
    ) -> Result<(), StoreError> {
        validate_item_id(item_id)?;
        let repository = FavoriteRepository::new(self.db);

        self.with_deadline(repository.delete_by_item(user_id, kind.as_str(), item_id))
            .await?;

        Ok(())
    }

    /// Races a repository call against the configured deadline.
    ///
    /// Exceeding the deadline abandons the call from the caller's
    /// perspective and surfaces as a retryable timeout; the underlying query
    /// may still complete against the store later.
    async fn with_deadline<T, Fut>(&self, operation: Fut) -> Result<T, StoreError>
    where
        Fut: Future<Output = Result<T, DbErr>>,
    {
        match tokio::time::timeout(self.timeout, operation).await {
            Ok(result) => result.map_err(classify_db_err),
            Err(_) => Err(StoreError::Timeout(self.timeout)),
        }
    }
}

/// Classifies a raw database error into the store taxonomy.
fn classify_db_err(err: DbErr) -> StoreError {
    if let Some(sql_err) = err.sql_err() {
        return match sql_err {
            SqlErr::UniqueConstraintViolation(_) => StoreError::UniqueViolation,
            SqlErr::ForeignKeyConstraintViolation(_) => StoreError::ForeignKeyViolation,
            _ => StoreError::Fatal(err.to_string()),
        };
    }

    match err {
        // Failure to reach or establish the connection at all
        DbErr::Conn(conn_err) => StoreError::NotConfigured(conn_err.to_string()),
        // Pool exhaustion or a dropped connection; a later attempt may succeed
        DbErr::ConnectionAcquire(acquire_err) => StoreError::Transient(acquire_err.to_string()),
        other => StoreError::Fatal(other.to_string()),
    }
}

// Identifiers are opaque: timeline datasets carry non-Latin labels (years
// like "公元前221年"), so only length abuse and control or whitespace
// characters are rejected.
fn validate_item_id(item_id: &str) -> Result<(), StoreError> {
    let well_formed = !item_id.is_empty()
        && item_id.chars().count() <= MAX_ITEM_ID_LEN
        && item_id
            .chars()
            .all(|c| !c.is_control() && !c.is_whitespace());

    if well_formed {
        Ok(())
    } else {
        Err(StoreError::MalformedId(item_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chronicle_test_utils::{TestError, TestSetup};

    use super::{validate_item_id, FavoriteStore};
    use crate::{
        error::store::StoreError,
        model::favorites::FavoriteKind,
    };

    const TEST_TIMEOUT: Duration = Duration::from_secs(3);

    /// Expect an empty store to yield the empty view, not an error
    #[tokio::test]
    async fn test_fetch_favorites_empty() -> Result<(), TestError> {
        let test = TestSetup::with_tables().await?;
        let user = test.create_user("fresh").await?;
        let store = FavoriteStore::new(&test.db, TEST_TIMEOUT);

        let view = store.fetch_favorites(user.id).await.unwrap();

        assert!(view.events.is_empty());
        assert!(view.characters.is_empty());
        assert!(view.years.is_empty());

        Ok(())
    }

    /// Expect rows to be grouped into the per-kind arrays
    #[tokio::test]
    async fn test_fetch_favorites_grouped_by_kind() -> Result<(), TestError> {
        let test = TestSetup::with_tables().await?;
        let user = test.create_user("grouped").await?;
        let store = FavoriteStore::new(&test.db, TEST_TIMEOUT);

        store
            .add_favorite(user.id, FavoriteKind::Event, "e1")
            .await
            .unwrap();
        store
            .add_favorite(user.id, FavoriteKind::Character, "c2")
            .await
            .unwrap();
        store
            .add_favorite(user.id, FavoriteKind::Year, "1900")
            .await
            .unwrap();

        let view = store.fetch_favorites(user.id).await.unwrap();

        assert_eq!(view.events, vec!["e1"]);
        assert_eq!(view.characters, vec!["c2"]);
        assert_eq!(view.years, vec!["1900"]);

        Ok(())
    }

    /// Expect a second add of the same tuple to be an idempotent no-op
    #[tokio::test]
    async fn test_add_favorite_idempotent() -> Result<(), TestError> {
        let test = TestSetup::with_tables().await?;
        let user = test.create_user("twice").await?;
        let store = FavoriteStore::new(&test.db, TEST_TIMEOUT);

        let first = store
            .add_favorite(user.id, FavoriteKind::Event, "e1")
            .await
            .unwrap();
        let second = store
            .add_favorite(user.id, FavoriteKind::Event, "e1")
            .await
            .unwrap();

        assert!(first);
        assert!(!second);

        let view = store.fetch_favorites(user.id).await.unwrap();
        assert_eq!(view.events, vec!["e1"]);

        Ok(())
    }

    /// Expect removing a non-existent favorite to succeed as a no-op
    #[tokio::test]
    async fn test_remove_favorite_idempotent() -> Result<(), TestError> {
        let test = TestSetup::with_tables().await?;
        let user = test.create_user("ghost").await?;
        let store = FavoriteStore::new(&test.db, TEST_TIMEOUT);

        let result = store
            .remove_favorite(user.id, FavoriteKind::Year, "1900")
            .await;

        assert!(result.is_ok());

        Ok(())
    }

    /// Expect an operation outliving the deadline to surface as a timeout
    #[tokio::test]
    async fn test_deadline_exceeded_is_timeout() -> Result<(), TestError> {
        let test = TestSetup::with_tables().await?;
        let store = FavoriteStore::new(&test.db, Duration::from_millis(1));

        // A query that never resolves; only the deadline can end it
        let result = store
            .with_deadline(std::future::pending::<Result<(), sea_orm::DbErr>>())
            .await;

        assert!(matches!(result, Err(StoreError::Timeout(_))));

        Ok(())
    }

    /// Expect an add for a user that does not exist to surface as a
    /// foreign-key violation
    #[tokio::test]
    async fn test_add_favorite_unknown_user() -> Result<(), TestError> {
        let test = TestSetup::with_tables().await?;
        let store = FavoriteStore::new(&test.db, TEST_TIMEOUT);

        let result = store.add_favorite(9999, FavoriteKind::Event, "e1").await;

        assert!(matches!(result, Err(StoreError::ForeignKeyViolation)));

        Ok(())
    }

    /// Expect malformed item identifiers to be rejected before any query,
    /// while non-Latin identifiers pass
    #[test]
    fn test_validate_item_id() {
        assert!(validate_item_id("e1").is_ok());
        assert!(validate_item_id("1900").is_ok());
        assert!(validate_item_id("some-item_id.v2").is_ok());
        assert!(validate_item_id("公元前221年").is_ok());

        assert!(validate_item_id("").is_err());
        assert!(validate_item_id("has spaces").is_err());
        assert!(validate_item_id("line\nbreak").is_err());
        assert!(validate_item_id(&"x".repeat(65)).is_err());
    }
}
