use std::time::Duration;

use sea_orm::DatabaseConnection;

use crate::{
    cache::TtlCache, data::user::UserRepository, error::Error, model::api::UserDto,
    model::app::AppState,
};

pub struct UserService<'a> {
    db: &'a DatabaseConnection,
    cache: &'a TtlCache,
    user_ttl: Duration,
}

impl<'a> UserService<'a> {
    /// Creates a new instance of [`UserService`]
    pub fn new(state: &'a AppState) -> Self {
        Self {
            db: &state.db,
            cache: &state.cache,
            user_ttl: state.config.cache.user_ttl,
        }
    }

    /// Returns a user's profile, read through the cache.
    ///
    /// Profiles change rarely, so a plain read-through with the user TTL is
    /// enough; there is no background refresh on this path.
    pub async fn get_user(&self, user_id: i32) -> Result<Option<UserDto>, Error> {
        let key = TtlCache::user_key(user_id);

        if let Some(cached) = self.cache.get(&key) {
            if let Ok(user) = serde_json::from_value::<UserDto>(cached) {
                return Ok(Some(user));
            }
            self.cache.delete(&key);
        }

        let user_repository = UserRepository::new(self.db);

        let Some(user) = user_repository.find_by_id(user_id).await? else {
            return Ok(None);
        };

        let dto = UserDto::from(user);

        if let Ok(value) = serde_json::to_value(&dto) {
            self.cache.set_with_ttl(&key, value, self.user_ttl);
        }

        Ok(Some(dto))
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use chronicle_test_utils::{TestError, TestSetup};
    use serde_json::json;

    use super::UserService;
    use crate::{
        cache::TtlCache,
        config::{CacheSettings, Config, RetrySettings},
        model::app::AppState,
    };

    async fn setup() -> Result<(TestSetup, AppState), TestError> {
        let test = TestSetup::with_tables().await?;
        let config = Arc::new(Config {
            database_url: "sqlite::memory:".to_string(),
            jwt_secret: chronicle_test_utils::constant::TEST_JWT_SECRET.to_string(),
            server_address: "127.0.0.1:0".to_string(),
            cache: CacheSettings {
                default_ttl: Duration::from_secs(60),
                favorites_ttl: Duration::from_secs(300),
                placeholder_ttl: Duration::from_secs(10),
                user_ttl: Duration::from_secs(1800),
                max_entries: 100,
                sweep_interval: Duration::from_secs(30),
            },
            retry: RetrySettings {
                max_retries: 2,
                base_delay: Duration::from_millis(10),
            },
            store_timeout: Duration::from_secs(3),
        });
        let cache = Arc::new(TtlCache::new(&config.cache));
        let state = AppState::new(test.db.clone(), cache, config);

        Ok((test, state))
    }

    /// Expect a profile read to populate the cache
    #[tokio::test]
    async fn test_get_user_populates_cache() -> Result<(), TestError> {
        let (test, state) = setup().await?;
        let user = test.create_user("profiled").await?;
        let user_service = UserService::new(&state);

        let dto = user_service.get_user(user.id).await.unwrap();

        assert_eq!(dto.map(|u| u.username), Some("profiled".to_string()));
        assert!(state.cache.has(&TtlCache::user_key(user.id)));

        Ok(())
    }

    /// Expect a cached profile to be served without a store read
    #[tokio::test]
    async fn test_get_user_serves_cached_profile() -> Result<(), TestError> {
        let (_test, state) = setup().await?;
        let user_service = UserService::new(&state);

        // No such row in the store; only the cache can answer
        state.cache.set(
            &TtlCache::user_key(7),
            json!({"id": 7, "username": "ghost", "email": "g@example.com", "avatar": null}),
        );

        let dto = user_service.get_user(7).await.unwrap();

        assert_eq!(dto.map(|u| u.username), Some("ghost".to_string()));

        Ok(())
    }

    /// Expect None for a user that does not exist anywhere
    #[tokio::test]
    async fn test_get_user_missing() -> Result<(), TestError> {
        let (_test, state) = setup().await?;
        let user_service = UserService::new(&state);

        let dto = user_service.get_user(42).await.unwrap();

        assert!(dto.is_none());

        Ok(())
    }
}
