use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, DeleteResult,
    EntityTrait, QueryFilter,
};

pub struct FavoriteRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> FavoriteRepository<'a> {
    /// Creates a new instance of [`FavoriteRepository`]
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Returns all favorite rows for a user
    pub async fn get_all_by_user_id(
        &self,
        user_id: i32,
    ) -> Result<Vec<entity::favorite::Model>, DbErr> {
        entity::prelude::Favorite::find()
            .filter(entity::favorite::Column::UserId.eq(user_id))
            .all(self.db)
            .await
    }

    /// Finds a favorite by its `(user, kind, item)` tuple
    ///
    /// A `None` result is a normal miss, not a failure; genuine query errors
    /// surface as `DbErr`.
    pub async fn find_by_item(
        &self,
        user_id: i32,
        kind: &str,
        item_id: &str,
    ) -> Result<Option<entity::favorite::Model>, DbErr> {
        entity::prelude::Favorite::find()
            .filter(entity::favorite::Column::UserId.eq(user_id))
            .filter(entity::favorite::Column::Kind.eq(kind))
            .filter(entity::favorite::Column::ItemId.eq(item_id))
            .one(self.db)
            .await
    }

    /// Inserts a new favorite row
    ///
    /// The unique index on `(user_id, kind, item_id)` rejects a duplicate
    /// insert that raced past the existence check.
    pub async fn create(
        &self,
        user_id: i32,
        kind: &str,
        item_id: &str,
    ) -> Result<entity::favorite::Model, DbErr> {
        let favorite = entity::favorite::ActiveModel {
            user_id: ActiveValue::Set(user_id),
            kind: ActiveValue::Set(kind.to_string()),
            item_id: ActiveValue::Set(item_id.to_string()),
            created_at: ActiveValue::Set(Utc::now().naive_utc()),
            ..Default::default()
        };

        favorite.insert(self.db).await
    }

    /// Deletes a favorite by its `(user, kind, item)` tuple
    ///
    /// Returns OK regardless of the favorite existing; to check whether a
    /// row was actually removed inspect [`DeleteResult::rows_affected`].
    pub async fn delete_by_item(
        &self,
        user_id: i32,
        kind: &str,
        item_id: &str,
    ) -> Result<DeleteResult, DbErr> {
        entity::prelude::Favorite::delete_many()
            .filter(entity::favorite::Column::UserId.eq(user_id))
            .filter(entity::favorite::Column::Kind.eq(kind))
            .filter(entity::favorite::Column::ItemId.eq(item_id))
            .exec(self.db)
            .await
    }
}

#[cfg(test)]
mod tests {
    use chronicle_test_utils::TestSetup;

    mod get_all_by_user_id_tests {
        use chronicle_test_utils::{TestError, TestSetup};

        use crate::data::favorite::FavoriteRepository;

        /// Expect an empty vec for a user with no favorites
        #[tokio::test]
        async fn test_get_all_empty() -> Result<(), TestError> {
            let test = TestSetup::with_tables().await?;
            let user = test.create_user("empty").await?;
            let favorite_repository = FavoriteRepository::new(&test.db);

            let rows = favorite_repository.get_all_by_user_id(user.id).await?;

            assert!(rows.is_empty());

            Ok(())
        }

        /// Expect only the requested user's rows to be returned
        #[tokio::test]
        async fn test_get_all_scoped_to_user() -> Result<(), TestError> {
            let test = TestSetup::with_tables().await?;
            let user = test.create_user("owner").await?;
            let other = test.create_user("other").await?;
            let favorite_repository = FavoriteRepository::new(&test.db);

            favorite_repository.create(user.id, "event", "e1").await?;
            favorite_repository.create(user.id, "year", "1900").await?;
            favorite_repository.create(other.id, "event", "e1").await?;

            let rows = favorite_repository.get_all_by_user_id(user.id).await?;

            assert_eq!(rows.len(), 2);
            assert!(rows.iter().all(|row| row.user_id == user.id));

            Ok(())
        }
    }

    mod create_tests {
        use chronicle_test_utils::{TestError, TestSetup};

        use crate::data::favorite::FavoriteRepository;

        /// Expect success when inserting a new favorite
        #[tokio::test]
        async fn test_create_favorite_success() -> Result<(), TestError> {
            let test = TestSetup::with_tables().await?;
            let user = test.create_user("creator").await?;
            let favorite_repository = FavoriteRepository::new(&test.db);

            let favorite = favorite_repository.create(user.id, "event", "e1").await?;

            assert_eq!(favorite.user_id, user.id);
            assert_eq!(favorite.kind, "event");
            assert_eq!(favorite.item_id, "e1");

            Ok(())
        }

        /// Expect the unique index to reject a duplicate tuple
        #[tokio::test]
        async fn test_create_duplicate_rejected() -> Result<(), TestError> {
            let test = TestSetup::with_tables().await?;
            let user = test.create_user("dup").await?;
            let favorite_repository = FavoriteRepository::new(&test.db);

            favorite_repository.create(user.id, "event", "e1").await?;
            let result = favorite_repository.create(user.id, "event", "e1").await;

            assert!(result.is_err());
            let err = result.unwrap_err();
            assert!(matches!(
                err.sql_err(),
                Some(sea_orm::SqlErr::UniqueConstraintViolation(_))
            ));

            Ok(())
        }
    }

    mod delete_by_item_tests {
        use chronicle_test_utils::{TestError, TestSetup};

        use crate::data::favorite::FavoriteRepository;

        /// Expect success when deleting an existing favorite
        #[tokio::test]
        async fn test_delete_favorite_success() -> Result<(), TestError> {
            let test = TestSetup::with_tables().await?;
            let user = test.create_user("remover").await?;
            let favorite_repository = FavoriteRepository::new(&test.db);

            favorite_repository.create(user.id, "character", "c7").await?;

            let result = favorite_repository
                .delete_by_item(user.id, "character", "c7")
                .await?;

            assert_eq!(result.rows_affected, 1);

            let remaining = favorite_repository.get_all_by_user_id(user.id).await?;
            assert!(remaining.is_empty());

            Ok(())
        }

        /// Expect OK with zero rows affected when the favorite does not exist
        #[tokio::test]
        async fn test_delete_missing_favorite_is_noop() -> Result<(), TestError> {
            let test = TestSetup::with_tables().await?;
            let user = test.create_user("noop").await?;
            let favorite_repository = FavoriteRepository::new(&test.db);

            let result = favorite_repository
                .delete_by_item(user.id, "event", "missing")
                .await?;

            assert_eq!(result.rows_affected, 0);

            Ok(())
        }
    }

    mod find_by_item_tests {
        use super::TestSetup;
        use chronicle_test_utils::TestError;

        use crate::data::favorite::FavoriteRepository;

        /// Expect a miss to come back as None, not an error
        #[tokio::test]
        async fn test_find_missing_is_none() -> Result<(), TestError> {
            let test = TestSetup::with_tables().await?;
            let user = test.create_user("finder").await?;
            let favorite_repository = FavoriteRepository::new(&test.db);

            let found = favorite_repository
                .find_by_item(user.id, "year", "1900")
                .await?;

            assert!(found.is_none());

            Ok(())
        }
    }
}
