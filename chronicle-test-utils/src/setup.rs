use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, Database, DatabaseConnection,
    DbBackend, EntityTrait, QueryFilter, Schema,
};
use serde::Serialize;

use crate::{constant::TEST_JWT_SECRET, error::TestError};

/// Claims shape mirrored from the application's bearer tokens.
#[derive(Serialize)]
struct TestClaims {
    user_id: i32,
    username: String,
    exp: usize,
}

/// Shared test environment: an in-memory sqlite database with the
/// application schema, plus helpers for fixtures and signed tokens.
pub struct TestSetup {
    pub db: DatabaseConnection,
}

impl TestSetup {
    /// Connects to a fresh in-memory database without creating any tables.
    pub async fn new() -> Result<Self, TestError> {
        let db = Database::connect("sqlite::memory:").await?;

        Ok(Self { db })
    }

    /// Connects and creates the full application schema from the entities,
    /// including the unique index guarding favorite tuples.
    pub async fn with_tables() -> Result<Self, TestError> {
        let test = Self::new().await?;
        let schema = Schema::new(DbBackend::Sqlite);

        let stmts = vec![
            schema.create_table_from_entity(entity::prelude::ChronicleUser),
            schema.create_table_from_entity(entity::prelude::Favorite),
        ];

        for stmt in stmts {
            test.db.execute(&stmt).await?;
        }

        let unique_favorite = sea_orm::sea_query::Index::create()
            .name("idx_favorite_user_id_kind_item_id")
            .table(entity::favorite::Entity)
            .col(entity::favorite::Column::UserId)
            .col(entity::favorite::Column::Kind)
            .col(entity::favorite::Column::ItemId)
            .unique()
            .to_owned();

        test.db.execute(&unique_favorite).await?;

        Ok(test)
    }

    /// Inserts a user row with generated contact fields.
    pub async fn create_user(
        &self,
        username: &str,
    ) -> Result<entity::chronicle_user::Model, TestError> {
        let user = entity::chronicle_user::ActiveModel {
            username: ActiveValue::Set(username.to_string()),
            email: ActiveValue::Set(format!("{username}@example.com")),
            avatar: ActiveValue::Set(None),
            created_at: ActiveValue::Set(Utc::now().naive_utc()),
            ..Default::default()
        };

        Ok(user.insert(&self.db).await?)
    }

    /// Inserts a favorite row directly, bypassing the service layer.
    pub async fn create_favorite(
        &self,
        user_id: i32,
        kind: &str,
        item_id: &str,
    ) -> Result<entity::favorite::Model, TestError> {
        let favorite = entity::favorite::ActiveModel {
            user_id: ActiveValue::Set(user_id),
            kind: ActiveValue::Set(kind.to_string()),
            item_id: ActiveValue::Set(item_id.to_string()),
            created_at: ActiveValue::Set(Utc::now().naive_utc()),
            ..Default::default()
        };

        Ok(favorite.insert(&self.db).await?)
    }

    /// Returns all favorite rows for a user, for asserting on end state.
    pub async fn favorites_for(
        &self,
        user_id: i32,
    ) -> Result<Vec<entity::favorite::Model>, TestError> {
        Ok(entity::prelude::Favorite::find()
            .filter(entity::favorite::Column::UserId.eq(user_id))
            .all(&self.db)
            .await?)
    }

    /// Signs a bearer token for the given user, valid for one hour.
    pub fn mint_token(&self, user_id: i32, username: &str) -> Result<String, TestError> {
        let claims = TestClaims {
            user_id,
            username: username.to_string(),
            exp: (Utc::now().timestamp() + 3600) as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
        )?)
    }
}
