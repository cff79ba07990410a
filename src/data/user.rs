use sea_orm::{DatabaseConnection, DbErr, EntityTrait};

pub struct UserRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> UserRepository<'a> {
    /// Creates a new instance of [`UserRepository`]
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a user by ID
    pub async fn find_by_id(
        &self,
        user_id: i32,
    ) -> Result<Option<entity::chronicle_user::Model>, DbErr> {
        entity::prelude::ChronicleUser::find_by_id(user_id)
            .one(self.db)
            .await
    }
}
