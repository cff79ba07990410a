use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The response when an error occurs with an API request
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorDto {
    /// The error message
    pub error: String,
}

/// The outcome of a favorites mutation
#[derive(Serialize, Deserialize, ToSchema)]
pub struct StatusDto {
    /// One of `created`, `already_favorited`, or `removed`
    pub status: String,
}

/// Request body for adding or removing a favorite
#[derive(Serialize, Deserialize, ToSchema)]
pub struct FavoriteActionDto {
    /// One of `event`, `character`, or `year`
    pub kind: String,
    /// Identifier of the bookmarked item
    pub id: String,
}

/// Profile of the authenticated user
#[derive(Serialize, Deserialize, Clone, ToSchema)]
pub struct UserDto {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub avatar: Option<String>,
}

impl From<entity::chronicle_user::Model> for UserDto {
    fn from(user: entity::chronicle_user::Model) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            avatar: user.avatar,
        }
    }
}
