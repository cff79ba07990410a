use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{
    auth::AuthUser,
    error::{auth::AuthError, Error},
    model::{
        api::{ErrorDto, UserDto},
        app::AppState,
    },
    service::user::UserService,
};

pub static USER_TAG: &str = "user";

/// Get the logged in user's profile
#[utoipa::path(
    get,
    path = "/api/user",
    tag = USER_TAG,
    responses(
        (status = 200, description = "The user's profile", body = UserDto),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorDto),
        (status = 404, description = "User not found", body = ErrorDto),
    ),
)]
pub async fn get_user(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, Error> {
    let user_service = UserService::new(&state);

    let Some(profile) = user_service.get_user(user.user_id).await? else {
        return Err(AuthError::UserNotInDatabase(user.user_id).into());
    };

    Ok((StatusCode::OK, Json(profile)))
}
