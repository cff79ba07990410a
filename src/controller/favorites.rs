use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{
    auth::AuthUser,
    error::Error,
    model::{
        api::{ErrorDto, FavoriteActionDto, StatusDto},
        app::AppState,
        favorites::FavoritesView,
    },
    service::favorites::FavoritesService,
};

pub static FAVORITES_TAG: &str = "favorites";

/// Get the logged in user's favorites grouped by kind
///
/// Served from the cache when possible; a miss answers with the empty view
/// immediately while a background refresh repopulates the cache.
#[utoipa::path(
    get,
    path = "/api/favorites",
    tag = FAVORITES_TAG,
    responses(
        (status = 200, description = "The user's favorites view", body = FavoritesView),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorDto),
    ),
)]
pub async fn get_favorites(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, Error> {
    let favorites_service = FavoritesService::new(&state);

    let view = favorites_service.get_favorites(user.user_id).await;

    Ok((StatusCode::OK, Json(view)))
}

/// Add a favorite for the logged in user
///
/// Idempotent: favoriting an already-favorited item reports
/// `already_favorited` rather than an error.
#[utoipa::path(
    post,
    path = "/api/favorites",
    tag = FAVORITES_TAG,
    request_body = FavoriteActionDto,
    responses(
        (status = 200, description = "Favorite created or already present", body = StatusDto),
        (status = 400, description = "Invalid kind or item ID", body = ErrorDto),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorDto),
        (status = 503, description = "Store unavailable after retries", body = ErrorDto),
    ),
)]
pub async fn add_favorite(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<FavoriteActionDto>,
) -> Result<impl IntoResponse, Error> {
    let favorites_service = FavoritesService::new(&state);

    let outcome = favorites_service
        .add_favorite(user.user_id, &body.kind, &body.id)
        .await?;

    Ok((
        StatusCode::OK,
        Json(StatusDto {
            status: outcome.as_status().to_string(),
        }),
    ))
}

/// Remove a favorite for the logged in user
///
/// Idempotent: removing a favorite that does not exist still reports
/// `removed`.
#[utoipa::path(
    delete,
    path = "/api/favorites",
    tag = FAVORITES_TAG,
    request_body = FavoriteActionDto,
    responses(
        (status = 200, description = "Favorite removed", body = StatusDto),
        (status = 400, description = "Invalid kind or item ID", body = ErrorDto),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorDto),
        (status = 503, description = "Store unavailable after retries", body = ErrorDto),
    ),
)]
pub async fn remove_favorite(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<FavoriteActionDto>,
) -> Result<impl IntoResponse, Error> {
    let favorites_service = FavoritesService::new(&state);

    let outcome = favorites_service
        .remove_favorite(user.user_id, &body.kind, &body.id)
        .await?;

    Ok((
        StatusCode::OK,
        Json(StatusDto {
            status: outcome.as_status().to_string(),
        }),
    ))
}
