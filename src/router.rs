//! HTTP routing and OpenAPI documentation configuration.
//!
//! All API endpoints are registered here with their utoipa specifications,
//! and Swagger UI serves the interactive documentation at `/api/docs`.

use axum::Router;
use utoipa::OpenApi;
use utoipa_axum::{router::OpenApiRouter, routes};
use utoipa_swagger_ui::SwaggerUi;

use crate::{controller, model::app::AppState};

/// Builds the application's HTTP router with all API endpoints and Swagger
/// UI documentation.
///
/// # Registered Endpoints
/// - `GET /api/favorites` - Get the user's favorites view
/// - `POST /api/favorites` - Add a favorite
/// - `DELETE /api/favorites` - Remove a favorite
/// - `GET /api/user` - Get the user's profile
///
/// # Returns
/// An Axum `Router<AppState>` ready to be served once state is attached.
pub fn routes() -> Router<AppState> {
    #[derive(OpenApi)]
    #[openapi(info(title = "Chronicle", description = "Chronicle API"), tags(
        (name = controller::favorites::FAVORITES_TAG, description = "Favorites API routes"),
        (name = controller::user::USER_TAG, description = "User API routes"),
    ))]
    struct ApiDoc;

    let (routes, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .routes(routes!(
            controller::favorites::get_favorites,
            controller::favorites::add_favorite,
            controller::favorites::remove_favorite
        ))
        .routes(routes!(controller::user::get_user))
        .split_for_parts();

    routes.merge(SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", api))
}
