//! Authentication collaborator: bearer-token verification.
//!
//! The core trusts the verified claim and never re-validates identity
//! itself; issuing tokens (login/registration) is outside this crate.

use axum::{extract::FromRequestParts, http::header::AUTHORIZATION, http::request::Parts};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::{error::auth::AuthError, error::Error, model::app::AppState};

/// Claims carried by a Chronicle bearer token.
#[derive(Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i32,
    pub username: String,
    pub exp: usize,
}

/// The authenticated owner extracted from the `Authorization` header.
pub struct AuthUser {
    pub user_id: i32,
    pub username: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(AuthError::MissingToken)?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::MissingToken)?;

        let decoded = decode::<Claims>(
            token,
            &DecodingKey::from_secret(state.config.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|err| {
            tracing::debug!("token verification failed: {err}");
            AuthError::InvalidToken
        })?;

        Ok(AuthUser {
            user_id: decoded.claims.user_id,
            username: decoded.claims.username,
        })
    }
}
