//! Bearer token extractor.

use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::{domain::User, ui::state::AppState};

use super::error::ApiError;

const BEARER_PREFIX: &str = "Bearer ";

/// The user behind the request's `Authorization: Bearer <token>` header.
///
/// Rejects with 401 when the header is missing, the token is invalid or
/// expired, or the user no longer exists.
pub struct AuthenticatedUser(pub User);

impl FromRequestParts<Arc<AppState>> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Missing Authorization header"))?;
        let token = header
            .strip_prefix(BEARER_PREFIX)
            .ok_or_else(|| ApiError::unauthorized("Authorization header is not a bearer token"))?;

        let user = state.authenticate_usecase.execute(token.trim()).await?;
        Ok(Self(user))
    }
}
