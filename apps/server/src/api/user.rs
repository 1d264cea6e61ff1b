use axum::{extract::FromRequestParts, http::request::Parts};
use simvest_core::trading::TradeError;

use crate::error::ApiError;

/// Header carrying the signed-in user's id, set by the auth gateway.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The caller's user id. Missing or blank headers are `NotAuthenticated`.
pub struct CurrentUser(pub String);

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| CurrentUser(v.to_string()))
            .ok_or_else(|| TradeError::NotAuthenticated.into())
    }
}
