use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::CookieJar;
use tracing::warn;

use super::{cookie::SESSION_COOKIE, services::JwtKeys};
use crate::{error::ApiError, state::AppState, store::UserStore};

/// Authenticated caller of a protected procedure, holding the user ID.
///
/// The access token is read from `Authorization: Bearer <token>` or, failing
/// that, from the session cookie. The user must still exist.
#[derive(Debug)]
pub struct AuthUser(pub i64);

fn bearer_token(parts: &Parts) -> Option<&str> {
    let auth = parts
        .headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?;
    auth.strip_prefix("Bearer ")
        .or_else(|| auth.strip_prefix("bearer "))
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = match bearer_token(parts) {
            Some(t) => t.to_owned(),
            None => CookieJar::from_headers(&parts.headers)
                .get(SESSION_COOKIE)
                .map(|c| c.value().to_owned())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| ApiError::Unauthorized("Missing credentials".into()))?,
        };

        let keys = JwtKeys::from(&state.config.jwt);
        let claims = keys.verify_access(&token).map_err(|e| {
            warn!(error = %e, "invalid or expired token");
            ApiError::Unauthorized("Invalid or expired token".into())
        })?;

        match state.store.get_user_by_id(claims.sub).await? {
            Some(user) => Ok(AuthUser(user.id)),
            None => {
                warn!(user_id = claims.sub, "token for unknown user");
                Err(ApiError::Unauthorized("User not found".into()))
            }
        }
    }
}
