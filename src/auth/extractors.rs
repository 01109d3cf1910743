use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::warn;

use super::{claims::Claims, cookie::SESSION_COOKIE, jwt::JwtKeys};
use crate::error::ApiError;

/// Verified claims of the session cookie.
///
/// Rejects with `Unauthenticated` when the cookie is absent and with the
/// token error when it fails verification.
pub struct SessionClaims(pub Claims);

#[async_trait]
impl<S> FromRequestParts<S> for SessionClaims
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar
            .get(SESSION_COOKIE)
            .map(|c| c.value().to_owned())
            .filter(|v| !v.is_empty())
            .ok_or(ApiError::Unauthenticated)?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify(&token).map_err(|e| {
            warn!(error = %e, "session token rejected");
            ApiError::from(e)
        })?;

        Ok(SessionClaims(claims))
    }
}
