use std::time::Duration;

use anyhow::{anyhow, Context};
use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;

use super::claims::Claims;
use crate::state::AppState;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token signature or format is invalid")]
    Invalid,
    #[error("token has expired")]
    Expired,
}

/// Signs a token for `user` valid from `now` for `ttl`.
pub fn issue_token(
    user: &str,
    key: &EncodingKey,
    now: OffsetDateTime,
    ttl: Duration,
) -> anyhow::Result<String> {
    let secs = i64::try_from(ttl.as_secs()).context("token lifetime out of range")?;
    let exp = now
        .checked_add(TimeDuration::seconds(secs))
        .ok_or_else(|| anyhow!("token expiry out of range"))?;
    let claims = Claims {
        user: user.to_owned(),
        iat: now.unix_timestamp(),
        exp: exp.unix_timestamp(),
    };
    let token = encode(&Header::new(Algorithm::HS256), &claims, key)?;
    Ok(token)
}

/// Checks the signature, then the expiry against `now`. Nothing else is
/// consulted, so the result depends only on the arguments.
pub fn verify_token(
    token: &str,
    key: &DecodingKey,
    now: OffsetDateTime,
) -> Result<Claims, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    // Expiry is compared against `now` below instead of the system clock.
    validation.validate_exp = false;

    let claims = decode::<Claims>(token, key, &validation)
        .map_err(|e| {
            debug!(error = %e, "jwt rejected");
            TokenError::Invalid
        })?
        .claims;

    if claims.exp <= now.unix_timestamp() {
        return Err(TokenError::Expired);
    }
    Ok(claims)
}

#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub ttl: Duration,
}

impl JwtKeys {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn sign(&self, user: &str) -> anyhow::Result<String> {
        let token = issue_token(user, &self.encoding, OffsetDateTime::now_utc(), self.ttl)?;
        debug!(user = %user, "jwt signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let claims = verify_token(token, &self.decoding, OffsetDateTime::now_utc())?;
        debug!(user = %claims.user, "jwt verified");
        Ok(claims)
    }
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        let jwt = &state.config.jwt;
        Self::new(&jwt.secret, jwt.ttl)
    }
}
