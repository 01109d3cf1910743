//! HTTP-facing error type shared by every handler.
//!
//! Each variant maps to one status code and a JSON `{ "message": ... }` body.
//! `Internal` wraps the underlying cause for the server log only; clients get
//! a generic message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::auth::jwt::TokenError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    MissingFields(&'static str),

    #[error("user or email already exists")]
    DuplicateUser,

    /// The reason distinguishes an unknown user from a bad password in logs;
    /// both render the same response.
    #[error("invalid credentials: {0}")]
    InvalidCredentials(&'static str),

    #[error("not authenticated")]
    Unauthenticated,

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingFields(_) | ApiError::DuplicateUser => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredentials(_) | ApiError::Unauthenticated => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::Token(_) => StatusCode::FORBIDDEN,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn public_message(&self) -> String {
        match self {
            ApiError::MissingFields(msg) => (*msg).to_string(),
            ApiError::DuplicateUser => "User or email already exists".into(),
            ApiError::InvalidCredentials(_) => "Incorrect credentials".into(),
            ApiError::Unauthenticated => "Not authenticated".into(),
            ApiError::Token(_) => "Invalid token".into(),
            ApiError::Internal(_) => "Internal server error".into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(e) = &self {
            error!(error = ?e, "request failed");
        }
        let status = self.status();
        (status, Json(json!({ "message": self.public_message() }))).into_response()
    }
}
