use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        cookie::{cleared_cookie, session_cookie},
        dto::{LoginRequest, LoginResponse, MessageResponse, RegisterRequest, SessionResponse},
        extractors::SessionClaims,
        jwt::JwtKeys,
        password::{hash_password_blocking, verify_password_blocking},
        repo_types::User,
    },
    error::{ApiError, ApiResult},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/session", get(session))
        .route("/logout", post(logout))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Option<Json<RegisterRequest>>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();
    let (name, email, password) = payload
        .into_fields()
        .ok_or(ApiError::MissingFields("Name, email, and password are required"))?;

    let hash = hash_password_blocking(password).await?;

    match User::create(&state.db, &name, &email, &hash).await? {
        Some(user) => {
            info!(user_id = %user.id, user = %user.name, "user registered");
            Ok((
                StatusCode::CREATED,
                Json(MessageResponse {
                    message: "User registered successfully",
                }),
            ))
        }
        None => {
            warn!(user = %name, email = %email, "name or email already registered");
            Err(ApiError::DuplicateUser)
        }
    }
}

#[instrument(skip(state, jar, payload))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Option<Json<LoginRequest>>,
) -> ApiResult<(CookieJar, Json<LoginResponse>)> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();
    let (name, password) = payload
        .into_fields()
        .ok_or(ApiError::MissingFields("Name and password are required"))?;

    let Some(user) = User::find_by_name(&state.db, &name).await? else {
        warn!(user = %name, "login unknown user");
        return Err(ApiError::InvalidCredentials("unknown user"));
    };

    if !verify_password_blocking(password, user.password_hash.clone()).await? {
        warn!(user = %name, user_id = %user.id, "login invalid password");
        return Err(ApiError::InvalidCredentials("wrong password"));
    }

    let token = JwtKeys::from_ref(&state).sign(&user.name)?;
    let jar = jar.add(session_cookie(token, state.config.production));

    info!(user_id = %user.id, user = %user.name, "user logged in");
    Ok((
        jar,
        Json(LoginResponse {
            message: "Login successful",
            id: user.id,
            user: user.name,
        }),
    ))
}

#[instrument(skip_all)]
pub async fn session(SessionClaims(claims): SessionClaims) -> Json<SessionResponse> {
    Json(SessionResponse {
        message: "Session active",
        user: claims,
    })
}

#[instrument(skip_all)]
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<MessageResponse>) {
    let jar = jar.add(cleared_cookie(state.config.production));
    (
        jar,
        Json(MessageResponse {
            message: "Logged out successfully",
        }),
    )
}
