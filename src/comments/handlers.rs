use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument};

use super::{
    dto::{CreatedCommentResponse, NewCommentRequest},
    repo,
    repo_types::Comment,
};
use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

pub fn comment_routes() -> Router<AppState> {
    Router::new().route("/comments", get(list_comments).post(add_comment))
}

#[instrument(skip(state))]
pub async fn list_comments(State(state): State<AppState>) -> ApiResult<Json<Vec<Comment>>> {
    let comments = repo::list_all(&state.db).await?;
    Ok(Json(comments))
}

#[instrument(skip(state, payload))]
pub async fn add_comment(
    State(state): State<AppState>,
    payload: Option<Json<NewCommentRequest>>,
) -> ApiResult<(StatusCode, Json<CreatedCommentResponse>)> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();
    let (user, comment, rating) = payload
        .into_fields()
        .ok_or(ApiError::MissingFields("Please provide user, comment and rating"))?;

    let id = repo::insert(&state.db, &user, &comment, rating, OffsetDateTime::now_utc()).await?;

    info!(comment_id = %id, user = %user, rating, "comment added");
    Ok((
        StatusCode::CREATED,
        Json(CreatedCommentResponse {
            message: "Comment added successfully",
            id,
        }),
    ))
}
