use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::dto::present;

#[derive(Debug, Default, Deserialize)]
pub struct NewCommentRequest {
    pub user: Option<String>,
    pub comment: Option<String>,
    pub rating: Option<i32>,
}

impl NewCommentRequest {
    /// `(user, comment, rating)` when both strings are non-empty and the
    /// rating is positive.
    pub fn into_fields(self) -> Option<(String, String, i32)> {
        let rating = self.rating.filter(|r| *r > 0)?;
        Some((present(self.user)?, present(self.comment)?, rating))
    }
}

#[derive(Debug, Serialize)]
pub struct CreatedCommentResponse {
    pub message: &'static str,
    pub id: Uuid,
}
