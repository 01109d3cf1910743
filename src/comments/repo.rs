use anyhow::Context;
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::Comment;

/// All comments, newest first.
pub async fn list_all(db: &PgPool) -> anyhow::Result<Vec<Comment>> {
    let rows = sqlx::query_as::<_, Comment>(
        r#"
        SELECT id, user_name AS "user", comment, rating, created_at
        FROM comments
        ORDER BY created_at DESC
        "#,
    )
    .fetch_all(db)
    .await
    .context("list comments")?;
    Ok(rows)
}

pub async fn insert(
    db: &PgPool,
    user: &str,
    comment: &str,
    rating: i32,
    created_at: OffsetDateTime,
) -> anyhow::Result<Uuid> {
    let (id,) = sqlx::query_as::<_, (Uuid,)>(
        r#"
        INSERT INTO comments (user_name, comment, rating, created_at)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(user)
    .bind(comment)
    .bind(rating)
    .bind(created_at)
    .fetch_one(db)
    .await
    .context("insert comment")?;
    Ok(id)
}
