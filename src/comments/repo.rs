use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    #[serde(rename = "user")]
    pub user_id: Uuid,
    pub post_id: Uuid,
    pub comment: String,
    pub created_at: OffsetDateTime,
}

/// Comment joined with its author's display fields.
#[derive(Debug, Clone, FromRow)]
pub struct CommentRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub post_id: Uuid,
    pub comment: String,
    pub created_at: OffsetDateTime,
    pub author_first_name: String,
    pub author_last_name: String,
    pub author_image: String,
}

pub async fn list_by_post(db: &PgPool, post_id: Uuid) -> Result<Vec<CommentRow>, sqlx::Error> {
    sqlx::query_as::<_, CommentRow>(
        r#"
        SELECT c.id, c.user_id, c.post_id, c.comment, c.created_at,
               u.first_name AS author_first_name,
               u.last_name  AS author_last_name,
               u.image      AS author_image
        FROM comments c
        JOIN users u ON u.id = c.user_id
        WHERE c.post_id = $1
        ORDER BY c.created_at ASC
        "#,
    )
    .bind(post_id)
    .fetch_all(db)
    .await
}

pub async fn create(
    db: &PgPool,
    user_id: Uuid,
    post_id: Uuid,
    comment: &str,
) -> Result<Comment, sqlx::Error> {
    sqlx::query_as::<_, Comment>(
        r#"
        INSERT INTO comments (user_id, post_id, comment)
        VALUES ($1, $2, $3)
        RETURNING id, user_id, post_id, comment, created_at
        "#,
    )
    .bind(user_id)
    .bind(post_id)
    .bind(comment)
    .fetch_one(db)
    .await
}
