use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Post row as stored; `user_id` serializes as `user` to match the
/// unpopulated wire shape.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    #[serde(rename = "user")]
    pub user_id: Uuid,
    pub image: Option<String>,
    pub description: String,
    pub likes: i32,
    pub created_at: OffsetDateTime,
}

/// Post row joined with its author's display fields.
#[derive(Debug, Clone, FromRow)]
pub struct PostRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub image: Option<String>,
    pub description: String,
    pub likes: i32,
    pub created_at: OffsetDateTime,
    pub author_first_name: String,
    pub author_last_name: String,
    pub author_image: String,
}

const POST_VIEW: &str = r#"
    SELECT p.id, p.user_id, p.image, p.description, p.likes, p.created_at,
           u.first_name AS author_first_name,
           u.last_name  AS author_last_name,
           u.image      AS author_image
    FROM posts p
    JOIN users u ON u.id = p.user_id
"#;

pub async fn list_all(db: &PgPool) -> Result<Vec<PostRow>, sqlx::Error> {
    sqlx::query_as::<_, PostRow>(&format!("{POST_VIEW} ORDER BY p.created_at DESC"))
        .fetch_all(db)
        .await
}

pub async fn list_by_user(db: &PgPool, user_id: Uuid) -> Result<Vec<PostRow>, sqlx::Error> {
    sqlx::query_as::<_, PostRow>(&format!(
        "{POST_VIEW} WHERE p.user_id = $1 ORDER BY p.created_at DESC"
    ))
    .bind(user_id)
    .fetch_all(db)
    .await
}

pub async fn find_view(db: &PgPool, id: Uuid) -> Result<Option<PostRow>, sqlx::Error> {
    sqlx::query_as::<_, PostRow>(&format!("{POST_VIEW} WHERE p.id = $1"))
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn create(
    db: &PgPool,
    user_id: Uuid,
    description: &str,
    image: Option<&str>,
) -> Result<Post, sqlx::Error> {
    sqlx::query_as::<_, Post>(
        r#"
        INSERT INTO posts (user_id, description, image)
        VALUES ($1, $2, $3)
        RETURNING id, user_id, image, description, likes, created_at
        "#,
    )
    .bind(user_id)
    .bind(description)
    .bind(image)
    .fetch_one(db)
    .await
}

/// Atomic like counter bump; returns false when the post doesn't exist.
pub async fn like(db: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(r#"UPDATE posts SET likes = likes + 1 WHERE id = $1"#)
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn exists(db: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let row: (bool,) = sqlx::query_as(r#"SELECT EXISTS (SELECT 1 FROM posts WHERE id = $1)"#)
        .bind(id)
        .fetch_one(db)
        .await?;
    Ok(row.0)
}
