use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::posts::repo::{Post, PostRow};

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub description: Option<String>,
    pub image: Option<String>,
}

/// Author display fields embedded in post and comment responses.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub image: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub id: Uuid,
    pub description: String,
    pub image: Option<String>,
    pub likes: i32,
    pub created_at: OffsetDateTime,
    pub user: Author,
}

impl From<PostRow> for PostView {
    fn from(row: PostRow) -> Self {
        Self {
            id: row.id,
            description: row.description,
            image: row.image,
            likes: row.likes,
            created_at: row.created_at,
            user: Author {
                id: row.user_id,
                first_name: row.author_first_name,
                last_name: row.author_last_name,
                image: row.author_image,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PostData {
    pub post: Post,
}

#[derive(Debug, Serialize)]
pub struct PostViewData {
    pub post: PostView,
}

#[derive(Debug, Serialize)]
pub struct PostsData {
    pub posts: Vec<PostView>,
}
