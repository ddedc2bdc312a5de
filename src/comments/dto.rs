use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::comments::repo::{Comment, CommentRow};
use crate::posts::dto::Author;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub comment_body: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: Uuid,
    pub comment: String,
    pub created_at: OffsetDateTime,
    pub user: Author,
}

impl From<CommentRow> for CommentView {
    fn from(row: CommentRow) -> Self {
        Self {
            id: row.id,
            comment: row.comment,
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
pub struct CommentData {
    pub comment: Comment,
}

#[derive(Debug, Serialize)]
pub struct CommentsData {
    pub comments: Vec<CommentView>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comment_view_nests_the_author() {
        let row = CommentRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            post_id: Uuid::new_v4(),
            comment: "nice post".into(),
            created_at: OffsetDateTime::now_utc(),
            author_first_name: "Grace".into(),
            author_last_name: "Hopper".into(),
            author_image: "grace.png".into(),
        };
        let json = serde_json::to_value(CommentView::from(row)).unwrap();
        assert_eq!(json["comment"], "nice post");
        assert_eq!(json["user"]["lastName"], "Hopper");
    }
}
