use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::jwt::CurrentUser,
    error::ApiError,
    posts,
    response::{success, Envelope},
    state::AppState,
};

use super::dto::{CommentData, CommentsData, CreateCommentRequest};
use super::repo;

pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/comments/:post_id",
        get(get_post_comments).post(create_post_comment),
    )
}

#[instrument(skip(state, _user))]
pub async fn get_post_comments(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(post_id): Path<Uuid>,
) -> Result<Json<Envelope<CommentsData>>, ApiError> {
    if !posts::repo::exists(&state.db, post_id).await? {
        return Err(ApiError::NotFound("No post found with that ID.".into()));
    }

    let rows = repo::list_by_post(&state.db, post_id).await?;
    Ok(success(CommentsData {
        comments: rows.into_iter().map(Into::into).collect(),
    }))
}

#[instrument(skip(state, user, payload))]
pub async fn create_post_comment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(post_id): Path<Uuid>,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<Envelope<CommentData>>), ApiError> {
    let body = payload
        .comment_body
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| ApiError::Validation("Please leave a comment.".into()))?;

    if !posts::repo::exists(&state.db, post_id).await? {
        return Err(ApiError::NotFound("No post found with that ID.".into()));
    }

    let comment = repo::create(&state.db, user.id, post_id, &body).await?;

    info!(comment_id = %comment.id, post_id = %post_id, "comment created");
    Ok((StatusCode::CREATED, success(CommentData { comment })))
}
