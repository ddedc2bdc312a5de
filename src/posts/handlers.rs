use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::jwt::CurrentUser,
    error::ApiError,
    response::{success, Envelope},
    state::AppState,
};

use super::dto::{CreatePostRequest, PostData, PostViewData, PostsData};
use super::repo;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .route("/posts/user-posts", get(user_posts))
        .route("/posts/:post_id", patch(like_post))
}

#[instrument(skip(state, _user))]
pub async fn list_posts(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
) -> Result<Json<Envelope<PostsData>>, ApiError> {
    let rows = repo::list_all(&state.db).await?;
    if rows.is_empty() {
        return Err(ApiError::NotFound(
            "No posts yet. Post something so that you can view posts.".into(),
        ));
    }
    Ok(success(PostsData {
        posts: rows.into_iter().map(Into::into).collect(),
    }))
}

#[instrument(skip(state, user, payload))]
pub async fn create_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<Envelope<PostData>>), ApiError> {
    let description = payload
        .description
        .filter(|d| !d.trim().is_empty())
        .ok_or_else(|| ApiError::Validation("A post needs a text input.".into()))?;

    let post = repo::create(&state.db, user.id, &description, payload.image.as_deref()).await?;

    info!(post_id = %post.id, user_id = %user.id, "post created");
    Ok((StatusCode::CREATED, success(PostData { post })))
}

#[instrument(skip(state, user))]
pub async fn user_posts(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Envelope<PostsData>>, ApiError> {
    let rows = repo::list_by_user(&state.db, user.id).await?;
    Ok(success(PostsData {
        posts: rows.into_iter().map(Into::into).collect(),
    }))
}

#[instrument(skip(state, _user))]
pub async fn like_post(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(post_id): Path<Uuid>,
) -> Result<Json<Envelope<PostViewData>>, ApiError> {
    if !repo::like(&state.db, post_id).await? {
        return Err(ApiError::NotFound("No post found with that ID.".into()));
    }

    let row = repo::find_view(&state.db, post_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("No post found with that ID.".into()))?;

    Ok(success(PostViewData { post: row.into() }))
}
