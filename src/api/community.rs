//! Community feed endpoints

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use super::{ApiError, ApiResult, ApiState, UserQuery, api_error, bad_request};
use crate::db::{LikeState, Post};

const DEFAULT_PAGE: usize = 50;
const DEFAULT_AUTHOR: &str = "Farmer";

#[derive(Deserialize)]
pub struct ListQuery {
    pub limit: Option<usize>,
}

#[derive(Deserialize)]
pub struct NewPostRequest {
    pub author: Option<String>,
    #[serde(default)]
    pub content: String,
    pub tag: Option<String>,
}

#[derive(Serialize)]
pub struct ShareResponse {
    pub shares: i64,
}

async fn list_posts(
    State(state): State<Arc<ApiState>>,
    Query(params): Query<ListQuery>,
) -> ApiResult<Vec<Post>> {
    state
        .community
        .list(params.limit.unwrap_or(DEFAULT_PAGE))
        .map(Json)
        .map_err(api_error)
}

async fn create_post(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<NewPostRequest>,
) -> Result<(StatusCode, Json<Post>), ApiError> {
    let author = request
        .author
        .as_deref()
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .unwrap_or(DEFAULT_AUTHOR);

    let post = state
        .community
        .create_post(author, &request.content, request.tag.as_deref())
        .map_err(api_error)?
        .ok_or_else(|| bad_request("Post content is required"))?;

    tracing::debug!(post_id = %post.id, tag = %post.tag, "community post created");
    Ok((StatusCode::CREATED, Json(post)))
}

async fn toggle_like(
    State(state): State<Arc<ApiState>>,
    Path(post_id): Path<String>,
    Query(user): Query<UserQuery>,
) -> ApiResult<LikeState> {
    let user_id = user.resolve(&state);
    state
        .community
        .toggle_like(&post_id, &user_id)
        .map(Json)
        .map_err(api_error)
}

async fn share(
    State(state): State<Arc<ApiState>>,
    Path(post_id): Path<String>,
) -> ApiResult<ShareResponse> {
    let shares = state.community.share(&post_id).map_err(api_error)?;
    Ok(Json(ShareResponse { shares }))
}

/// Build the community router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .route("/posts/{post_id}/like", post(toggle_like))
        .route("/posts/{post_id}/share", post(share))
        .with_state(state)
}
