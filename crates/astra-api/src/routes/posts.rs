use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use astra_persist::{NewPost, Post, PostUpdate};
use crate::{error::{ApiError, ApiResult}, state::AppState};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PostResponse {
    pub id: String,
    pub title: String,
    pub content: String,
    pub author: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Post> for PostResponse {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            title: post.title,
            content: post.content,
            author: post.author,
            reference: post.reference,
            image: post.image,
            created_at: post.created_at,
        }
    }
}

/// Editable fields of a post, used for both create and update
#[derive(Debug, Deserialize, ToSchema)]
pub struct PostPayload {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

impl PostPayload {
    fn validate(&self) -> ApiResult<()> {
        if self.title.trim().is_empty() || self.content.trim().is_empty() {
            return Err(ApiError::BadRequest("title and content are required".to_string()));
        }
        Ok(())
    }
}

impl From<PostPayload> for NewPost {
    fn from(payload: PostPayload) -> Self {
        NewPost {
            title: payload.title,
            content: payload.content,
            reference: payload.reference,
            image: payload.image,
        }
    }
}

impl From<PostPayload> for PostUpdate {
    fn from(payload: PostPayload) -> Self {
        PostUpdate {
            title: payload.title,
            content: payload.content,
            reference: payload.reference,
            image: payload.image,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListPostsQuery {
    pub limit: Option<usize>,
    /// Search term matched against title and content
    pub q: Option<String>,
}

/// List posts, newest first, optionally filtered by a search term
#[utoipa::path(
    get,
    path = "/posts",
    params(
        ("limit" = Option<usize>, Query, description = "Maximum number of posts to return"),
        ("q" = Option<String>, Query, description = "Case-insensitive search over title and content")
    ),
    responses(
        (status = 200, description = "Posts, newest first", body = [PostResponse])
    ),
    tag = "posts"
)]
pub async fn list_posts(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListPostsQuery>,
) -> ApiResult<Json<Vec<PostResponse>>> {
    let posts = match query.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        Some(term) => state
            .persist
            .posts()
            .list_recent(None)
            .await?
            .into_iter()
            .filter(|post| post.matches(term))
            .take(query.limit.unwrap_or(usize::MAX))
            .collect(),
        None => state.persist.posts().list_recent(query.limit).await?,
    };

    Ok(Json(posts.into_iter().map(PostResponse::from).collect::<Vec<_>>()))
}

/// Get a single post
#[utoipa::path(
    get,
    path = "/posts/{id}",
    params(
        ("id" = String, Path, description = "Post ID")
    ),
    responses(
        (status = 200, description = "Post found", body = PostResponse),
        (status = 404, description = "Post not found")
    ),
    tag = "posts"
)]
pub async fn get_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<PostResponse>> {
    let post = state
        .persist
        .posts()
        .get_post(&id)
        .await?
        .ok_or_else(|| ApiError::PostNotFound(id.clone()))?;

    Ok(Json(post.into()))
}

/// Publish a new post (admin)
#[utoipa::path(
    post,
    path = "/admin/posts",
    request_body = PostPayload,
    responses(
        (status = 201, description = "Post created", body = PostResponse),
        (status = 400, description = "Missing title or content"),
        (status = 401, description = "Not signed in")
    ),
    tag = "admin"
)]
pub async fn create_post(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<PostPayload>,
) -> ApiResult<(StatusCode, Json<PostResponse>)> {
    payload.validate()?;

    let post = state
        .persist
        .posts()
        .create_post(payload.into(), &state.config.site.author)
        .await?;

    tracing::info!(post_id = %post.id, "Post created");

    Ok((StatusCode::CREATED, Json(post.into())))
}

/// Replace the editable fields of a post (admin)
#[utoipa::path(
    put,
    path = "/admin/posts/{id}",
    params(
        ("id" = String, Path, description = "Post ID")
    ),
    request_body = PostPayload,
    responses(
        (status = 200, description = "Post updated", body = PostResponse),
        (status = 401, description = "Not signed in"),
        (status = 404, description = "Post not found")
    ),
    tag = "admin"
)]
pub async fn update_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<PostPayload>,
) -> ApiResult<Json<PostResponse>> {
    payload.validate()?;

    let post = state.persist.posts().update_post(&id, payload.into()).await?;

    tracing::info!(post_id = %post.id, "Post updated");

    Ok(Json(post.into()))
}

/// Delete a post (admin)
#[utoipa::path(
    delete,
    path = "/admin/posts/{id}",
    params(
        ("id" = String, Path, description = "Post ID")
    ),
    responses(
        (status = 204, description = "Post deleted"),
        (status = 401, description = "Not signed in"),
        (status = 404, description = "Post not found")
    ),
    tag = "admin"
)]
pub async fn delete_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.persist.posts().delete_post(&id).await?;

    tracing::info!(post_id = %id, "Post deleted");

    Ok(StatusCode::NO_CONTENT)
}
