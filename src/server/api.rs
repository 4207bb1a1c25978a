//! Post and health endpoints

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};

use super::{AdminUser, AppState, JsonBody};
use crate::content::{Post, PostInput, PostSummary};
use crate::Result;

/// Listing is cheap to cache at the edge for a minute
const LIST_CACHE_CONTROL: &str = "public, s-maxage=60, stale-while-revalidate=300";

/// `GET /api/posts`
pub async fn list_posts(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let posts: Vec<PostSummary> = state.blocking(|state| state.posts().list()).await?;
    Ok(([(header::CACHE_CONTROL, LIST_CACHE_CONTROL)], Json(posts)))
}

/// `GET /api/posts/{slug}`
pub async fn get_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Post>> {
    let post = state.blocking(move |state| state.posts().get(&slug)).await?;
    Ok(Json(post))
}

#[derive(Debug, Serialize)]
pub struct Created {
    message: &'static str,
    slug: String,
}

/// `POST /api/posts`
pub async fn create_post(
    State(state): State<AppState>,
    AdminUser(user): AdminUser,
    JsonBody(input): JsonBody<PostInput>,
) -> Result<Json<Created>> {
    tracing::debug!(user_id = %user.id, "create post");
    let slug = state.blocking(move |state| state.posts().create(input)).await?;
    Ok(Json(Created {
        message: "post created",
        slug,
    }))
}

/// `PUT /api/posts/{slug}`
pub async fn update_post(
    State(state): State<AppState>,
    AdminUser(user): AdminUser,
    Path(slug): Path<String>,
    JsonBody(input): JsonBody<PostInput>,
) -> Result<Json<Value>> {
    tracing::debug!(user_id = %user.id, %slug, "update post");
    state
        .blocking(move |state| state.posts().update(&slug, input))
        .await?;
    Ok(Json(json!({ "message": "post updated" })))
}

/// `DELETE /api/posts/{slug}`
pub async fn delete_post(
    State(state): State<AppState>,
    AdminUser(user): AdminUser,
    Path(slug): Path<String>,
) -> Result<Json<Value>> {
    tracing::debug!(user_id = %user.id, %slug, "delete post");
    state
        .blocking(move |state| state.posts().delete(&slug))
        .await?;
    Ok(Json(json!({ "message": "post deleted" })))
}

/// `GET /api/health`: touches the post listing and the user file
pub async fn health(State(state): State<AppState>) -> Result<Json<Value>> {
    let (posts, users) = state
        .blocking(|state| {
            let posts = state.posts().all()?.len();
            let users = state.users().all()?.len();
            Ok((posts, users))
        })
        .await?;

    Ok(Json(json!({
        "status": "ok",
        "posts": posts,
        "users": users,
    })))
}
