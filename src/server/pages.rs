//! Reader pages

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

use super::AppState;
use crate::{Error, Result};

/// `GET /`
pub async fn index(State(state): State<AppState>) -> Result<Html<String>> {
    let html = state
        .blocking(|state| {
            let posts = state.posts().list()?;
            state
                .templates()
                .render_index(state.config(), &posts)
                .map_err(|e| Error::Render(e.to_string()))
        })
        .await?;
    Ok(Html(html))
}

/// `GET /posts/{slug}`
pub async fn post(State(state): State<AppState>, Path(slug): Path<String>) -> Result<Response> {
    let page = state
        .blocking(move |state| {
            let rendered = match state.posts().get(&slug) {
                Ok(post) => state
                    .templates()
                    .render_post(state.config(), &post)
                    .map(|html| (StatusCode::OK, html)),
                Err(Error::NotFound) => state
                    .templates()
                    .render_not_found(state.config())
                    .map(|html| (StatusCode::NOT_FOUND, html)),
                Err(e) => return Err(e),
            };
            rendered.map_err(|e| Error::Render(e.to_string()))
        })
        .await?;

    let (status, html) = page;
    Ok((status, Html(html)).into_response())
}
