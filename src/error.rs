//! Error taxonomy shared by the stores and the HTTP layer

use std::io;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Missing or malformed input, reported back to the caller verbatim
    #[error("{0}")]
    Validation(String),

    #[error("not found")]
    NotFound,

    /// Bad credentials; deliberately carries no reason
    #[error("invalid email or password")]
    Unauthenticated,

    /// Admin route hit without a live session
    #[error("login required")]
    LoginRequired,

    #[error("{0}")]
    Forbidden(&'static str),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    FrontMatter(#[from] crate::content::FrontMatterError),

    #[error("password hash error: {0}")]
    Hash(String),

    #[error("template error: {0}")]
    Render(String),
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::Unauthenticated | Error::LoginRequired => StatusCode::UNAUTHORIZED,
            Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::Io(_)
            | Error::Json(_)
            | Error::FrontMatter(_)
            | Error::Hash(_)
            | Error::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Unreadable request bodies are the caller's mistake
impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::Validation(rejection.body_text())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Error::Io(e) => {
                tracing::error!(%e, "storage io error");
                "Internal Server Error".to_string()
            }
            Error::Json(e) => {
                tracing::error!(%e, "json storage error");
                "Internal Server Error".to_string()
            }
            Error::FrontMatter(e) => {
                tracing::error!(%e, "front-matter encode error");
                "Internal Server Error".to_string()
            }
            Error::Hash(e) => {
                tracing::error!(%e, "password hash error");
                "Internal Server Error".to_string()
            }
            Error::Render(e) => {
                tracing::error!(%e, "template render error");
                "Internal Server Error".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
