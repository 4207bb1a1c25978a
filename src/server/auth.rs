//! Registration, login and the admin gate

use axum::async_trait;
use axum::extract::{FromRequestParts, State};
use axum::http::request::Parts;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use super::{AppState, JsonBody};
use crate::users::UserPublic;
use crate::{Error, Result};

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE: &str = "blog_session";

/// A request made by a logged-in user; rejects with 401 otherwise
#[derive(Debug, Clone)]
pub struct AdminUser(pub UserPublic);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> core::result::Result<Self, Self::Rejection> {
        let token = session_token(&parts.headers).ok_or(Error::LoginRequired)?;
        state
            .sessions()
            .resolve(&token)
            .map(AdminUser)
            .ok_or(Error::LoginRequired)
    }
}

/// Token from `Authorization: Bearer ...`, falling back to the session cookie
fn session_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
        .filter(|t| !t.is_empty())
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    name: String,
    email: String,
    password: String,
}

/// `POST /api/auth/register`
pub async fn register(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> Result<impl IntoResponse> {
    if !state.config().allow_registration {
        return Err(Error::Forbidden("registration is disabled"));
    }

    let user = state
        .blocking(move |state| state.users().register(&req.name, &req.email, &req.password))
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "registered", "user": user })),
    ))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    email: String,
    password: String,
}

/// `POST /api/auth/login`
pub async fn login(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Result<impl IntoResponse> {
    let user = state
        .blocking(move |state| state.users().authenticate(&req.email, &req.password))
        .await?;

    let session = state.sessions().issue(user);
    let cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE,
        session.token,
        state.sessions().ttl().num_seconds()
    );
    tracing::info!(user_id = %session.user.id, "User logged in");

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(json!({
            "token": session.token,
            "expiresAt": session.expires_at,
            "user": session.user,
        })),
    ))
}

/// `POST /api/auth/logout`
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    if let Some(token) = session_token(&headers) {
        state.sessions().revoke(&token);
    }
    let cookie = format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE);
    ([(header::SET_COOKIE, cookie)], Json(json!({ "message": "logged out" })))
}

/// `GET /api/auth/session`
pub async fn session(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    match session_token(&headers).and_then(|token| state.sessions().resolve(&token)) {
        Some(user) => Json(json!({ "authenticated": true, "user": user })),
        None => Json(json!({ "authenticated": false })),
    }
}
