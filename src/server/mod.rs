//! HTTP server: reader pages and the admin JSON API

mod api;
mod auth;
mod extract;
mod pages;

pub use auth::{AdminUser, SESSION_COOKIE};
pub use extract::JsonBody;

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::config::SiteConfig;
use crate::content::PostStore;
use crate::templates::TemplateRenderer;
use crate::users::{SessionStore, UserDirectory};
use crate::Blog;

/// Shared server state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Inner>,
}

struct Inner {
    config: SiteConfig,
    posts: PostStore,
    users: UserDirectory,
    sessions: SessionStore,
    templates: TemplateRenderer,
}

impl AppState {
    pub fn new(blog: &Blog) -> Result<Self> {
        Ok(Self {
            inner: Arc::new(Inner {
                config: blog.config.clone(),
                posts: blog.post_store(),
                users: blog.user_directory(),
                sessions: SessionStore::new(blog.config.session_ttl()),
                templates: TemplateRenderer::new()?,
            }),
        })
    }

    pub fn config(&self) -> &SiteConfig {
        &self.inner.config
    }

    pub fn posts(&self) -> &PostStore {
        &self.inner.posts
    }

    pub fn users(&self) -> &UserDirectory {
        &self.inner.users
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.inner.sessions
    }

    pub fn templates(&self) -> &TemplateRenderer {
        &self.inner.templates
    }

    /// Run store work on the blocking pool; the stores do synchronous file I/O
    pub(crate) async fn blocking<T, F>(&self, f: F) -> crate::Result<T>
    where
        F: FnOnce(&AppState) -> crate::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let state = self.clone();
        tokio::task::spawn_blocking(move || f(&state))
            .await
            .map_err(|e| crate::Error::Io(std::io::Error::other(e)))?
    }
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(pages::index))
        .route("/posts/:slug", get(pages::post))
        .route("/api/posts", get(api::list_posts).post(api::create_post))
        .route(
            "/api/posts/:slug",
            get(api::get_post)
                .put(api::update_post)
                .delete(api::delete_post),
        )
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/session", get(auth::session))
        .route("/api/health", get(api::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the server
pub async fn start(blog: &Blog, ip: &str, port: u16) -> Result<()> {
    let state = AppState::new(blog)?;
    let app = router(state);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    tracing::info!("Posts directory: {:?}", blog.posts_dir);
    tracing::info!("Users file: {:?}", blog.users_file);
    println!("Server running at http://{}:{}", ip, port);
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
