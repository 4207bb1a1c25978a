//! blog-rs: a personal markdown blog
//!
//! Posts live as markdown files with YAML front-matter in a single directory,
//! users live in a flat JSON file. The crate exposes the stores behind those
//! files plus an axum server with reader pages and an admin JSON API.

pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod helpers;
pub mod server;
pub mod templates;
pub mod users;

pub use error::{Error, Result};

use std::path::{Path, PathBuf};

use content::{MarkdownRenderer, PostStore};
use users::UserDirectory;

/// File name of the user directory inside the data directory
pub const USERS_FILE: &str = "users.json";

/// The main blog application
#[derive(Debug, Clone)]
pub struct Blog {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Directory holding one markdown file per post
    pub posts_dir: PathBuf,
    /// JSON file holding registered users
    pub users_file: PathBuf,
}

impl Blog {
    /// Create a new blog instance from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> anyhow::Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        Ok(Self::with_config(base_dir, config))
    }

    /// Create a blog instance from an already loaded configuration
    pub fn with_config<P: AsRef<Path>>(base_dir: P, config: config::SiteConfig) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        let posts_dir = base_dir.join(&config.posts_dir);
        let users_file = base_dir.join(&config.data_dir).join(USERS_FILE);

        Self {
            config,
            base_dir,
            posts_dir,
            users_file,
        }
    }

    /// Build the post store rooted at the posts directory
    pub fn post_store(&self) -> PostStore {
        let renderer = if self.config.highlight.enable {
            MarkdownRenderer::with_options(
                &self.config.highlight.theme,
                self.config.highlight.line_number,
            )
        } else {
            MarkdownRenderer::plain()
        };

        PostStore::new(&self.posts_dir, renderer)
            .with_default_author(&self.config.author)
            .with_clock(self.config.clock())
    }

    /// Build the user directory backed by the users file
    pub fn user_directory(&self) -> UserDirectory {
        UserDirectory::new(&self.users_file)
    }
}
