//! Initialize a new blog

use anyhow::Result;
use std::fs;
use std::path::Path;

use crate::content::{PostInput, PostStore};
use crate::{Blog, USERS_FILE};

const DEFAULT_CONFIG: &str = r#"# Blog configuration

# Site
title: My Blog
description: ''
author: 博主
language: zh-CN
timezone: ''

# Directory
posts_dir: posts
data_dir: data

# Writing
highlight:
  enable: true
  theme: base16-ocean.dark
  line_number: true

# Server
server:
  ip: localhost
  port: 3000

# Auth
session_ttl_hours: 720
allow_registration: true
"#;

const WELCOME_BODY: &str = r#"# Welcome

This post was created by `blog-rs init`. Edit or delete it from the admin API.

```rust
fn main() {
    println!("hello, blog");
}
```
"#;

/// Initialize a new blog in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    fs::create_dir_all(target_dir)?;

    let config_path = target_dir.join("_config.yml");
    if config_path.exists() {
        anyhow::bail!("Config already exists: {:?}", config_path);
    }
    fs::write(&config_path, DEFAULT_CONFIG)?;

    let blog = Blog::new(target_dir)?;
    fs::create_dir_all(&blog.posts_dir)?;

    let data_dir = blog.base_dir.join(&blog.config.data_dir);
    fs::create_dir_all(&data_dir)?;
    let users_file = data_dir.join(USERS_FILE);
    if !users_file.exists() {
        fs::write(&users_file, "[]")?;
    }

    let store: PostStore = blog.post_store();
    if store.slugs().is_empty() {
        let slug = store.create(PostInput::new("Hello World", WELCOME_BODY).with_tags(["welcome"]))?;
        tracing::debug!("Created welcome post {}", slug);
    }

    Ok(())
}
