//! Create a new post

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::content::{PostInput, POST_EXT};
use crate::Blog;

/// Create a post from a title and a markdown file (or inline content)
pub fn create_post(
    blog: &Blog,
    title: &str,
    content: Option<&str>,
    file: Option<&Path>,
    tags: Vec<String>,
) -> Result<String> {
    let content = match (content, file) {
        (Some(content), _) => content.to_string(),
        (None, Some(file)) => {
            fs::read_to_string(file).with_context(|| format!("Failed to read {:?}", file))?
        }
        (None, None) => anyhow::bail!("Provide the post body with --content or --file"),
    };

    let mut input = PostInput::new(title, content);
    if !tags.is_empty() {
        input = input.with_tags(tags);
    }

    let slug = blog.post_store().create(input)?;
    println!("Created: {:?}", blog.posts_dir.join(format!("{}.{}", slug, POST_EXT)));

    Ok(slug)
}
