//! List blog content

use anyhow::Result;
use std::collections::HashMap;

use crate::content::PostStore;
use crate::Blog;

/// List blog content by type
pub fn run(blog: &Blog, content_type: &str) -> Result<()> {
    let store = blog.post_store();

    match content_type {
        "post" | "posts" => {
            let posts = store.list()?;
            println!("Posts ({}):", posts.len());
            for post in posts {
                println!("  {} - {} [{}]", post.date, post.title, post.slug);
            }
        }
        "tag" | "tags" => {
            let tags = tag_counts(&store)?;
            println!("Tags ({}):", tags.len());
            for (tag, count) in tags {
                println!("  {} ({})", tag, count);
            }
        }
        "slug" | "slugs" => {
            for slug in store.slugs() {
                println!("{}", slug);
            }
        }
        "user" | "users" => {
            let users = blog.user_directory().all()?;
            println!("Users ({}):", users.len());
            for user in users {
                println!("  {} <{}> [{}]", user.name, user.email, user.id);
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: post, tag, slug, user",
                content_type
            );
        }
    }

    Ok(())
}

/// Tag usage over every post, most used first
fn tag_counts(store: &PostStore) -> Result<Vec<(String, usize)>> {
    let mut tags: HashMap<String, usize> = HashMap::new();
    for post in store.all()? {
        for tag in post.tags {
            *tags.entry(tag).or_insert(0) += 1;
        }
    }
    let mut tags: Vec<_> = tags.into_iter().collect();
    tags.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    Ok(tags)
}
