//! Manage admin users

use anyhow::Result;

use crate::Blog;

/// Register a user from the command line
pub fn add(blog: &Blog, name: &str, email: &str, password: &str) -> Result<()> {
    let user = blog.user_directory().register(name, email, password)?;
    println!("Registered {} <{}> with id {}", user.name, user.email, user.id);
    Ok(())
}
