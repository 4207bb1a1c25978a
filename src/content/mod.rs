//! Content module - posts, their file format and their store

pub mod frontmatter;
mod markdown;
mod post;
pub mod slug;
mod store;

pub use frontmatter::{FrontMatterError, Metadata, PostMeta};
pub use markdown::MarkdownRenderer;
pub use post::{default_excerpt, Post, PostInput, PostSummary};
pub use store::{PostStore, LIST_LIMIT, POST_EXT};
