//! Post models

use serde::{Deserialize, Serialize};

use super::frontmatter::{optional_string_or_vec, scalar_string};

/// Number of body characters kept in a generated excerpt
pub const EXCERPT_CHARS: usize = 150;

/// Suffix appended to a generated excerpt
pub const EXCERPT_ELLIPSIS: &str = "...";

/// Reading time written when none is given
pub const DEFAULT_READ_TIME: &str = "5";

/// Title shown for files whose header has none
pub const UNTITLED: &str = "无标题";

/// Everything about a post except its body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSummary {
    /// File stem of the backing file
    pub slug: String,
    pub title: String,
    /// Publication date, `YYYY-MM-DD`
    pub date: String,
    pub excerpt: String,
    pub author: String,
    pub tags: Vec<String>,
    pub read_time: String,
}

/// A single post with its markdown source and rendered HTML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    #[serde(flatten)]
    pub summary: PostSummary,

    /// Raw markdown body
    pub content: String,

    /// Rendered body; derived on read, never persisted
    pub html: String,
}

/// Fields accepted when creating or editing a post
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PostInput {
    pub title: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    #[serde(deserialize_with = "optional_string_or_vec")]
    pub tags: Option<Vec<String>>,
    pub author: Option<String>,
    /// Minutes, sent either as text or as a number
    #[serde(deserialize_with = "scalar_string")]
    pub read_time: Option<String>,
    pub date: Option<String>,
}

impl PostInput {
    /// Minimal input with a title and a body
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            content: Some(content.into()),
            ..Default::default()
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn with_excerpt(mut self, excerpt: impl Into<String>) -> Self {
        self.excerpt = Some(excerpt.into());
        self
    }
}

/// Excerpt generated from a body: its first 150 characters plus an ellipsis
pub fn default_excerpt(body: &str) -> String {
    let head: String = body.chars().take(EXCERPT_CHARS).collect();
    format!("{}{}", head, EXCERPT_ELLIPSIS)
}

/// Treat empty strings the same as missing values
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_excerpt() {
        assert_eq!(default_excerpt("# Hi"), "# Hi...");
        let long = "字".repeat(200);
        let excerpt = default_excerpt(&long);
        assert_eq!(excerpt.chars().count(), EXCERPT_CHARS + 3);
        assert!(excerpt.ends_with("..."));
    }

    #[test]
    fn test_input_from_json() {
        let input: PostInput = serde_json::from_str(
            r#"{"title":"T","content":"C","readTime":"3","tags":["a","b"]}"#,
        )
        .unwrap();
        assert_eq!(input.read_time.as_deref(), Some("3"));
        assert_eq!(input.tags, Some(vec!["a".to_string(), "b".to_string()]));
        assert_eq!(input.excerpt, None);
    }

    #[test]
    fn test_input_accepts_loose_types() {
        let input: PostInput =
            serde_json::from_str(r#"{"title":"T","content":"C","readTime":5,"tags":"rust"}"#)
                .unwrap();
        assert_eq!(input.read_time.as_deref(), Some("5"));
        assert_eq!(input.tags, Some(vec!["rust".to_string()]));

        let input: PostInput =
            serde_json::from_str(r#"{"title":"T","readTime":null,"tags":null}"#).unwrap();
        assert_eq!(input.read_time, None);
        assert_eq!(input.tags, None);
    }

    #[test]
    fn test_post_serializes_flat() {
        let post = Post {
            summary: PostSummary {
                slug: "s".into(),
                title: "T".into(),
                date: "2024-01-01".into(),
                excerpt: "e".into(),
                author: "a".into(),
                tags: vec![],
                read_time: "5".into(),
            },
            content: "# T".into(),
            html: "<h1>T</h1>\n".into(),
        };
        let value = serde_json::to_value(&post).unwrap();
        assert_eq!(value["slug"], "s");
        assert_eq!(value["readTime"], "5");
        assert_eq!(value["html"], "<h1>T</h1>\n");
    }
}
