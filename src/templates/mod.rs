//! Reader page templates using the Tera template engine
//!
//! Templates are embedded in the binary.

use anyhow::Result;
use serde::Serialize;
use tera::{Context, Tera};

use crate::config::SiteConfig;
use crate::content::{Post, PostSummary};
use crate::helpers::post_url;

/// Template renderer with the embedded reader pages
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all page templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("pages/layout.html")),
            ("index.html", include_str!("pages/index.html")),
            ("post.html", include_str!("pages/post.html")),
            ("not_found.html", include_str!("pages/not_found.html")),
        ])?;

        Ok(Self { tera })
    }

    /// Post index page
    pub fn render_index(&self, config: &SiteConfig, posts: &[PostSummary]) -> Result<String> {
        let mut context = Context::new();
        context.insert("site", &SiteData::from(config));
        context.insert(
            "posts",
            &posts.iter().map(PostData::from_summary).collect::<Vec<_>>(),
        );
        self.render("index.html", &context)
    }

    /// Single post page; the rendered body is inserted unescaped
    pub fn render_post(&self, config: &SiteConfig, post: &Post) -> Result<String> {
        let mut context = Context::new();
        context.insert("site", &SiteData::from(config));
        context.insert("post", &PostData::from_post(post));
        self.render("post.html", &context)
    }

    pub fn render_not_found(&self, config: &SiteConfig) -> Result<String> {
        let mut context = Context::new();
        context.insert("site", &SiteData::from(config));
        self.render("not_found.html", &context)
    }

    fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
struct SiteData {
    title: String,
    description: String,
    language: String,
}

impl From<&SiteConfig> for SiteData {
    fn from(config: &SiteConfig) -> Self {
        Self {
            title: config.title.clone(),
            description: config.description.clone(),
            language: config.language.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct PostData {
    title: String,
    date: String,
    author: String,
    read_time: String,
    excerpt: String,
    tags: Vec<String>,
    url: String,
    html: String,
}

impl PostData {
    fn from_summary(summary: &PostSummary) -> Self {
        Self {
            title: summary.title.clone(),
            date: summary.date.clone(),
            author: summary.author.clone(),
            read_time: summary.read_time.clone(),
            excerpt: summary.excerpt.clone(),
            tags: summary.tags.clone(),
            url: post_url(&summary.slug),
            html: String::new(),
        }
    }

    fn from_post(post: &Post) -> Self {
        Self {
            html: post.html.clone(),
            ..Self::from_summary(&post.summary)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> PostSummary {
        PostSummary {
            slug: "hello-world".into(),
            title: "Hello <World>".into(),
            date: "2024-01-01".into(),
            excerpt: "Hi...".into(),
            author: "博主".into(),
            tags: vec!["rust".into()],
            read_time: "5".into(),
        }
    }

    #[test]
    fn test_render_index() {
        let renderer = TemplateRenderer::new().unwrap();
        let html = renderer
            .render_index(&SiteConfig::default(), &[summary()])
            .unwrap();
        assert!(html.contains(r#"<a href="/posts/hello-world">Hello &lt;World&gt;</a>"#));
        assert!(html.contains("#rust"));
    }

    #[test]
    fn test_render_empty_index() {
        let renderer = TemplateRenderer::new().unwrap();
        let html = renderer.render_index(&SiteConfig::default(), &[]).unwrap();
        assert!(html.contains("No posts yet."));
    }

    #[test]
    fn test_render_post_keeps_html() {
        let renderer = TemplateRenderer::new().unwrap();
        let post = Post {
            summary: summary(),
            content: "# Hi".into(),
            html: "<h1>Hi</h1>\n".into(),
        };
        let html = renderer.render_post(&SiteConfig::default(), &post).unwrap();
        assert!(html.contains("<h1>Hi</h1>"));
        assert!(html.contains("<title>Hello &lt;World&gt; | My Blog</title>"));
    }
}
