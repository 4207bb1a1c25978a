//! Post store - one markdown file per post in a single directory

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use walkdir::WalkDir;

use super::frontmatter::{self, PostMeta};
use super::post::{default_excerpt, non_empty, DEFAULT_READ_TIME, UNTITLED};
use super::{slug, MarkdownRenderer, Post, PostInput, PostSummary};
use crate::config::Clock;
use crate::helpers::write_atomic;
use crate::{Error, Result};

/// Extension of post files
pub const POST_EXT: &str = "md";

/// Hard cap on the number of posts `list` returns
pub const LIST_LIMIT: usize = 50;

/// Owns the posts directory and every read and write against it.
///
/// Mutations take a store-wide lock for their whole duration, so two
/// concurrent creates in this process never receive the same slug. Writers
/// outside the process are not coordinated with: the last write wins.
pub struct PostStore {
    root: PathBuf,
    renderer: MarkdownRenderer,
    default_author: String,
    clock: Clock,
    write_lock: Mutex<()>,
}

impl PostStore {
    /// Create a store rooted at `root`; the directory is created on first write
    pub fn new<P: AsRef<Path>>(root: P, renderer: MarkdownRenderer) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            renderer,
            default_author: "博主".to_string(),
            clock: Clock::Local,
            write_lock: Mutex::new(()),
        }
    }

    pub fn with_default_author(mut self, author: &str) -> Self {
        self.default_author = author.to_string();
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All posts, newest first, at most [`LIST_LIMIT`] of them.
    pub fn list(&self) -> Result<Vec<PostSummary>> {
        let mut posts = self.all()?;
        posts.truncate(LIST_LIMIT);
        Ok(posts)
    }

    /// Every post, newest first, without the listing cap.
    ///
    /// Files that cannot be read are logged and skipped.
    pub fn all(&self) -> Result<Vec<PostSummary>> {
        let mut posts = Vec::new();

        for (slug, path) in self.post_files() {
            match self.read_record(&slug, &path) {
                Ok((summary, _)) => posts.push(summary),
                Err(e) => {
                    tracing::warn!("Failed to load post {:?}: {}", path, e);
                }
            }
        }

        // Stable sort keeps file-name order among posts sharing a date
        posts.sort_by(|a, b| b.date.cmp(&a.date));

        Ok(posts)
    }

    /// Slugs of every persisted post, in file-name order
    pub fn slugs(&self) -> Vec<String> {
        self.post_files().into_iter().map(|(slug, _)| slug).collect()
    }

    /// Load one post and render its body
    pub fn get(&self, slug: &str) -> Result<Post> {
        let path = self.existing_path(slug)?;
        let (summary, content) = self.read_record(slug, &path).map_err(not_found_on_missing)?;
        let html = self.renderer.render(&content);

        Ok(Post {
            summary,
            content,
            html,
        })
    }

    /// Whether a post file exists for `slug`
    pub fn exists(&self, slug: &str) -> bool {
        slug::is_safe(slug) && self.post_path(slug).is_file()
    }

    /// Persist a new post and return the slug it was stored under
    pub fn create(&self, input: PostInput) -> Result<String> {
        let (meta, content) = self.prepare(input)?;
        let title = meta.title.as_deref().unwrap_or_default();

        let _guard = self.lock();
        fs::create_dir_all(&self.root)?;

        let slug = slug::resolve_unique(&slug::derive(title), |candidate| {
            self.post_path(candidate).exists()
        });
        self.write_post(&slug, meta, &content)?;

        tracing::info!("Created post {}", slug);
        Ok(slug)
    }

    /// Overwrite an existing post; its slug never changes
    pub fn update(&self, slug: &str, input: PostInput) -> Result<()> {
        let _guard = self.lock();
        self.existing_path(slug)?;

        let (meta, content) = self.prepare(input)?;
        self.write_post(slug, meta, &content)?;

        tracing::info!("Updated post {}", slug);
        Ok(())
    }

    /// Remove a post
    pub fn delete(&self, slug: &str) -> Result<()> {
        let _guard = self.lock();
        let path = self.existing_path(slug)?;

        fs::remove_file(&path).map_err(|e| not_found_on_missing(e.into()))?;

        tracing::info!("Deleted post {}", slug);
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn post_path(&self, slug: &str) -> PathBuf {
        self.root.join(format!("{}.{}", slug, POST_EXT))
    }

    fn existing_path(&self, slug: &str) -> Result<PathBuf> {
        if !slug::is_safe(slug) {
            return Err(Error::NotFound);
        }
        let path = self.post_path(slug);
        if path.is_file() {
            Ok(path)
        } else {
            Err(Error::NotFound)
        }
    }

    /// Markdown files directly under the root, sorted by file name
    fn post_files(&self) -> Vec<(String, PathBuf)> {
        if !self.root.is_dir() {
            return Vec::new();
        }

        WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| match e {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!("Failed to read posts directory entry: {}", e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file() && is_post_file(entry.path()))
            .filter_map(|entry| {
                let slug = entry.path().file_stem()?.to_str()?.to_string();
                Some((slug, entry.into_path()))
            })
            .collect()
    }

    /// Read a file and apply the read-side defaults; returns the summary and raw body
    fn read_record(&self, slug: &str, path: &Path) -> Result<(PostSummary, String)> {
        let raw = fs::read_to_string(path)?;

        let (meta, body) = match frontmatter::decode(&raw) {
            Ok((metadata, body)) => match PostMeta::from_metadata(&metadata) {
                Ok(meta) => (meta, body),
                Err(e) => {
                    tracing::warn!("Ignoring front-matter of {:?}: {}", path, e);
                    (PostMeta::default(), body)
                }
            },
            Err(e) => {
                tracing::warn!("Ignoring front-matter of {:?}: {}", path, e);
                (PostMeta::default(), raw)
            }
        };

        let excerpt = non_empty(meta.excerpt).unwrap_or_else(|| default_excerpt(&body));
        let summary = PostSummary {
            slug: slug.to_string(),
            title: non_empty(meta.title).unwrap_or_else(|| UNTITLED.to_string()),
            date: non_empty(meta.date).unwrap_or_else(|| self.clock.today_string()),
            excerpt,
            author: non_empty(meta.author).unwrap_or_else(|| self.default_author.clone()),
            tags: meta.tags,
            read_time: non_empty(meta.read_time).unwrap_or_else(|| DEFAULT_READ_TIME.to_string()),
        };

        Ok((summary, body))
    }

    /// Validate input and fill in write-side defaults
    fn prepare(&self, input: PostInput) -> Result<(PostMeta, String)> {
        let (Some(title), Some(content)) = (non_empty(input.title), non_empty(input.content))
        else {
            return Err(Error::validation("title and content are required"));
        };

        let meta = PostMeta {
            excerpt: Some(non_empty(input.excerpt).unwrap_or_else(|| default_excerpt(&content))),
            date: Some(non_empty(input.date).unwrap_or_else(|| self.clock.today_string())),
            author: Some(non_empty(input.author).unwrap_or_else(|| self.default_author.clone())),
            tags: input.tags.unwrap_or_default(),
            read_time: Some(
                non_empty(input.read_time).unwrap_or_else(|| DEFAULT_READ_TIME.to_string()),
            ),
            title: Some(title),
        };

        Ok((meta, content))
    }

    fn write_post(&self, slug: &str, meta: PostMeta, content: &str) -> Result<()> {
        let raw = frontmatter::encode(content, &meta.into_metadata())?;
        write_atomic(&self.root, &self.post_path(slug), raw.as_bytes())?;
        Ok(())
    }
}

/// Check if a file is a post file
fn is_post_file(path: &Path) -> bool {
    let hidden = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with('.'))
        .unwrap_or(true);

    !hidden
        && path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e == POST_EXT)
            .unwrap_or(false)
}

/// A file vanishing between the existence check and the read is a miss, not a fault
fn not_found_on_missing(err: Error) -> Error {
    match err {
        Error::Io(e) if e.kind() == io::ErrorKind::NotFound => Error::NotFound,
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn fixed_clock() -> Clock {
        Clock::Fixed(NaiveDate::from_ymd_opt(2024, 5, 20).unwrap())
    }

    fn store() -> (TempDir, PostStore) {
        let dir = TempDir::new().unwrap();
        let store = PostStore::new(dir.path().join("posts"), MarkdownRenderer::plain())
            .with_clock(fixed_clock());
        (dir, store)
    }

    #[test]
    fn test_create_then_get() {
        let (_dir, store) = store();

        let slug = store
            .create(PostInput::new("Hello World", "# Hi").with_tags(["rust", "blog"]))
            .unwrap();
        assert_eq!(slug, "hello-world");

        let post = store.get(&slug).unwrap();
        assert_eq!(post.summary.title, "Hello World");
        assert_eq!(post.content, "# Hi");
        assert_eq!(post.html, "<h1>Hi</h1>\n");
        assert_eq!(post.summary.tags, vec!["rust", "blog"]);
        assert_eq!(post.summary.excerpt, "# Hi...");
        assert_eq!(post.summary.date, "2024-05-20");
        assert_eq!(post.summary.author, "博主");
        assert_eq!(post.summary.read_time, "5");
    }

    #[test]
    fn test_same_title_gets_suffix() {
        let (_dir, store) = store();
        let first = store.create(PostInput::new("Hello World", "# Hi")).unwrap();
        let second = store.create(PostInput::new("Hello World", "again")).unwrap();
        let third = store.create(PostInput::new("hello   world!", "third")).unwrap();
        assert_eq!(first, "hello-world");
        assert_eq!(second, "hello-world-1");
        assert_eq!(third, "hello-world-2");
        assert_eq!(store.get("hello-world").unwrap().content, "# Hi");
    }

    #[test]
    fn test_create_requires_title_and_content() {
        let (_dir, store) = store();
        for input in [
            PostInput::new("", "body"),
            PostInput::new("title", ""),
            PostInput::default(),
        ] {
            assert!(matches!(store.create(input), Err(Error::Validation(_))));
        }
        assert!(store.slugs().is_empty());
    }

    #[test]
    fn test_explicit_fields_are_kept() {
        let (_dir, store) = store();
        let input = PostInput {
            author: Some("Alice".into()),
            read_time: Some("12".into()),
            ..PostInput::new("Custom", "body")
                .with_date("2023-12-31")
                .with_excerpt("short")
        };
        let slug = store.create(input).unwrap();
        let summary = &store.get(&slug).unwrap().summary;
        assert_eq!(summary.date, "2023-12-31");
        assert_eq!(summary.excerpt, "short");
        assert_eq!(summary.author, "Alice");
        assert_eq!(summary.read_time, "12");
    }

    #[test]
    fn test_update_keeps_slug() {
        let (_dir, store) = store();
        let slug = store.create(PostInput::new("Original", "v1")).unwrap();

        store
            .update(&slug, PostInput::new("Renamed Entirely", "v2"))
            .unwrap();

        let post = store.get(&slug).unwrap();
        assert_eq!(post.summary.slug, "original");
        assert_eq!(post.summary.title, "Renamed Entirely");
        assert_eq!(post.content, "v2");
        assert!(!store.exists("renamed-entirely"));
    }

    #[test]
    fn test_update_missing_is_not_found() {
        let (_dir, store) = store();
        assert!(matches!(
            store.update("ghost", PostInput::new("t", "c")),
            Err(Error::NotFound)
        ));
        // Missing wins over invalid input
        assert!(matches!(
            store.update("ghost", PostInput::default()),
            Err(Error::NotFound)
        ));
    }

    #[test]
    fn test_update_validates() {
        let (_dir, store) = store();
        let slug = store.create(PostInput::new("Keep", "body")).unwrap();
        assert!(matches!(
            store.update(&slug, PostInput::new("Keep", "")),
            Err(Error::Validation(_))
        ));
        assert_eq!(store.get(&slug).unwrap().content, "body");
    }

    #[test]
    fn test_delete_then_get() {
        let (_dir, store) = store();
        let slug = store.create(PostInput::new("Doomed", "bye")).unwrap();
        store.delete(&slug).unwrap();
        assert!(matches!(store.get(&slug), Err(Error::NotFound)));
        assert!(matches!(store.delete(&slug), Err(Error::NotFound)));
    }

    #[test]
    fn test_list_sorted_by_date_desc() {
        let (_dir, store) = store();
        for (title, date) in [("A", "2024-01-01"), ("B", "2024-03-01"), ("C", "2024-02-01")] {
            store
                .create(PostInput::new(title, "body").with_date(date))
                .unwrap();
        }
        let dates: Vec<String> = store.list().unwrap().into_iter().map(|p| p.date).collect();
        assert_eq!(dates, vec!["2024-03-01", "2024-02-01", "2024-01-01"]);
    }

    #[test]
    fn test_list_is_capped() {
        let (_dir, store) = store();
        for i in 0..(LIST_LIMIT + 5) {
            let date = format!("2024-01-{:02}", i % 28 + 1);
            store
                .create(PostInput::new(format!("Post {i}"), "body").with_date(date))
                .unwrap();
        }
        let posts = store.list().unwrap();
        assert_eq!(posts.len(), LIST_LIMIT);
        assert!(posts.windows(2).all(|w| w[0].date >= w[1].date));
        assert_eq!(store.slugs().len(), LIST_LIMIT + 5);
        assert_eq!(store.all().unwrap().len(), LIST_LIMIT + 5);
    }

    #[test]
    fn test_list_missing_directory_is_empty() {
        let (_dir, store) = store();
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_list_skips_unreadable_and_defaults_bad_headers() {
        let (_dir, store) = store();
        store.create(PostInput::new("Good", "fine").with_date("2024-01-01")).unwrap();

        let root = store.root().to_path_buf();
        // Not valid UTF-8: skipped
        fs::write(root.join("binary.md"), [0xff, 0xfe, 0x00]).unwrap();
        // Broken header: kept, every field defaulted
        fs::write(root.join("broken.md"), "---\ntitle: [oops\n---\nraw text").unwrap();
        // Not a post
        fs::write(root.join("notes.txt"), "ignored").unwrap();

        let posts = store.list().unwrap();
        let slugs: Vec<&str> = posts.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["broken", "good"]);

        let broken = &posts[0];
        assert_eq!(broken.title, "无标题");
        assert_eq!(broken.date, "2024-05-20");
        assert!(broken.excerpt.starts_with("---\ntitle: [oops"));
    }

    #[test]
    fn test_hand_written_post_defaults() {
        let (_dir, store) = store();
        fs::create_dir_all(store.root()).unwrap();
        fs::write(
            store.root().join("My_Old_Post.md"),
            "---\ntitle: Legacy\ndate: 2020-02-02\ntags: misc\n---\nbody text\n",
        )
        .unwrap();

        let post = store.get("My_Old_Post").unwrap();
        assert_eq!(post.summary.title, "Legacy");
        assert_eq!(post.summary.tags, vec!["misc"]);
        assert_eq!(post.summary.excerpt, "body text\n...");
        assert_eq!(post.summary.read_time, "5");
    }

    #[test]
    fn test_unsafe_slugs_are_not_found() {
        let (dir, store) = store();
        fs::write(dir.path().join("secret.md"), "---\ntitle: x\n---\n").unwrap();
        assert!(matches!(store.get("../secret"), Err(Error::NotFound)));
        assert!(matches!(store.delete("../secret"), Err(Error::NotFound)));
        assert!(dir.path().join("secret.md").exists());
    }

    #[test]
    fn test_file_layout() {
        let (_dir, store) = store();
        let slug = store
            .create(PostInput::new("Layout", "Body line").with_tags(["a"]))
            .unwrap();
        let raw = fs::read_to_string(store.root().join(format!("{slug}.md"))).unwrap();
        assert!(raw.starts_with("---\ntitle: Layout\ndate: 2024-05-20\n"));
        assert!(raw.contains("tags:\n- a\n"));
        assert!(raw.ends_with("---\nBody line"));
    }
}
