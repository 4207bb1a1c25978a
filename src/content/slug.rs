//! Title to slug conversion

use lazy_static::lazy_static;
use regex::Regex;

/// Maximum slug length, in characters
pub const MAX_SLUG_LEN: usize = 50;

/// Slug used when a title has no usable characters
pub const FALLBACK_SLUG: &str = "untitled";

lazy_static! {
    // ASCII lowercase, digits and the CJK Unified Ideographs block
    static ref DISALLOWED_RUN: Regex = Regex::new(r"[^a-z0-9\x{4e00}-\x{9fa5}]+").unwrap();
}

/// Derive a filesystem-safe slug from a post title
pub fn derive(title: &str) -> String {
    let lowered = title.to_lowercase();
    let hyphenated = DISALLOWED_RUN.replace_all(&lowered, "-");
    let slug: String = hyphenated
        .trim_matches('-')
        .chars()
        .take(MAX_SLUG_LEN)
        .collect();

    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}

/// Return `candidate`, or the first `candidate-N` (N = 1, 2, ...) not taken
pub fn resolve_unique<F>(candidate: &str, mut exists: F) -> String
where
    F: FnMut(&str) -> bool,
{
    if !exists(candidate) {
        return candidate.to_string();
    }

    let mut counter: u64 = 1;
    loop {
        let probe = format!("{}-{}", candidate, counter);
        if !exists(&probe) {
            return probe;
        }
        counter += 1;
    }
}

/// Whether a caller-supplied slug can safely name a file in the posts directory
pub fn is_safe(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.starts_with('.')
        && !slug.contains(['/', '\\', '\0'])
}

/// Whether every character is one a derived slug may contain
pub fn is_derived_charset(slug: &str) -> bool {
    slug.chars().all(|c| {
        c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || ('\u{4e00}'..='\u{9fa5}').contains(&c)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_derive_basic() {
        assert_eq!(derive("Hello World"), "hello-world");
        assert_eq!(derive("  Rust & Axum: 2024!  "), "rust-axum-2024");
        assert_eq!(derive("我的第一篇 博客"), "我的第一篇-博客");
    }

    #[test]
    fn test_derive_fallback() {
        assert_eq!(derive(""), "untitled");
        assert_eq!(derive("!!! ??? ***"), "untitled");
        assert_eq!(derive("Ünïcödé"), "n-c-d");
    }

    #[test]
    fn test_derive_bounds() {
        let titles = [
            "a".repeat(200),
            "中".repeat(80),
            "Émile Zola: J'accuse…!".to_string(),
            "-- leading and trailing --".to_string(),
            "tab\tnew\nline".to_string(),
            "😀 emoji only 😀".to_string(),
        ];
        for title in &titles {
            let slug = derive(title);
            assert!(!slug.is_empty(), "{title:?}");
            assert!(slug.chars().count() <= MAX_SLUG_LEN, "{title:?}");
            assert!(is_derived_charset(&slug), "{title:?} -> {slug:?}");
            assert!(is_safe(&slug));
        }
        assert_eq!(derive(&"中".repeat(80)).chars().count(), 50);
    }

    #[test]
    fn test_resolve_unique() {
        let taken: HashSet<&str> = ["hello-world", "hello-world-1", "hello-world-3"].into();
        assert_eq!(resolve_unique("fresh", |s| taken.contains(s)), "fresh");
        assert_eq!(
            resolve_unique("hello-world", |s| taken.contains(s)),
            "hello-world-2"
        );
        // Same predicate, same answer
        assert_eq!(
            resolve_unique("hello-world", |s| taken.contains(s)),
            "hello-world-2"
        );
    }

    #[test]
    fn test_is_safe() {
        assert!(is_safe("hello-world"));
        assert!(is_safe("My_Old_Post"));
        assert!(!is_safe(""));
        assert!(!is_safe("../data/users"));
        assert!(!is_safe(".hidden"));
        assert!(!is_safe("a\\b"));
    }
}
