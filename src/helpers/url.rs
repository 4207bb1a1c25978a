//! URL helper functions

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

/// Characters escaped inside a single path segment
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Reader page URL of a post
///
/// # Examples
/// ```ignore
/// post_url("hello-world") // -> "/posts/hello-world"
/// ```
pub fn post_url(slug: &str) -> String {
    format!("/posts/{}", utf8_percent_encode(slug, SEGMENT))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_url() {
        assert_eq!(post_url("hello-world"), "/posts/hello-world");
        assert_eq!(post_url("我的-博客"), "/posts/%E6%88%91%E7%9A%84-%E5%8D%9A%E5%AE%A2");
        assert_eq!(post_url("a b?c"), "/posts/a%20b%3Fc");
    }
}
