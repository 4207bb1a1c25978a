//! Front-matter encoding and decoding
//!
//! A post file is a `---` delimited YAML header followed by the markdown body:
//!
//! ```text
//! ---
//! title: Hello World
//! tags:
//!   - rust
//! ---
//! # Hi
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};
use serde_yaml::{Mapping, Value};

/// Header delimiter line
const DELIMITER: &str = "---";

/// Ordered metadata map of a front-matter header
pub type Metadata = IndexMap<String, Value>;

#[derive(Debug, thiserror::Error)]
pub enum FrontMatterError {
    #[error("front-matter header is not closed by a `---` line")]
    Unterminated,

    #[error("front-matter header must be a mapping with string keys")]
    NotAMapping,

    #[error("invalid YAML front-matter: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Split raw text into its metadata and body.
///
/// Text that does not open with a delimiter line has no header and is
/// returned whole as the body.
pub fn decode(raw: &str) -> Result<(Metadata, String), FrontMatterError> {
    let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);

    let Some(rest) = strip_delimiter_line(raw) else {
        return Ok((Metadata::new(), raw.to_string()));
    };

    let mut offset = 0;
    loop {
        let line_end = rest[offset..].find('\n').map(|i| offset + i);
        let line = &rest[offset..line_end.unwrap_or(rest.len())];

        if line.trim_end_matches('\r') == DELIMITER {
            let metadata = parse_metadata(&rest[..offset])?;
            let body = match line_end {
                Some(end) => &rest[end + 1..],
                None => "",
            };
            return Ok((metadata, body.to_string()));
        }

        match line_end {
            Some(end) => offset = end + 1,
            None => return Err(FrontMatterError::Unterminated),
        }
    }
}

/// Serialize metadata and body back into a single text blob.
pub fn encode(body: &str, metadata: &Metadata) -> Result<String, FrontMatterError> {
    let yaml = serde_yaml::to_string(metadata)?;
    Ok(format!("{DELIMITER}\n{yaml}{DELIMITER}\n{body}"))
}

fn strip_delimiter_line(raw: &str) -> Option<&str> {
    let rest = raw.strip_prefix(DELIMITER)?;
    rest.strip_prefix('\n')
        .or_else(|| rest.strip_prefix("\r\n"))
}

fn parse_metadata(yaml: &str) -> Result<Metadata, FrontMatterError> {
    if yaml.trim().is_empty() {
        return Ok(Metadata::new());
    }

    match serde_yaml::from_str::<Value>(yaml)? {
        Value::Null => Ok(Metadata::new()),
        Value::Mapping(mapping) => mapping
            .into_iter()
            .map(|(key, value)| match key {
                Value::String(key) => Ok((key, value)),
                _ => Err(FrontMatterError::NotAMapping),
            })
            .collect(),
        _ => Err(FrontMatterError::NotAMapping),
    }
}

/// Custom deserializer that handles both a single string and a list of strings
pub(crate) fn string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, SeqAccess, Visitor};
    use std::fmt;

    struct StringOrVec;

    impl<'de> Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value.to_string()])
        }

        fn visit_string<E>(self, value: String) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value])
        }

        fn visit_seq<S>(self, mut seq: S) -> Result<Self::Value, S::Error>
        where
            S: SeqAccess<'de>,
        {
            let mut vec = Vec::new();
            while let Some(item) = seq.next_element::<Scalar>()? {
                if let Some(item) = item.0 {
                    vec.push(item);
                }
            }
            Ok(vec)
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(StringOrVec)
}

/// A YAML scalar read as text; `null` becomes `None`
struct Scalar(Option<String>);

impl<'de> Deserialize<'de> for Scalar {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};
        use std::fmt;

        struct ScalarVisitor;

        impl<'de> Visitor<'de> for ScalarVisitor {
            type Value = Scalar;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string, number or boolean")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Scalar, E> {
                Ok(Scalar(Some(value.to_string())))
            }

            fn visit_string<E: de::Error>(self, value: String) -> Result<Scalar, E> {
                Ok(Scalar(Some(value)))
            }

            fn visit_bool<E: de::Error>(self, value: bool) -> Result<Scalar, E> {
                Ok(Scalar(Some(value.to_string())))
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<Scalar, E> {
                Ok(Scalar(Some(value.to_string())))
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<Scalar, E> {
                Ok(Scalar(Some(value.to_string())))
            }

            fn visit_f64<E: de::Error>(self, value: f64) -> Result<Scalar, E> {
                Ok(Scalar(Some(value.to_string())))
            }

            fn visit_none<E: de::Error>(self) -> Result<Scalar, E> {
                Ok(Scalar(None))
            }

            fn visit_unit<E: de::Error>(self) -> Result<Scalar, E> {
                Ok(Scalar(None))
            }
        }

        deserializer.deserialize_any(ScalarVisitor)
    }
}

/// A string, number or boolean read as text; `null` becomes `None`
pub(crate) fn scalar_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Scalar::deserialize(deserializer)?.0)
}

#[derive(Deserialize)]
struct Tags(#[serde(deserialize_with = "string_or_vec")] Vec<String>);

/// Like `string_or_vec`, but `null` stays `None`
pub(crate) fn optional_string_or_vec<'de, D>(
    deserializer: D,
) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Tags>::deserialize(deserializer)?.map(|tags| tags.0))
}

/// Typed view of the fields a post header carries
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PostMeta {
    #[serde(deserialize_with = "scalar_string")]
    pub title: Option<String>,
    #[serde(deserialize_with = "scalar_string")]
    pub date: Option<String>,
    #[serde(deserialize_with = "scalar_string")]
    pub excerpt: Option<String>,
    #[serde(deserialize_with = "scalar_string")]
    pub author: Option<String>,
    #[serde(deserialize_with = "string_or_vec")]
    pub tags: Vec<String>,
    #[serde(rename = "readTime", deserialize_with = "scalar_string")]
    pub read_time: Option<String>,
}

impl PostMeta {
    /// Read the post fields out of a decoded header
    pub fn from_metadata(metadata: &Metadata) -> Result<Self, FrontMatterError> {
        let mapping: Mapping = metadata
            .iter()
            .map(|(key, value)| (Value::String(key.clone()), value.clone()))
            .collect();
        Ok(serde_yaml::from_value(Value::Mapping(mapping))?)
    }

    /// Header in the canonical field order: title, date, excerpt, author, tags, readTime
    pub fn into_metadata(self) -> Metadata {
        let mut metadata = Metadata::new();
        let scalars = [
            ("title", self.title),
            ("date", self.date),
            ("excerpt", self.excerpt),
            ("author", self.author),
        ];
        for (key, value) in scalars {
            if let Some(value) = value {
                metadata.insert(key.to_string(), Value::String(value));
            }
        }
        metadata.insert(
            "tags".to_string(),
            Value::Sequence(self.tags.into_iter().map(Value::String).collect()),
        );
        if let Some(read_time) = self.read_time {
            metadata.insert("readTime".to_string(), Value::String(read_time));
        }
        metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_metadata() -> Metadata {
        PostMeta {
            title: Some("Hello: World".to_string()),
            date: Some("2024-01-15".to_string()),
            excerpt: Some("first line\nsecond line...".to_string()),
            author: Some("博主".to_string()),
            tags: vec!["rust".to_string(), "true".to_string(), "5".to_string()],
            read_time: Some("5".to_string()),
        }
        .into_metadata()
    }

    #[test]
    fn test_encode_decode_identity() {
        let bodies = [
            "# Hi",
            "",
            "\n\nleading blank lines\n",
            "---\nbody that starts with a delimiter\n---\n",
            "中文内容\r\nwith crlf",
        ];
        for body in bodies {
            for metadata in [sample_metadata(), Metadata::new()] {
                let raw = encode(body, &metadata).unwrap();
                let (decoded, decoded_body) = decode(&raw).unwrap();
                assert_eq!(decoded, metadata, "metadata of {raw:?}");
                assert_eq!(decoded_body, body, "body of {raw:?}");
            }
        }
    }

    #[test]
    fn test_encode_keeps_field_order() {
        let raw = encode("body", &sample_metadata()).unwrap();
        let keys: Vec<&str> = raw
            .lines()
            .filter_map(|line| line.split_once(':').map(|(k, _)| k))
            .filter(|k| !k.starts_with(' '))
            .collect();
        assert_eq!(
            keys,
            vec!["title", "date", "excerpt", "author", "tags", "readTime"]
        );
    }

    #[test]
    fn test_decode_yaml_frontmatter() {
        let content = r#"---
title: Hello World
date: 2024-01-15
tags:
  - rust
  - blog
readTime: 7
---

This is the content.
"#;

        let (metadata, body) = decode(content).unwrap();
        let meta = PostMeta::from_metadata(&metadata).unwrap();
        assert_eq!(meta.title.as_deref(), Some("Hello World"));
        assert_eq!(meta.date.as_deref(), Some("2024-01-15"));
        assert_eq!(meta.tags, vec!["rust", "blog"]);
        assert_eq!(meta.read_time.as_deref(), Some("7"));
        assert_eq!(body, "\nThis is the content.\n");
    }

    #[test]
    fn test_decode_without_header() {
        let (metadata, body) = decode("just text\n---\n").unwrap();
        assert!(metadata.is_empty());
        assert_eq!(body, "just text\n---\n");
    }

    #[test]
    fn test_decode_crlf_header() {
        let (metadata, body) = decode("---\r\ntitle: Win\r\n---\r\nbody").unwrap();
        assert_eq!(metadata["title"], Value::String("Win".to_string()));
        assert_eq!(body, "body");
    }

    #[test]
    fn test_decode_unterminated() {
        assert!(matches!(
            decode("---\ntitle: open\nno closing line"),
            Err(FrontMatterError::Unterminated)
        ));
    }

    #[test]
    fn test_decode_malformed_yaml() {
        assert!(matches!(
            decode("---\ntitle: [unclosed\n---\nbody"),
            Err(FrontMatterError::Yaml(_))
        ));
        assert!(matches!(
            decode("---\n- a list\n---\nbody"),
            Err(FrontMatterError::NotAMapping)
        ));
    }

    #[test]
    fn test_single_string_tags() {
        let (metadata, _) = decode("---\ntags: Notes\n---\n").unwrap();
        let meta = PostMeta::from_metadata(&metadata).unwrap();
        assert_eq!(meta.tags, vec!["Notes"]);
        assert_eq!(meta.title, None);
    }

    #[test]
    fn test_null_fields_are_absent() {
        let (metadata, _) = decode("---\ntitle:\ntags:\n---\n").unwrap();
        let meta = PostMeta::from_metadata(&metadata).unwrap();
        assert_eq!(meta, PostMeta::default());
    }
}
