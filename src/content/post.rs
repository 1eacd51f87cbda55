//! Blog post model as served by the CMS

use serde::{Deserialize, Deserializer, Serialize};

/// Custom deserializer for the category field.
///
/// The CMS returns either a plain string, or a reference object when the
/// field is backed by a separate content model; in that case the `name`
/// property is used.
fn category_name<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, IgnoredAny, MapAccess, Visitor};
    use std::fmt;

    struct CategoryName;

    impl<'de> Visitor<'de> for CategoryName {
        type Value = Option<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a category string or an object with a name")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_string<E>(self, value: String) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(value))
        }

        fn visit_map<M>(self, mut map: M) -> Result<Self::Value, M::Error>
        where
            M: MapAccess<'de>,
        {
            let mut name = None;
            while let Some(key) = map.next_key::<String>()? {
                if key == "name" {
                    name = map.next_value::<Option<String>>()?;
                } else {
                    map.next_value::<IgnoredAny>()?;
                }
            }
            Ok(name)
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }
    }

    deserializer.deserialize_any(CategoryName)
}

/// A blog post (content record)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Post {
    pub id: String,

    pub title: Option<String>,

    /// Raw Markdown body
    pub body: Option<String>,

    #[serde(deserialize_with = "category_name")]
    pub category: Option<String>,

    /// Content date set by the author
    pub date: Option<String>,

    pub published_at: Option<String>,

    pub created_at: Option<String>,

    pub updated_at: Option<String>,

    /// Hero image
    pub thumbnail: Option<Thumbnail>,
}

/// Hero image descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thumbnail {
    pub url: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
}

impl Post {
    /// Create a post with just an identifier and a title
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: Some(title.into()),
            ..Default::default()
        }
    }

    /// The first available date among content date, publish date and creation date
    pub fn date_source(&self) -> Option<&str> {
        [&self.date, &self.published_at, &self.created_at]
            .into_iter()
            .flatten()
            .map(|s| s.as_str())
            .find(|s| !s.trim().is_empty())
    }

    /// Category with surrounding whitespace and a leading `#` removed
    pub fn normalized_category(&self) -> Option<&str> {
        let category = self.category.as_deref()?.trim();
        let category = category.strip_prefix('#').unwrap_or(category);
        if category.is_empty() {
            None
        } else {
            Some(category)
        }
    }

    /// Non-empty `updatedAt` stamp
    pub fn updated_stamp(&self) -> Option<&str> {
        self.updated_at.as_deref().filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_cms_item() {
        let json = r#"{
            "id": "abc123",
            "createdAt": "2024-01-04T10:00:00.000Z",
            "updatedAt": "2024-01-06T08:00:00.000Z",
            "publishedAt": "2024-01-05T09:00:00.000Z",
            "revisedAt": "2024-01-06T08:00:00.000Z",
            "title": "Hello World",
            "body": "Some *text*",
            "category": "rust",
            "thumbnail": {"url": "https://images.example/a.png", "height": 630, "width": 1200}
        }"#;

        let post: Post = serde_json::from_str(json).unwrap();
        assert_eq!(post.id, "abc123");
        assert_eq!(post.title.as_deref(), Some("Hello World"));
        assert_eq!(post.category.as_deref(), Some("rust"));
        assert_eq!(post.date, None);
        assert_eq!(post.updated_at.as_deref(), Some("2024-01-06T08:00:00.000Z"));
        let thumb = post.thumbnail.unwrap();
        assert_eq!((thumb.width, thumb.height), (1200, 630));
    }

    #[test]
    fn test_category_reference_object() {
        let post: Post =
            serde_json::from_str(r#"{"id": "x", "category": {"id": "c1", "name": "Notes"}}"#)
                .unwrap();
        assert_eq!(post.category.as_deref(), Some("Notes"));

        let post: Post = serde_json::from_str(r#"{"id": "x", "category": null}"#).unwrap();
        assert_eq!(post.category, None);
    }

    #[test]
    fn test_partial_snapshot() {
        let post: Post = serde_json::from_str(r#"{"title": "Only a title"}"#).unwrap();
        assert!(post.id.is_empty());
        assert_eq!(post.title.as_deref(), Some("Only a title"));
        assert_eq!(post.body, None);
    }

    #[test]
    fn test_date_source_order() {
        let mut post = Post::new("x", "t");
        assert_eq!(post.date_source(), None);

        post.created_at = Some("2024-01-01".to_string());
        assert_eq!(post.date_source(), Some("2024-01-01"));

        post.published_at = Some("2024-01-02".to_string());
        assert_eq!(post.date_source(), Some("2024-01-02"));

        post.date = Some(String::new());
        assert_eq!(post.date_source(), Some("2024-01-02"));

        post.date = Some("2024-01-03".to_string());
        assert_eq!(post.date_source(), Some("2024-01-03"));
    }

    #[test]
    fn test_normalized_category() {
        let mut post = Post::new("x", "t");
        post.category = Some("  #rust ".to_string());
        assert_eq!(post.normalized_category(), Some("rust"));

        post.category = Some(" # ".to_string());
        assert_eq!(post.normalized_category(), None);
    }
}
