//! Front-matter block of a mirrored Markdown file

use serde::{Deserialize, Serialize};

use super::Post;

/// Front-matter parsing errors
#[derive(Debug, thiserror::Error)]
pub enum FrontMatterError {
    #[error("front-matter block is not terminated by '---'")]
    Unterminated,
    #[error("invalid front-matter: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Metadata written at the top of every mirrored file.
///
/// Every field is optional; absent fields are omitted from the block
/// instead of being written empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FrontMatter {
    pub id: Option<String>,
    pub title: Option<String>,
    pub category: Option<String>,
    pub date: Option<String>,
    pub published_at: Option<String>,
    pub updated_at: Option<String>,
}

impl FrontMatter {
    /// Collect the mirrored fields of a post
    pub fn from_post(post: &Post) -> Self {
        let present = |value: &Option<String>| value.clone().filter(|v| !v.is_empty());
        Self {
            id: Some(post.id.clone()).filter(|v| !v.is_empty()),
            title: present(&post.title),
            category: present(&post.category),
            date: present(&post.date),
            published_at: present(&post.published_at),
            updated_at: present(&post.updated_at),
        }
    }

    /// Field lines in their fixed order, values double-quoted
    pub fn to_lines(&self) -> Vec<String> {
        let fields = [
            ("id", &self.id),
            ("title", &self.title),
            ("category", &self.category),
            ("date", &self.date),
            ("publishedAt", &self.published_at),
            ("updatedAt", &self.updated_at),
        ];

        fields
            .into_iter()
            .filter_map(|(key, value)| value.as_deref().map(|v| format!("{}: {}", key, quote(v))))
            .collect()
    }

    /// Split a document into its front-matter and the remaining body.
    ///
    /// Documents that do not open with `---` have no front-matter and are
    /// returned unchanged.
    pub fn parse(content: &str) -> Result<(Self, &str), FrontMatterError> {
        let Some(rest) = content.strip_prefix("---").and_then(strip_line_break) else {
            return Ok((FrontMatter::default(), content));
        };

        let (block, after) = if let Some(after) = rest.strip_prefix("---") {
            ("", after)
        } else {
            let end = rest.find("\n---").ok_or(FrontMatterError::Unterminated)?;
            (&rest[..end], &rest[end + 4..])
        };

        // Closing delimiter's line break, then the blank separator line
        let after = skip_line_break(after);
        let body = skip_line_break(after);

        if block.trim().is_empty() {
            return Ok((FrontMatter::default(), body));
        }

        let fm = serde_yaml::from_str::<FrontMatter>(block)?;
        Ok((fm, body))
    }
}

/// Quote a value as a double-quoted scalar.
///
/// A JSON string literal is also a valid YAML double-quoted scalar, so the
/// JSON escaper takes care of quotes, backslashes and control characters.
fn quote(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

fn strip_line_break(s: &str) -> Option<&str> {
    s.strip_prefix("\r\n").or_else(|| s.strip_prefix('\n'))
}

fn skip_line_break(s: &str) -> &str {
    s.strip_prefix("\r\n")
        .or_else(|| s.strip_prefix('\n'))
        .unwrap_or(s)
}
