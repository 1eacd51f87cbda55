//! Deterministic file names for mirrored posts
//!
//! A post maps to `{date}-{slug}.md`. The date is taken from the first
//! available of the content date, publish date and creation date, and the
//! slug from the title. Every input shape yields a name; nothing here fails.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::Post;

/// Date segment used when no usable date is available
pub const UNKNOWN_DATE: &str = "unknown-date";

/// Name segment used when neither a title nor an identifier is available
const UNTITLED: &str = "untitled";

lazy_static! {
    static ref NOT_ASCII_ALNUM: Regex = Regex::new(r"[^a-z0-9]+").unwrap();
    static ref FORBIDDEN: Regex = Regex::new(r#"[/\\?%*:|"<>\x00-\x1f\x7f]"#).unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    static ref HYPHENS: Regex = Regex::new(r"-{2,}").unwrap();
}

/// How titles are turned into slugs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlugStyle {
    /// Lowercase ASCII letters and digits only; everything else becomes `-`
    Ascii,
    /// Lowercase, keeping non-ASCII letters; only characters that are unsafe
    /// in file names or object keys are replaced
    #[default]
    Unicode,
}

/// Format the `YYYY-MM-DD` segment of a date string (in UTC).
///
/// Absent or unparseable input yields [`UNKNOWN_DATE`].
pub fn date_part(input: Option<&str>) -> String {
    input
        .and_then(parse_date)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| UNKNOWN_DATE.to_string())
}

/// Parse a date string in the formats the CMS and authors use
fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    // RFC 3339 / ISO 8601 with offset, normalized to UTC
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }

    // Offset-less date-times are taken as UTC
    let datetime_formats = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M:%S",
        "%Y/%m/%d %H:%M",
    ];
    for fmt in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }

    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }

    None
}

/// Turn a title into a slug. The result may be empty.
pub fn slugify(title: &str, style: SlugStyle) -> String {
    let lower = title.to_lowercase();
    let replaced = match style {
        SlugStyle::Ascii => NOT_ASCII_ALNUM.replace_all(&lower, "-").into_owned(),
        SlugStyle::Unicode => {
            let safe = FORBIDDEN.replace_all(&lower, "-");
            let joined = WHITESPACE.replace_all(&safe, "-");
            HYPHENS.replace_all(&joined, "-").into_owned()
        }
    };
    replaced.trim_matches('-').to_string()
}

/// Make an identifier safe to use as a file name, preserving case
fn sanitize_id(id: &str) -> String {
    let safe = FORBIDDEN.replace_all(id.trim(), "-");
    let joined = WHITESPACE.replace_all(&safe, "-");
    let name = HYPHENS.replace_all(&joined, "-");
    let name = name.trim_matches('-');
    if name.is_empty() {
        UNTITLED.to_string()
    } else {
        name.to_string()
    }
}

/// File name of the mirrored artifact.
///
/// With post metadata the name is `{date}-{slug}.md`, where the slug falls
/// back to the post (or fallback) identifier when the title is missing or
/// slugs to nothing. Without metadata the name is `{fallback_id}.md`.
pub fn file_name(post: Option<&Post>, fallback_id: &str, style: SlugStyle) -> String {
    let Some(post) = post else {
        return format!("{}.md", sanitize_id(fallback_id));
    };

    let id = if post.id.is_empty() {
        fallback_id
    } else {
        post.id.as_str()
    };

    let date = date_part(post.date_source());
    let name = post
        .title
        .as_deref()
        .map(|title| slugify(title, style))
        .filter(|slug| !slug.is_empty())
        .unwrap_or_else(|| sanitize_id(id));

    format!("{}-{}.md", date, name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(date: Option<&str>, title: Option<&str>) -> Post {
        Post {
            id: "abc123".to_string(),
            title: title.map(str::to_string),
            date: date.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_date_part_formats() {
        assert_eq!(date_part(Some("2024-01-05")), "2024-01-05");
        assert_eq!(date_part(Some("2024-01-05T10:30:00.000Z")), "2024-01-05");
        assert_eq!(date_part(Some("2024/01/05")), "2024-01-05");
        assert_eq!(date_part(Some("2024-01-05 23:10:00")), "2024-01-05");
    }

    #[test]
    fn test_date_part_normalizes_to_utc() {
        assert_eq!(date_part(Some("2024-01-05T08:00:00+09:00")), "2024-01-04");
        assert_eq!(date_part(Some("2024-01-05T20:00:00-05:00")), "2024-01-06");
    }

    #[test]
    fn test_date_part_sentinel() {
        assert_eq!(date_part(None), UNKNOWN_DATE);
        assert_eq!(date_part(Some("")), UNKNOWN_DATE);
        assert_eq!(date_part(Some("next tuesday")), UNKNOWN_DATE);
        assert_eq!(date_part(Some("2024-13-45")), UNKNOWN_DATE);
    }

    #[test]
    fn test_ascii_slug() {
        assert_eq!(slugify("Hello World", SlugStyle::Ascii), "hello-world");
        assert_eq!(slugify("  Rust: 2024 -- Edition!  ", SlugStyle::Ascii), "rust-2024-edition");
        assert_eq!(slugify("こんにちは", SlugStyle::Ascii), "");
        assert_eq!(slugify("Café au lait", SlugStyle::Ascii), "caf-au-lait");
    }

    #[test]
    fn test_unicode_slug() {
        assert_eq!(slugify("Hello World", SlugStyle::Unicode), "hello-world");
        assert_eq!(slugify("Rustで書く CLI", SlugStyle::Unicode), "rustで書く-cli");
        assert_eq!(slugify("a/b\\c?d%e*f:g|h\"i<j>k", SlugStyle::Unicode), "a-b-c-d-e-f-g-h-i-j-k");
        assert_eq!(slugify("  -- Café  au lait -- ", SlugStyle::Unicode), "café-au-lait");
        assert_eq!(slugify("///", SlugStyle::Unicode), "");
    }

    #[test]
    fn test_file_name_is_deterministic() {
        let p = post(Some("2024-01-05"), Some("Hello World"));
        let first = file_name(Some(&p), "abc123", SlugStyle::Unicode);
        let second = file_name(Some(&p.clone()), "abc123", SlugStyle::Unicode);
        assert_eq!(first, "2024-01-05-hello-world.md");
        assert_eq!(first, second);
    }

    #[test]
    fn test_file_name_rename_changes_key() {
        let before = post(Some("2024-01-05"), Some("Hello World"));
        let after = post(Some("2024-01-05"), Some("Hello Rust"));
        assert_ne!(
            file_name(Some(&before), "abc123", SlugStyle::Ascii),
            file_name(Some(&after), "abc123", SlugStyle::Ascii)
        );
    }

    #[test]
    fn test_file_name_missing_date() {
        let p = post(None, Some("Hello World"));
        assert_eq!(
            file_name(Some(&p), "abc123", SlugStyle::Ascii),
            "unknown-date-hello-world.md"
        );
    }

    #[test]
    fn test_file_name_date_fallbacks() {
        let mut p = post(None, Some("Hello"));
        p.created_at = Some("2023-12-31T12:00:00.000Z".to_string());
        assert_eq!(file_name(Some(&p), "", SlugStyle::Ascii), "2023-12-31-hello.md");

        p.published_at = Some("2024-02-01T00:00:00.000Z".to_string());
        assert_eq!(file_name(Some(&p), "", SlugStyle::Ascii), "2024-02-01-hello.md");

        // The first available source wins even when it cannot be parsed
        p.date = Some("not a date".to_string());
        assert_eq!(file_name(Some(&p), "", SlugStyle::Ascii), "unknown-date-hello.md");
    }

    #[test]
    fn test_file_name_missing_title() {
        let p = post(Some("2024-01-05"), None);
        assert_eq!(file_name(Some(&p), "ignored", SlugStyle::Ascii), "2024-01-05-abc123.md");

        let p = post(Some("2024-01-05"), Some("日本語のタイトル"));
        assert_eq!(file_name(Some(&p), "ignored", SlugStyle::Ascii), "2024-01-05-abc123.md");

        let mut p = post(None, None);
        p.id = String::new();
        assert_eq!(file_name(Some(&p), "fromhook", SlugStyle::Ascii), "unknown-date-fromhook.md");
    }

    #[test]
    fn test_file_name_without_metadata() {
        assert_eq!(file_name(None, "abc123", SlugStyle::Unicode), "abc123.md");
        assert_eq!(file_name(None, "", SlugStyle::Unicode), "untitled.md");
        assert_eq!(file_name(None, "../etc", SlugStyle::Unicode), "..-etc.md");
    }
}
