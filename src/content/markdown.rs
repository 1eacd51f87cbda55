//! Canonical Markdown rendering of a post

use super::{FrontMatter, Post};

/// Render a post as a Markdown document with a leading front-matter block.
///
/// ```text
/// ---
/// id: "abc123"
/// title: "Hello World"
/// ---
///
/// <body>
/// ```
pub fn render_markdown(post: &Post) -> String {
    let lines = FrontMatter::from_post(post).to_lines();
    let body = post.body.as_deref().unwrap_or_default();

    let mut out = String::with_capacity(body.len() + 256);
    out.push_str("---\n");
    for line in &lines {
        out.push_str(line);
        out.push('\n');
    }
    out.push_str("---\n\n");
    out.push_str(body);
    out
}
