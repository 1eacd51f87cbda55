//! Print the mirrored Markdown of a post

use anyhow::Result;

use crate::content::{render_markdown, FrontMatter};
use crate::BlogMirror;

/// Fetch `id` from the CMS and render it.
///
/// With `meta_only`, the rendered document is parsed back and only its
/// front-matter is returned, as YAML.
pub async fn render(app: &BlogMirror, id: &str, meta_only: bool) -> Result<String> {
    let post = app.mirror.cms.get(id).await?;
    let markdown = render_markdown(&post);

    if !meta_only {
        return Ok(markdown);
    }

    let (front_matter, _body) = FrontMatter::parse(&markdown)?;
    Ok(serde_yaml::to_string(&front_matter)?)
}

pub async fn run(app: &BlogMirror, id: &str, meta_only: bool) -> Result<()> {
    let output = render(app, id, meta_only).await?;
    print!("{}", output);
    Ok(())
}
