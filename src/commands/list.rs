//! List CMS posts with their mirrored file names

use anyhow::Result;

use crate::cms::Filter;
use crate::content::{file_name, filename::date_part};
use crate::mirror::ProfileKind;
use crate::BlogMirror;

/// One listed post
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    pub date: String,
    pub title: String,
    pub category: Option<String>,
    pub file: String,
}

/// Fetch every post, optionally restricted to one category
pub async fn entries(
    app: &BlogMirror,
    category: Option<&str>,
    kind: ProfileKind,
) -> Result<Vec<ListEntry>> {
    let filters: Vec<Filter> = category
        .map(|c| Filter::equals("category", c.trim().trim_start_matches('#')))
        .into_iter()
        .collect();

    let style = app.profile(kind).slug_style;
    let posts = app.mirror.cms.list_all(&filters).await?;

    Ok(posts
        .iter()
        .map(|post| ListEntry {
            date: date_part(post.date_source()),
            title: post.title.clone().unwrap_or_default(),
            category: post.normalized_category().map(str::to_string),
            file: file_name(Some(post), &post.id, style),
        })
        .collect())
}

pub async fn run(app: &BlogMirror, category: Option<&str>, kind: ProfileKind) -> Result<()> {
    let entries = entries(app, category, kind).await?;

    println!("Posts ({}):", entries.len());
    for entry in entries {
        match entry.category {
            Some(category) => println!(
                "  {} - {} #{} [{}]",
                entry.date, entry.title, category, entry.file
            ),
            None => println!("  {} - {} [{}]", entry.date, entry.title, entry.file),
        }
    }
    Ok(())
}
