//! Content module - post model, Markdown rendering and file naming

pub mod filename;
mod frontmatter;
mod markdown;
mod post;

pub use filename::{file_name, SlugStyle};
pub use frontmatter::{FrontMatter, FrontMatterError};
pub use markdown::render_markdown;
pub use post::{Post, Thumbnail};
