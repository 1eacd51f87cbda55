//! CLI command implementations

pub mod delete;
pub mod list;
pub mod render;
pub mod sync;
