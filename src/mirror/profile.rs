//! Mirror profiles: where and how a post is mirrored

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::content::SlugStyle;

/// The two deployed handlers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ProfileKind {
    /// Full mirror: upserts and deletes, then redeploys the site
    Sync,
    /// Append-only archive: upserts only, no redeploy
    Backup,
}

impl fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileKind::Sync => write!(f, "sync"),
            ProfileKind::Backup => write!(f, "backup"),
        }
    }
}

/// Per-handler settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorProfile {
    pub kind: ProfileKind,
    /// Object key prefix, including the trailing `/`
    pub object_prefix: String,
    /// Repository directory, without slashes at either end
    pub repo_dir: String,
    pub slug_style: SlugStyle,
    pub handles_delete: bool,
    pub triggers_deploy: bool,
}

impl MirrorProfile {
    pub fn sync() -> Self {
        Self {
            kind: ProfileKind::Sync,
            object_prefix: "blogs/".to_string(),
            repo_dir: "blogs".to_string(),
            slug_style: SlugStyle::Unicode,
            handles_delete: true,
            triggers_deploy: true,
        }
    }

    pub fn backup(repo_dir: &str) -> Self {
        let repo_dir = repo_dir.trim_matches('/');
        Self {
            kind: ProfileKind::Backup,
            object_prefix: "backups/".to_string(),
            repo_dir: if repo_dir.is_empty() {
                "backups".to_string()
            } else {
                repo_dir.to_string()
            },
            slug_style: SlugStyle::Ascii,
            handles_delete: false,
            triggers_deploy: false,
        }
    }

    /// Human-readable label used in error responses, e.g. `Sync`
    pub fn label(&self) -> &'static str {
        match self.kind {
            ProfileKind::Sync => "Sync",
            ProfileKind::Backup => "Backup",
        }
    }

    pub fn object_key(&self, file: &str) -> String {
        format!("{}{}", self.object_prefix, file)
    }

    pub fn repo_path(&self, file: &str) -> String {
        format!("{}/{}", self.repo_dir, file)
    }

    /// Commit message for writing `file`
    pub fn upsert_message(&self, file: &str, id: &str) -> String {
        format!("{}: {} (contentId: {})", self.kind, file, id)
    }

    /// Commit message for deleting `file`
    pub fn delete_message(&self, file: &str, id: &str) -> String {
        format!("delete: {} (contentId: {})", file, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_profile_paths() {
        let profile = MirrorProfile::sync();
        assert_eq!(profile.object_key("a.md"), "blogs/a.md");
        assert_eq!(profile.repo_path("a.md"), "blogs/a.md");
        assert_eq!(
            profile.upsert_message("a.md", "abc"),
            "sync: a.md (contentId: abc)"
        );
        assert_eq!(
            profile.delete_message("a.md", "abc"),
            "delete: a.md (contentId: abc)"
        );
        assert!(profile.handles_delete);
    }

    #[test]
    fn test_backup_profile_paths() {
        let profile = MirrorProfile::backup("/archive/posts/");
        assert_eq!(profile.object_key("a.md"), "backups/a.md");
        assert_eq!(profile.repo_path("a.md"), "archive/posts/a.md");
        assert_eq!(
            profile.upsert_message("a.md", "abc"),
            "backup: a.md (contentId: abc)"
        );
        assert_eq!(profile.slug_style, SlugStyle::Ascii);
        assert!(!profile.handles_delete);
        assert!(!profile.triggers_deploy);

        assert_eq!(MirrorProfile::backup("").repo_dir, "backups");
    }
}
