//! Dual-sink mirror: object store + repository
//!
//! Upserts are diffed against the `updated-at` stamp stored with the object
//! so that redelivered or no-op webhooks do not produce empty commits.
//! Nothing here retries or compensates: if the object store write succeeds
//! and the repository write fails, the two sinks disagree until the next
//! event for that post.

mod profile;

pub use profile::{MirrorProfile, ProfileKind};

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::cms::CmsClient;
use crate::content::{file_name, render_markdown, Post};
use crate::deploy::DeployHook;
use crate::error::MirrorError;
use crate::repository::Repository;
use crate::storage::ObjectStore;

/// Object metadata key holding the post's `updatedAt`
pub const UPDATED_AT_META: &str = "updated-at";

/// Object metadata key holding the post identifier
pub const CONTENT_ID_META: &str = "content-id";

const MARKDOWN_CONTENT_TYPE: &str = "text/markdown; charset=utf-8";

/// What an invocation did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncAction {
    Uploaded,
    Skipped,
    Deleted,
}

impl fmt::Display for SyncAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncAction::Uploaded => write!(f, "uploaded"),
            SyncAction::Skipped => write!(f, "skipped"),
            SyncAction::Deleted => write!(f, "deleted"),
        }
    }
}

/// Result of one mirror operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncOutcome {
    pub action: SyncAction,
    /// File name of the mirrored artifact
    pub file: String,
}

impl SyncOutcome {
    pub fn new(action: SyncAction, file: impl Into<String>) -> Self {
        Self {
            action,
            file: file.into(),
        }
    }
}

/// The external collaborators of the pipeline
#[derive(Debug, Clone)]
pub struct Mirror {
    pub cms: CmsClient,
    pub store: ObjectStore,
    pub repo: Repository,
    pub deploy: DeployHook,
}

impl Mirror {
    pub fn new(cms: CmsClient, store: ObjectStore, repo: Repository, deploy: DeployHook) -> Self {
        Self {
            cms,
            store,
            repo,
            deploy,
        }
    }

    /// Write a post to both sinks unless the stored copy is already current
    pub async fn upsert(
        &self,
        profile: &MirrorProfile,
        post: &Post,
    ) -> Result<SyncOutcome, MirrorError> {
        let file = file_name(Some(post), &post.id, profile.slug_style);
        let key = profile.object_key(&file);
        let path = profile.repo_path(&file);

        if let Some(existing) = self.store.head(&key).await? {
            let stored = existing.get(UPDATED_AT_META).filter(|s| !s.is_empty());
            if let (Some(stored), Some(incoming)) = (stored, post.updated_stamp()) {
                if stored == incoming {
                    tracing::info!("{} unchanged since {}, skipping", key, incoming);
                    return Ok(SyncOutcome::new(SyncAction::Skipped, file));
                }
            }
        }

        let markdown = render_markdown(post);

        let updated_at = post.updated_at.as_deref().unwrap_or_default();
        self.store
            .put(
                &key,
                markdown.as_bytes(),
                MARKDOWN_CONTENT_TYPE,
                &[(UPDATED_AT_META, updated_at), (CONTENT_ID_META, post.id.as_str())],
            )
            .await?;
        tracing::info!("Uploaded {} to bucket {}", key, self.store.bucket());

        self.repo
            .upsert(&path, &markdown, &profile.upsert_message(&file, &post.id))
            .await?;

        Ok(SyncOutcome::new(SyncAction::Uploaded, file))
    }

    /// Remove a post's artifact from both sinks.
    ///
    /// `snapshot` is whatever metadata is still known about the deleted post;
    /// without it the artifact is addressed by identifier alone. A failed
    /// object delete is logged and treated as already gone.
    pub async fn delete(
        &self,
        profile: &MirrorProfile,
        id: &str,
        snapshot: Option<&Post>,
    ) -> Result<SyncOutcome, MirrorError> {
        let file = file_name(snapshot, id, profile.slug_style);
        let key = profile.object_key(&file);
        let path = profile.repo_path(&file);

        match self.store.delete(&key).await {
            Ok(()) => tracing::info!("Deleted {} from bucket {}", key, self.store.bucket()),
            Err(e) => tracing::warn!("Object delete failed (may not exist): {}", e),
        }

        self.repo
            .remove(&path, &profile.delete_message(&file, id))
            .await?;

        Ok(SyncOutcome::new(SyncAction::Deleted, file))
    }

    /// Best-effort lookup of a post, used when a delete arrives without a
    /// snapshot. Any failure means "unknown".
    pub async fn lookup(&self, id: &str) -> Option<Post> {
        match self.cms.find(id).await {
            Ok(Some(post)) => Some(post),
            Ok(None) => {
                tracing::debug!("{} no longer exists in the CMS", id);
                None
            }
            Err(e) => {
                tracing::warn!("Could not fetch {} from CMS: {}", id, e);
                None
            }
        }
    }

    /// Notify the deploy hook after a change, if the profile asks for it
    pub async fn after_change(&self, profile: &MirrorProfile, outcome: &SyncOutcome) {
        if profile.triggers_deploy && outcome.action != SyncAction::Skipped {
            self.deploy.trigger().await;
        }
    }
}
