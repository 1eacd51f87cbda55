//! blog-mirror: mirror headless CMS posts into object storage and Git
//!
//! This crate receives content-change webhooks, renders the affected post
//! to Markdown with front-matter, writes it to an S3-compatible bucket and
//! a GitHub repository, and pings a deploy hook.

pub mod cms;
pub mod commands;
pub mod config;
pub mod content;
pub mod deploy;
pub mod error;
pub mod helpers;
pub mod mirror;
pub mod repository;
pub mod server;
pub mod storage;
pub mod webhook;

use std::path::Path;

pub use error::MirrorError;

use config::{ConfigError, MirrorConfig};
use mirror::{Mirror, MirrorProfile, ProfileKind, SyncOutcome};
use webhook::WebhookPayload;

/// The main application: configuration plus long-lived clients
#[derive(Debug, Clone)]
pub struct BlogMirror {
    /// Resolved configuration
    pub config: MirrorConfig,
    /// CMS, object store, repository and deploy hook clients
    pub mirror: Mirror,
    /// Profile behind `/api/sync`
    pub sync_profile: MirrorProfile,
    /// Profile behind `/api/backup`
    pub backup_profile: MirrorProfile,
}

impl BlogMirror {
    /// Build the application from a resolved configuration
    pub fn new(config: MirrorConfig) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("blog-mirror/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ConfigError::Invalid {
                name: "http client",
                reason: e.to_string(),
            })?;

        let cms = cms::CmsClient::new(http.clone(), &config.cms)?;
        let store = storage::ObjectStore::new(&config.storage)?;
        let repo = repository::Repository::new(http.clone(), &config.repository)?;
        let deploy = deploy::DeployHook::new(http, config.deploy.hook_url.clone());

        let sync_profile = MirrorProfile::sync();
        let backup_profile = MirrorProfile::backup(&config.backup.repo_dir);

        Ok(Self {
            config,
            mirror: Mirror::new(cms, store, repo, deploy),
            sync_profile,
            backup_profile,
        })
    }

    /// Load `mirror.yml` (if present) and the environment, then build
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self, ConfigError> {
        let config = MirrorConfig::resolve(config_path)?;
        Self::new(config)
    }

    pub fn profile(&self, kind: ProfileKind) -> &MirrorProfile {
        match kind {
            ProfileKind::Sync => &self.sync_profile,
            ProfileKind::Backup => &self.backup_profile,
        }
    }

    /// Handle one webhook for the given profile
    pub async fn handle(
        &self,
        kind: ProfileKind,
        payload: &WebhookPayload,
        query_id: Option<&str>,
    ) -> Result<SyncOutcome, MirrorError> {
        webhook::dispatch(&self.mirror, self.profile(kind), payload, query_id).await
    }
}
