//! Mirror configuration (mirror.yml + environment)

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        source: serde_yaml::Error,
    },
    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
    #[error("{0} is not configured")]
    Missing(&'static str),
}

/// Main mirror configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MirrorConfig {
    pub cms: CmsConfig,
    pub storage: StorageConfig,
    pub repository: RepositoryConfig,
    pub backup: BackupConfig,
    pub deploy: DeployConfig,
    pub server: ServerConfig,
}

impl MirrorConfig {
    /// Load configuration from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Load the file if it exists, then apply environment overrides
    pub fn resolve<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            tracing::debug!("Loading configuration from {:?}", path);
            Self::load(path)?
        } else {
            Self::default()
        };
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Override fields from environment variables.
    ///
    /// Empty values are ignored so that an exported-but-blank variable does
    /// not wipe out a value from the file.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(v) = var("MICROCMS_SERVICE_DOMAIN") {
            self.cms.service_domain = v;
        }
        if let Some(v) = var("MICROCMS_API_KEY") {
            self.cms.api_key = v;
        }
        if let Some(v) = var("MICROCMS_BASE_URL") {
            self.cms.base_url = Some(v);
        }

        if let Some(v) = var("R2_ENDPOINT") {
            self.storage.endpoint = v;
        }
        if let Some(v) = var("R2_ACCESS_KEY_ID") {
            self.storage.access_key_id = v;
        }
        if let Some(v) = var("R2_SECRET_ACCESS_KEY") {
            self.storage.secret_access_key = v;
        }
        if let Some(v) = var("R2_BUCKET") {
            self.storage.bucket = v.trim().to_string();
        }
        if let Some(v) = var("R2_REGION") {
            self.storage.region = v;
        }

        if let Some(v) = var("GITHUB_REPO") {
            self.repository.repo = v;
        }
        if let Some(v) = var("GITHUB_BRANCH") {
            self.repository.branch = v;
        }
        if let Some(v) = var("GITHUB_TOKEN") {
            self.repository.token = v;
        }
        if let Some(v) = var("GITHUB_API_BASE") {
            self.repository.api_base = v;
        }
        if let Some(v) = var("GITHUB_BACKUP_DIR") {
            self.backup.repo_dir = v;
        }

        if let Some(v) = var("VERCEL_DEPLOY_HOOK_URL") {
            self.deploy.hook_url = Some(v);
        }

        if let Some(port) = var("PORT").and_then(|v| v.parse().ok()) {
            self.server.port = port;
        }
    }
}

/// Headless CMS settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CmsConfig {
    /// Service subdomain, e.g. `myblog` for `myblog.microcms.io`
    pub service_domain: String,
    pub api_key: String,
    /// Explicit API root; takes precedence over `service_domain`
    pub base_url: Option<String>,
    /// Content endpoint holding the blog posts
    pub endpoint: String,
}

impl Default for CmsConfig {
    fn default() -> Self {
        Self {
            service_domain: String::new(),
            api_key: String::new(),
            base_url: None,
            endpoint: "blogs".to_string(),
        }
    }
}

impl CmsConfig {
    /// API root without a trailing slash
    pub fn api_root(&self) -> Result<String, ConfigError> {
        if let Some(base) = &self.base_url {
            return Ok(base.trim_end_matches('/').to_string());
        }
        if self.service_domain.is_empty() {
            return Err(ConfigError::Missing("MICROCMS_SERVICE_DOMAIN"));
        }
        Ok(format!("https://{}.microcms.io/api/v1", self.service_domain))
    }
}

/// S3-compatible object store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub endpoint: String,
    pub region: String,
    pub bucket: String,
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            region: "auto".to_string(),
            bucket: String::new(),
            access_key_id: String::new(),
            secret_access_key: String::new(),
        }
    }
}

/// Source-control host settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryConfig {
    pub api_base: String,
    /// `owner/repo`
    pub repo: String,
    pub branch: String,
    pub token: String,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.github.com".to_string(),
            repo: String::new(),
            branch: "main".to_string(),
            token: String::new(),
        }
    }
}

impl RepositoryConfig {
    /// Split `repo` into owner and name
    pub fn owner_and_name(&self) -> Result<(&str, &str), ConfigError> {
        match self.repo.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
                Ok((owner, name))
            }
            _ => Err(ConfigError::Invalid {
                name: "GITHUB_REPO",
                reason: format!("expected 'owner/repo', got '{}'", self.repo),
            }),
        }
    }
}

/// Backup profile settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackupConfig {
    pub repo_dir: String,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            repo_dir: "backups".to_string(),
        }
    }
}

/// Deploy hook settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    pub hook_url: Option<String>,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub ip: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            ip: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}
