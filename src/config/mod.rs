//! Configuration module

mod settings;

pub use settings::BackupConfig;
pub use settings::CmsConfig;
pub use settings::ConfigError;
pub use settings::DeployConfig;
pub use settings::MirrorConfig;
pub use settings::RepositoryConfig;
pub use settings::ServerConfig;
pub use settings::StorageConfig;
