//! Error taxonomy for a mirror invocation

use crate::cms::CmsError;
use crate::config::ConfigError;
use crate::repository::RepositoryError;
use crate::storage::StorageError;

/// Anything that fails a webhook invocation.
///
/// Expected absences (missing object, missing repository file, deleted CMS
/// item during a delete) are not errors and never reach this type.
#[derive(Debug, thiserror::Error)]
pub enum MirrorError {
    /// The request itself is unusable; nothing was attempted.
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Cms(#[from] CmsError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl MirrorError {
    /// Whether the caller, rather than an upstream service, is at fault
    pub fn is_client_error(&self) -> bool {
        matches!(self, MirrorError::BadRequest(_))
    }
}
