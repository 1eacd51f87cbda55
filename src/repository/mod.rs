//! Source-control host client (GitHub contents API)
//!
//! Files are written with read-then-conditional-write: the current blob
//! SHA is fetched first and passed back on update or delete, so the host
//! rejects the write when someone else changed the file in between.

use base64::Engine;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, RepositoryConfig};
use crate::helpers::{encode_path, encode_segment, join_url};

const ACCEPT: &str = "application/vnd.github+json";

/// Errors from repository calls
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// HTTP transport error.
    #[error("HTTP error during {operation} {path}: {source}")]
    Http {
        operation: &'static str,
        path: String,
        source: reqwest::Error,
    },
    /// The revision handle was stale or missing for an existing file.
    #[error("{operation} {path} rejected with {status}: {body}")]
    Conflict {
        operation: &'static str,
        path: String,
        status: u16,
        body: String,
    },
    /// Any other non-2xx status.
    #[error("{operation} {path} failed with {status}: {body}")]
    Status {
        operation: &'static str,
        path: String,
        status: u16,
        body: String,
    },
    /// Response deserialization failed.
    #[error("failed to deserialize response for {path}: {source}")]
    Deserialization { path: String, source: reqwest::Error },
}

/// Metadata of a file in the repository
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RepoFile {
    pub path: String,
    /// Blob SHA, the revision handle for conditional writes
    pub sha: String,
}

/// What an upsert did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
}

/// What a remove did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Deleted,
    /// Nothing existed at the path
    Missing,
}

#[derive(Debug, Serialize)]
struct PutBody<'a> {
    message: &'a str,
    content: String,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct DeleteBody<'a> {
    message: &'a str,
    sha: &'a str,
    branch: &'a str,
}

/// Client for one repository branch
#[derive(Debug, Clone)]
pub struct Repository {
    http: reqwest::Client,
    api_base: String,
    owner: String,
    name: String,
    branch: String,
    token: String,
}

impl Repository {
    /// Create a client sharing the given HTTP connection pool
    pub fn new(http: reqwest::Client, config: &RepositoryConfig) -> Result<Self, ConfigError> {
        let (owner, name) = config.owner_and_name()?;
        if config.token.is_empty() {
            return Err(ConfigError::Missing("GITHUB_TOKEN"));
        }
        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            owner: owner.to_string(),
            name: name.to_string(),
            branch: config.branch.clone(),
            token: config.token.clone(),
        })
    }

    fn contents_url(&self, path: &str) -> String {
        join_url(
            &self.api_base,
            &format!(
                "repos/{}/{}/contents/{}",
                encode_segment(&self.owner),
                encode_segment(&self.name),
                encode_path(path.trim_start_matches('/'))
            ),
        )
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, ACCEPT)
    }

    /// Fetch a file's metadata on the configured branch; absent is `Ok(None)`
    pub async fn get_file(&self, path: &str) -> Result<Option<RepoFile>, RepositoryError> {
        let resp = self
            .authorized(self.http.get(self.contents_url(path)))
            .query(&[("ref", self.branch.as_str())])
            .send()
            .await
            .map_err(|source| RepositoryError::Http {
                operation: "GET",
                path: path.to_string(),
                source,
            })?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RepositoryError::Status {
                operation: "GET",
                path: path.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let file = resp
            .json::<RepoFile>()
            .await
            .map_err(|source| RepositoryError::Deserialization {
                path: path.to_string(),
                source,
            })?;
        Ok(Some(file))
    }

    /// Create (`sha == None`) or update a file
    pub async fn put_file(
        &self,
        path: &str,
        content: &str,
        message: &str,
        sha: Option<&str>,
    ) -> Result<(), RepositoryError> {
        let body = PutBody {
            message,
            content: base64::engine::general_purpose::STANDARD.encode(content.as_bytes()),
            branch: &self.branch,
            sha,
        };

        let resp = self
            .authorized(self.http.put(self.contents_url(path)))
            .json(&body)
            .send()
            .await
            .map_err(|source| RepositoryError::Http {
                operation: "PUT",
                path: path.to_string(),
                source,
            })?;

        check_write(resp, "PUT", path).await
    }

    /// Delete a file at the given revision
    pub async fn delete_file(
        &self,
        path: &str,
        message: &str,
        sha: &str,
    ) -> Result<(), RepositoryError> {
        let body = DeleteBody {
            message,
            sha,
            branch: &self.branch,
        };

        let resp = self
            .authorized(self.http.delete(self.contents_url(path)))
            .json(&body)
            .send()
            .await
            .map_err(|source| RepositoryError::Http {
                operation: "DELETE",
                path: path.to_string(),
                source,
            })?;

        check_write(resp, "DELETE", path).await
    }

    /// Create or update a file, using the current revision handle if any.
    ///
    /// A concurrent change between the read and the write surfaces as
    /// [`RepositoryError::Conflict`]; there is no retry.
    pub async fn upsert(
        &self,
        path: &str,
        content: &str,
        message: &str,
    ) -> Result<UpsertOutcome, RepositoryError> {
        let existing = self.get_file(path).await?;
        let sha = existing.as_ref().map(|f| f.sha.as_str());
        self.put_file(path, content, message, sha).await?;

        let outcome = if existing.is_some() {
            UpsertOutcome::Updated
        } else {
            UpsertOutcome::Created
        };
        tracing::info!("{:?} {} on {}", outcome, path, self.branch);
        Ok(outcome)
    }

    /// Delete a file if it exists
    pub async fn remove(&self, path: &str, message: &str) -> Result<RemoveOutcome, RepositoryError> {
        let Some(existing) = self.get_file(path).await? else {
            tracing::debug!("{} not in repository, nothing to delete", path);
            return Ok(RemoveOutcome::Missing);
        };

        self.delete_file(path, message, &existing.sha).await?;
        tracing::info!("Deleted {} on {}", path, self.branch);
        Ok(RemoveOutcome::Deleted)
    }
}

async fn check_write(
    resp: reqwest::Response,
    operation: &'static str,
    path: &str,
) -> Result<(), RepositoryError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(());
    }

    let body = resp.text().await.unwrap_or_default();
    let path = path.to_string();
    let status_code = status.as_u16();
    if status == StatusCode::CONFLICT || status == StatusCode::UNPROCESSABLE_ENTITY {
        Err(RepositoryError::Conflict {
            operation,
            path,
            status: status_code,
            body,
        })
    } else {
        Err(RepositoryError::Status {
            operation,
            path,
            status: status_code,
            body,
        })
    }
}
