//! Headless CMS read client
//!
//! Reads blog posts from a microCMS-style content API: a single item by
//! identifier, or a page of items with `limit`/`offset`, ordering and
//! equality filters.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::{CmsConfig, ConfigError};
use crate::content::Post;
use crate::helpers::{encode_segment, join_url};

/// Largest page the CMS hands out in one request
pub const BATCH_LIMIT: u32 = 100;

const API_KEY_HEADER: &str = "X-MICROCMS-API-KEY";

/// Errors from CMS calls
#[derive(Debug, thiserror::Error)]
pub enum CmsError {
    /// HTTP transport error.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },
    /// The requested item does not exist (or is no longer published).
    #[error("content {0} not found")]
    NotFound(String),
    /// The CMS returned a non-2xx status.
    #[error("CMS {endpoint} returned {status}: {body}")]
    Api {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// Response deserialization failed.
    #[error("failed to deserialize response from {endpoint}: {source}")]
    Deserialization {
        endpoint: String,
        source: reqwest::Error,
    },
}

/// Equality filter, rendered as `field[equals]value`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub field: String,
    pub value: String,
}

impl Filter {
    pub fn equals(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[equals]{}", self.field, self.value)
    }
}

/// List request parameters
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    /// Sort order, e.g. `-publishedAt`
    pub orders: Option<String>,
    pub filters: Vec<Filter>,
}

impl ListQuery {
    /// Query string pairs, in a stable order
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(offset) = self.offset {
            pairs.push(("offset", offset.to_string()));
        }
        if let Some(orders) = &self.orders {
            pairs.push(("orders", orders.clone()));
        }
        if !self.filters.is_empty() {
            let joined = self
                .filters
                .iter()
                .map(Filter::to_string)
                .collect::<Vec<_>>()
                .join("[and]");
            pairs.push(("filters", joined));
        }
        pairs
    }
}

/// One page of posts
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PostList {
    pub contents: Vec<Post>,
    pub total_count: u32,
    pub offset: u32,
    pub limit: u32,
}


/// CMS read client
#[derive(Debug, Clone)]
pub struct CmsClient {
    http: reqwest::Client,
    api_root: String,
    api_key: String,
    endpoint: String,
}

impl CmsClient {
    /// Create a client sharing the given HTTP connection pool
    pub fn new(http: reqwest::Client, config: &CmsConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            http,
            api_root: config.api_root()?,
            api_key: config.api_key.clone(),
            endpoint: config.endpoint.clone(),
        })
    }

    fn collection_url(&self) -> String {
        join_url(&self.api_root, &encode_segment(&self.endpoint))
    }

    /// Fetch one post; a missing post is [`CmsError::NotFound`]
    pub async fn get(&self, id: &str) -> Result<Post, CmsError> {
        let url = join_url(&self.collection_url(), &encode_segment(id));
        let endpoint = format!("{}/{}", self.endpoint, id);

        let resp = self
            .http
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|source| CmsError::Http {
                endpoint: endpoint.clone(),
                source,
            })?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CmsError::NotFound(id.to_string()));
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(CmsError::Api {
                endpoint,
                status: status.as_u16(),
                body,
            });
        }

        let mut post: Post = resp
            .json()
            .await
            .map_err(|source| CmsError::Deserialization { endpoint, source })?;
        if post.id.is_empty() {
            post.id = id.to_string();
        }
        tracing::debug!("Fetched post {} from CMS", id);
        Ok(post)
    }

    /// Fetch one post, mapping absence to `None`
    pub async fn find(&self, id: &str) -> Result<Option<Post>, CmsError> {
        match self.get(id).await {
            Ok(post) => Ok(Some(post)),
            Err(CmsError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Fetch one page of posts
    pub async fn list(&self, query: &ListQuery) -> Result<PostList, CmsError> {
        let url = self.collection_url();
        let endpoint = self.endpoint.clone();

        let resp = self
            .http
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .query(&query.to_pairs())
            .send()
            .await
            .map_err(|source| CmsError::Http {
                endpoint: endpoint.clone(),
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(CmsError::Api {
                endpoint,
                status: status.as_u16(),
                body,
            });
        }

        resp.json()
            .await
            .map_err(|source| CmsError::Deserialization { endpoint, source })
    }

    /// Fetch every post matching the filters, in batches of [`BATCH_LIMIT`]
    pub async fn list_all(&self, filters: &[Filter]) -> Result<Vec<Post>, CmsError> {
        let mut posts = Vec::new();
        let mut offset = 0;

        loop {
            let query = ListQuery {
                limit: Some(BATCH_LIMIT),
                offset: Some(offset),
                orders: None,
                filters: filters.to_vec(),
            };
            let page = self.list(&query).await?;
            let fetched = page.contents.len();
            posts.extend(page.contents);

            offset += BATCH_LIMIT;
            if fetched == 0 || offset >= page.total_count {
                break;
            }
        }

        tracing::debug!("Fetched {} posts from CMS", posts.len());
        Ok(posts)
    }
}
