//! S3-compatible object store client
//!
//! Only the three calls the mirror needs: a metadata-only `HEAD`, `PUT`
//! with user metadata, and `DELETE`. Objects are addressed path-style as
//! `{endpoint}/{bucket}/{key}`.

use aws_sdk_s3::config::{
    BehaviorVersion, Credentials, Region, RequestChecksumCalculation, ResponseChecksumValidation,
};
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::operation::head_object::HeadObjectError;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use std::collections::HashMap;

use crate::config::{ConfigError, StorageConfig};

/// Errors from object store calls
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Transport failure or an unexpected status from the store.
    #[error("object store {operation} {key} failed: {message}")]
    Request {
        operation: &'static str,
        key: String,
        /// HTTP status, when the store answered at all
        status: Option<u16>,
        message: String,
    },
}

fn status_of<E>(err: &SdkError<E>) -> Option<u16> {
    err.raw_response().map(|resp| resp.status().as_u16())
}

fn request_error<E>(operation: &'static str, key: &str, err: SdkError<E>) -> StorageError
where
    E: std::error::Error + 'static,
{
    StorageError::Request {
        operation,
        key: key.to_string(),
        status: status_of(&err),
        message: DisplayErrorContext(&err).to_string(),
    }
}

/// User metadata of a stored object, keyed without the `x-amz-meta-` prefix
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectMetadata {
    metadata: HashMap<String, String>,
}

impl ObjectMetadata {
    fn from_map(metadata: Option<&HashMap<String, String>>) -> Self {
        let metadata = metadata
            .into_iter()
            .flatten()
            .map(|(name, value)| (name.to_ascii_lowercase(), value.clone()))
            .collect();
        Self { metadata }
    }

    /// A user metadata value, case-insensitively
    pub fn get(&self, name: &str) -> Option<&str> {
        self.metadata.get(&name.to_ascii_lowercase()).map(|s| s.as_str())
    }
}

/// Object store client bound to one bucket
#[derive(Debug, Clone)]
pub struct ObjectStore {
    client: Client,
    bucket: String,
}

impl ObjectStore {
    pub fn new(config: &StorageConfig) -> Result<Self, ConfigError> {
        if config.endpoint.is_empty() {
            return Err(ConfigError::Missing("R2_ENDPOINT"));
        }
        if config.bucket.is_empty() {
            return Err(ConfigError::Missing("R2_BUCKET"));
        }

        let endpoint = url::Url::parse(&config.endpoint).map_err(|e| ConfigError::Invalid {
            name: "R2_ENDPOINT",
            reason: e.to_string(),
        })?;
        if endpoint.host_str().is_none() {
            return Err(ConfigError::Invalid {
                name: "R2_ENDPOINT",
                reason: "endpoint has no host".to_string(),
            });
        }

        let credentials = Credentials::new(
            config.access_key_id.clone(),
            config.secret_access_key.clone(),
            None,
            None,
            "mirror-config",
        );

        // R2 rejects the streaming checksum trailers the SDK sends by default
        let s3_config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .endpoint_url(config.endpoint.trim_end_matches('/'))
            .credentials_provider(credentials)
            .force_path_style(true)
            .request_checksum_calculation(RequestChecksumCalculation::WhenRequired)
            .response_checksum_validation(ResponseChecksumValidation::WhenRequired)
            .build();

        Ok(Self {
            client: Client::from_conf(s3_config),
            bucket: config.bucket.clone(),
        })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Fetch an object's metadata. A missing object is `Ok(None)`.
    pub async fn head(&self, key: &str) -> Result<Option<ObjectMetadata>, StorageError> {
        let result = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await;

        match result {
            Ok(output) => Ok(Some(ObjectMetadata::from_map(output.metadata()))),
            Err(err)
                if status_of(&err) == Some(404)
                    || err
                        .as_service_error()
                        .is_some_and(HeadObjectError::is_not_found) =>
            {
                Ok(None)
            }
            Err(err) => Err(request_error("HEAD", key, err)),
        }
    }

    /// Store an object with a content type and user metadata
    pub async fn put(
        &self,
        key: &str,
        body: impl Into<Vec<u8>>,
        content_type: &str,
        metadata: &[(&str, &str)],
    ) -> Result<(), StorageError> {
        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body.into()))
            .content_type(content_type);
        for (name, value) in metadata {
            request = request.metadata(name.to_ascii_lowercase(), *value);
        }

        request
            .send()
            .await
            .map_err(|err| request_error("PUT", key, err))?;

        tracing::debug!("Stored s3://{}/{}", self.bucket, key);
        Ok(())
    }

    /// Delete an object. Deleting a missing object succeeds.
    pub async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let result = self
            .client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) if status_of(&err) == Some(404) => Ok(()),
            Err(err) => Err(request_error("DELETE", key, err)),
        }
    }
}
