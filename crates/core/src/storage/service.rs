//! Storage service implementation using Apache OpenDAL.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use opendal::{Operator, services};
use serde::Serialize;
use uuid::Uuid;

use super::config::{StorageConfig, StorageProvider};
use super::error::StorageError;

/// Folder every uploaded attachment lands in.
pub const UPLOAD_PREFIX: &str = "event_attachments";

/// Presigned request for upload or download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PresignedUrl {
    /// The presigned URL.
    pub url: String,
    /// HTTP method to use (PUT for upload, GET for download).
    pub method: String,
    /// Headers the client must send along.
    pub headers: HashMap<String, String>,
    /// When the URL expires.
    pub expires_at: DateTime<Utc>,
}

/// Storage service for attachments.
pub struct StorageService {
    operator: Operator,
    config: StorageConfig,
}

impl StorageService {
    /// Create a new storage service from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage provider cannot be initialized.
    pub fn from_config(config: StorageConfig) -> Result<Self, StorageError> {
        let operator = Self::create_operator(&config.provider)?;
        Ok(Self { operator, config })
    }

    fn create_operator(provider: &StorageProvider) -> Result<Operator, StorageError> {
        let operator = match provider {
            StorageProvider::S3 {
                endpoint,
                bucket,
                access_key_id,
                secret_access_key,
                region,
            } => {
                let mut builder = services::S3::default()
                    .bucket(bucket)
                    .access_key_id(access_key_id)
                    .secret_access_key(secret_access_key)
                    .region(region);
                if let Some(endpoint) = endpoint {
                    builder = builder.endpoint(endpoint);
                }
                Operator::new(builder).map(|b| b.finish())
            }
            StorageProvider::LocalFs { root } => {
                let root = root
                    .to_str()
                    .ok_or_else(|| StorageError::configuration("invalid path"))?;
                Operator::new(services::Fs::default().root(root)).map(|b| b.finish())
            }
        };

        operator.map_err(|e| StorageError::configuration(e.to_string()))
    }

    /// Presigned `PUT` for uploading an object under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if presigning is not supported or fails.
    pub async fn presign_upload(&self, key: &str) -> Result<PresignedUrl, StorageError> {
        let ttl = self.config.presign_upload_ttl_secs;
        let presigned = self
            .operator
            .presign_write(key, Duration::from_secs(ttl))
            .await?;

        Ok(to_presigned_url(&presigned, ttl))
    }

    /// Presigned `GET` for downloading the object under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if presigning is not supported or fails.
    pub async fn presign_download(&self, key: &str) -> Result<PresignedUrl, StorageError> {
        let ttl = self.config.presign_download_ttl_secs;
        let presigned = self
            .operator
            .presign_read(key, Duration::from_secs(ttl))
            .await?;

        Ok(to_presigned_url(&presigned, ttl))
    }

    /// Get the storage provider name.
    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        self.config.provider.name()
    }
}

fn to_presigned_url(presigned: &opendal::raw::PresignedRequest, ttl_secs: u64) -> PresignedUrl {
    let headers = presigned
        .header()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();

    PresignedUrl {
        url: presigned.uri().to_string(),
        method: presigned.method().to_string(),
        headers,
        expires_at: Utc::now()
            + chrono::Duration::seconds(i64::try_from(ttl_secs).unwrap_or(i64::MAX)),
    }
}

/// Cloud key for a new upload of `file_name`.
///
/// Format: `event_attachments/{stem}_{uuid v4}`, where the stem is the part
/// before the first `.`. Returns `None` when the stem is empty.
#[must_use]
pub fn generate_storage_key(file_name: &str) -> Option<String> {
    let stem = file_name.split('.').next().unwrap_or_default().trim();
    if stem.is_empty() {
        return None;
    }

    Some(format!(
        "{UPLOAD_PREFIX}/{}_{}",
        sanitize_filename(stem),
        Uuid::new_v4()
    ))
}

/// Only ASCII alphanumerics, dots, hyphens and underscores survive.
fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        // Every generated key sits under the upload prefix and uses only safe characters.
        #[test]
        fn prop_storage_key_is_safe(file_name in ".*") {
            if let Some(key) = generate_storage_key(&file_name) {
                let rest = key.strip_prefix("event_attachments/");
                prop_assert!(rest.is_some());
                for c in rest.unwrap_or_default().chars() {
                    let is_safe = c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_';
                    prop_assert!(is_safe, "Unexpected character in key: {}", c);
                }
            }
        }

        // The suffix after the last underscore is always a v4 UUID.
        #[test]
        fn prop_storage_key_suffix_is_uuid(stem in "[a-zA-Z0-9 _-]{1,40}", ext in "[a-z]{2,4}") {
            prop_assume!(!stem.trim().is_empty());
            let key = generate_storage_key(&format!("{stem}.{ext}")).unwrap();
            let (_, suffix) = key.rsplit_once('_').unwrap();
            let uuid = Uuid::parse_str(suffix).unwrap();
            prop_assert_eq!(uuid.get_version_num(), 4);
        }
    }
}
