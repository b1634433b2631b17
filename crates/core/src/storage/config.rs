//! Storage configuration types.

use std::path::PathBuf;

use herkey_shared::config::{StorageBackend, StorageSettings};

use super::error::StorageError;

/// Storage provider configuration.
#[derive(Clone)]
pub enum StorageProvider {
    /// S3-compatible storage: AWS S3, MinIO, Cloudflare R2.
    S3 {
        /// Custom endpoint; AWS is used when absent.
        endpoint: Option<String>,
        /// Bucket name.
        bucket: String,
        /// Access key ID.
        access_key_id: String,
        /// Secret access key.
        secret_access_key: String,
        /// Region.
        region: String,
    },
    /// Local filesystem (development only).
    LocalFs {
        /// Root directory path.
        root: PathBuf,
    },
}

impl std::fmt::Debug for StorageProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::S3 {
                endpoint,
                bucket,
                region,
                ..
            } => f
                .debug_struct("S3")
                .field("endpoint", endpoint)
                .field("bucket", bucket)
                .field("region", region)
                .finish_non_exhaustive(),
            Self::LocalFs { root } => f.debug_struct("LocalFs").field("root", root).finish(),
        }
    }
}

impl StorageProvider {
    /// Create an S3-compatible provider.
    #[must_use]
    pub fn s3(
        endpoint: Option<String>,
        bucket: impl Into<String>,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self::S3 {
            endpoint,
            bucket: bucket.into(),
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            region: region.into(),
        }
    }

    /// Create a local filesystem provider.
    #[must_use]
    pub fn local_fs(root: impl Into<PathBuf>) -> Self {
        Self::LocalFs { root: root.into() }
    }

    /// Short provider name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::S3 { .. } => "s3",
            Self::LocalFs { .. } => "local",
        }
    }
}

/// Storage service configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Storage provider configuration.
    pub provider: StorageProvider,
    /// Presigned upload lifetime in seconds.
    pub presign_upload_ttl_secs: u64,
    /// Presigned download lifetime in seconds.
    pub presign_download_ttl_secs: u64,
}

impl StorageConfig {
    /// Default upload TTL: 1 hour.
    pub const DEFAULT_UPLOAD_TTL: u64 = 3600;
    /// Default download TTL: 2 hours.
    pub const DEFAULT_DOWNLOAD_TTL: u64 = 7200;

    /// Create a new storage config with default lifetimes.
    #[must_use]
    pub fn new(provider: StorageProvider) -> Self {
        Self {
            provider,
            presign_upload_ttl_secs: Self::DEFAULT_UPLOAD_TTL,
            presign_download_ttl_secs: Self::DEFAULT_DOWNLOAD_TTL,
        }
    }

    /// Build from the `[storage]` section of the application config.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Configuration` if a required setting is missing.
    pub fn from_settings(settings: &StorageSettings) -> Result<Self, StorageError> {
        let provider = match settings.backend {
            StorageBackend::S3 => {
                if settings.bucket.is_empty() {
                    return Err(StorageError::configuration("storage.bucket is required"));
                }
                StorageProvider::s3(
                    settings.endpoint.clone(),
                    &settings.bucket,
                    &settings.access_key_id,
                    &settings.secret_access_key,
                    &settings.region,
                )
            }
            StorageBackend::Fs => {
                let root = settings
                    .root
                    .as_deref()
                    .ok_or_else(|| StorageError::configuration("storage.root is required"))?;
                StorageProvider::local_fs(root)
            }
        };

        Ok(Self::new(provider)
            .with_upload_ttl(settings.upload_ttl_secs)
            .with_download_ttl(settings.download_ttl_secs))
    }

    /// Set presigned upload URL TTL.
    #[must_use]
    pub fn with_upload_ttl(mut self, secs: u64) -> Self {
        self.presign_upload_ttl_secs = secs;
        self
    }

    /// Set presigned download URL TTL.
    #[must_use]
    pub fn with_download_ttl(mut self, secs: u64) -> Self {
        self.presign_download_ttl_secs = secs;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(backend: StorageBackend) -> StorageSettings {
        StorageSettings {
            backend,
            bucket: "herkey-media".to_string(),
            region: "eu-west-1".to_string(),
            endpoint: None,
            access_key_id: "AKIA".to_string(),
            secret_access_key: "secret".to_string(),
            root: None,
            upload_ttl_secs: 600,
            download_ttl_secs: 1200,
        }
    }

    #[test]
    fn test_defaults() {
        let config = StorageConfig::new(StorageProvider::local_fs("./storage"));
        assert_eq!(config.presign_upload_ttl_secs, 3600);
        assert_eq!(config.presign_download_ttl_secs, 7200);
        assert_eq!(config.provider.name(), "local");
    }

    #[test]
    fn test_from_s3_settings() {
        let config = StorageConfig::from_settings(&settings(StorageBackend::S3)).unwrap();
        assert_eq!(config.provider.name(), "s3");
        assert_eq!(config.presign_upload_ttl_secs, 600);
        assert_eq!(config.presign_download_ttl_secs, 1200);
        assert!(!format!("{:?}", config.provider).contains("secret"));
    }

    #[test]
    fn test_fs_settings_need_root() {
        let result = StorageConfig::from_settings(&settings(StorageBackend::Fs));
        assert!(matches!(result, Err(StorageError::Configuration(_))));
    }

    #[test]
    fn test_s3_settings_need_bucket() {
        let mut s3 = settings(StorageBackend::S3);
        s3.bucket.clear();
        assert!(StorageConfig::from_settings(&s3).is_err());
    }
}
