//! Object storage for event attachments using Apache OpenDAL.
//!
//! Clients never stream bytes through the API. Instead the service hands out
//! presigned requests:
//! - upload: a presigned `PUT` for a freshly generated cloud key
//! - download: a presigned `GET` for an existing cloud key
//!
//! Supported backends are S3-compatible services (AWS S3, MinIO, R2) and the
//! local filesystem. The filesystem backend cannot presign and is only useful
//! for development setups without attachments.

mod config;
mod error;
mod service;

pub use config::{StorageConfig, StorageProvider};
pub use error::StorageError;
pub use service::{PresignedUrl, StorageService, UPLOAD_PREFIX, generate_storage_key};
