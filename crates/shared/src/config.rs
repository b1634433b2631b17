//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// JWT configuration.
    pub jwt: JwtConfig,
    /// Agora realtime credentials.
    pub agora: AgoraConfig,
    /// Object storage for event attachments. Absent means storage is disabled.
    #[serde(default)]
    pub storage: Option<StorageSettings>,
    /// Log output configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// JWT configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    /// Secret key for signing tokens.
    pub secret: String,
    /// Access token lifetime in seconds.
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_secs: u64,
    /// Refresh token lifetime in seconds.
    #[serde(default = "default_refresh_token_expiry")]
    pub refresh_token_expiry_secs: u64,
}

fn default_access_token_expiry() -> u64 {
    300 // 5 minutes
}

fn default_refresh_token_expiry() -> u64 {
    86400 // 1 day
}

/// Agora project credentials used to sign RTC/RTM tokens.
#[derive(Clone, Deserialize)]
pub struct AgoraConfig {
    /// Agora project app ID.
    pub app_id: String,
    /// Agora project app certificate (signing key).
    pub app_certificate: String,
    /// Privilege lifetime of issued tokens in seconds.
    #[serde(default = "default_agora_token_expiry")]
    pub token_expiry_secs: u32,
}

impl std::fmt::Debug for AgoraConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgoraConfig")
            .field("app_id", &self.app_id)
            .field("app_certificate", &"[hidden]")
            .field("token_expiry_secs", &self.token_expiry_secs)
            .finish()
    }
}

fn default_agora_token_expiry() -> u32 {
    86400
}

/// Storage backend selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// S3-compatible object storage.
    S3,
    /// Local filesystem (development only, cannot presign).
    Fs,
}

/// Object storage settings.
#[derive(Clone, Deserialize)]
pub struct StorageSettings {
    /// Which backend to use.
    pub backend: StorageBackend,
    /// Bucket name (S3).
    #[serde(default)]
    pub bucket: String,
    /// Region (S3).
    #[serde(default = "default_region")]
    pub region: String,
    /// Custom endpoint, e.g. for R2 or MinIO (S3).
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Access key ID (S3).
    #[serde(default)]
    pub access_key_id: String,
    /// Secret access key (S3).
    #[serde(default)]
    pub secret_access_key: String,
    /// Root directory (Fs).
    #[serde(default)]
    pub root: Option<String>,
    /// Presigned upload lifetime in seconds.
    #[serde(default = "default_upload_ttl")]
    pub upload_ttl_secs: u64,
    /// Presigned download lifetime in seconds.
    #[serde(default = "default_download_ttl")]
    pub download_ttl_secs: u64,
}

impl std::fmt::Debug for StorageSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageSettings")
            .field("backend", &self.backend)
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("secret_access_key", &"[hidden]")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_upload_ttl() -> u64 {
    3600
}

fn default_download_ttl() -> u64 {
    7200
}

/// Log output configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Sources, later ones winning: `config/default`, `config/{RUN_MODE}`,
    /// then `HERKEY__SECTION__KEY` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("HERKEY").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
