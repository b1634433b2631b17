//! JWT token generation and validation.
//!
//! Access and refresh tokens are both HS256 JWTs; the `token_type` claim
//! keeps one from being used in place of the other.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;

use crate::auth::{Claims, TokenType};
use crate::config::JwtConfig;

/// Errors that can occur during JWT operations.
#[derive(Debug, Error)]
pub enum JwtError {
    /// Token encoding failed.
    #[error("failed to encode token: {0}")]
    EncodingError(String),

    /// Token decoding failed.
    #[error("failed to decode token: {0}")]
    DecodingError(String),

    /// Token has expired.
    #[error("token has expired")]
    Expired,

    /// Token is well-formed but not usable here.
    #[error("invalid token")]
    Invalid,
}

/// JWT service for token operations.
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("access_token_expiry_secs", &self.config.access_token_expiry_secs)
            .field("refresh_token_expiry_secs", &self.config.refresh_token_expiry_secs)
            .field("keys", &"[hidden]")
            .finish()
    }
}

impl JwtService {
    /// Creates a new JWT service with the given configuration.
    #[must_use]
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Generates an access token for a user.
    pub fn generate_access_token(&self, user_id: i32, username: &str) -> Result<String, JwtError> {
        self.generate(
            user_id,
            username,
            TokenType::Access,
            self.config.access_token_expiry_secs,
        )
    }

    /// Generates a refresh token for a user.
    pub fn generate_refresh_token(&self, user_id: i32, username: &str) -> Result<String, JwtError> {
        self.generate(
            user_id,
            username,
            TokenType::Refresh,
            self.config.refresh_token_expiry_secs,
        )
    }

    fn generate(
        &self,
        user_id: i32,
        username: &str,
        token_type: TokenType,
        lifetime_secs: u64,
    ) -> Result<String, JwtError> {
        let lifetime = Duration::seconds(i64::try_from(lifetime_secs).unwrap_or(i64::MAX));
        let claims = Claims::new(user_id, username, token_type, Utc::now() + lifetime);

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingError(e.to_string()))
    }

    /// Validates a token and checks that it is of the expected type.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::Expired` if the token has expired, and
    /// `JwtError::Invalid` for a wrong token type or non-numeric subject.
    pub fn validate_token(&self, token: &str, expected: TokenType) -> Result<Claims, JwtError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
                _ => JwtError::DecodingError(e.to_string()),
            })?;

        if claims.token_type != expected || claims.user_id().is_none() {
            return Err(JwtError::Invalid);
        }

        Ok(claims)
    }
}
