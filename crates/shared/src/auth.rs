//! Authentication types for JWT and tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Distinguishes short-lived access tokens from refresh tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    /// Sent as `Authorization: Bearer` on API calls.
    Access,
    /// Exchanged for a new access token.
    Refresh,
}

/// JWT claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user's numeric ID, as a string per RFC 7519.
    pub sub: String,
    /// Username at issue time.
    pub username: String,
    /// Access or refresh.
    pub token_type: TokenType,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates new claims for a user.
    #[must_use]
    pub fn new(
        user_id: i32,
        username: &str,
        token_type: TokenType,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            sub: user_id.to_string(),
            username: username.to_string(),
            token_type,
            iat: Utc::now().timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the user ID, or `None` if the subject is not numeric.
    #[must_use]
    pub fn user_id(&self) -> Option<i32> {
        self.sub.parse().ok()
    }
}

/// Token obtain request (`POST /token`).
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    /// Username.
    #[validate(length(min = 1, message = "This field may not be blank."))]
    pub username: String,
    /// Password.
    #[validate(length(min = 1, message = "This field may not be blank."))]
    pub password: String,
}

/// User info returned in auth responses and nested in participants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    /// User ID.
    pub id: i32,
    /// Username.
    pub username: String,
    /// Email address.
    pub email: String,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
}

/// Token obtain response.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    /// Access token.
    pub access: String,
    /// Refresh token.
    pub refresh: String,
    /// Authenticated user.
    pub user: UserInfo,
}

/// Token refresh request (`POST /token/refresh`).
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RefreshRequest {
    /// The refresh token.
    #[validate(length(min = 1, message = "This field may not be blank."))]
    pub refresh: String,
}

/// Token refresh response.
#[derive(Debug, Clone, Serialize)]
pub struct RefreshResponse {
    /// New access token.
    pub access: String,
}
