//! Account types.

use chrono::{DateTime, Utc};
use herkey_shared::auth::UserInfo;

/// A stored user account.
#[derive(Debug, Clone, PartialEq)]
pub struct UserAccount {
    /// Sequential ID; doubles as the realtime uid.
    pub id: i32,
    /// Unique login name.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Argon2id PHC string.
    pub password_hash: String,
    /// Inactive accounts cannot log in.
    pub is_active: bool,
    /// Registration time.
    pub date_joined: DateTime<Utc>,
}

impl UserAccount {
    /// Public summary without credentials.
    #[must_use]
    pub fn info(&self) -> UserInfo {
        UserInfo {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
        }
    }
}

/// Registration request with a plaintext password.
#[derive(Debug, Clone, Default)]
pub struct CreateUserInput {
    /// Unique login name.
    pub username: String,
    /// Plaintext password; hashed before storage.
    pub password: String,
    /// Email address.
    pub email: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
}

/// Changes to a user's profile; `None` leaves a field as it is.
#[derive(Debug, Clone, Default)]
pub struct UpdateUserInput {
    /// New login name.
    pub username: Option<String>,
    /// New email address.
    pub email: Option<String>,
    /// New given name.
    pub first_name: Option<String>,
    /// New family name.
    pub last_name: Option<String>,
}

impl UserAccount {
    /// Apply a profile update. Credentials and status are not touched.
    pub fn apply(&mut self, patch: UpdateUserInput) {
        if let Some(username) = patch.username {
            self.username = username;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(first_name) = patch.first_name {
            self.first_name = first_name;
        }
        if let Some(last_name) = patch.last_name {
            self.last_name = last_name;
        }
    }
}

/// A user ready to be inserted; the store assigns the ID.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Unique login name.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Argon2id PHC string.
    pub password_hash: String,
    /// Active flag.
    pub is_active: bool,
    /// Registration time.
    pub date_joined: DateTime<Utc>,
}
