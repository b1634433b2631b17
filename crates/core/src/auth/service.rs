//! Account service implementation.

use std::sync::Arc;

use chrono::Utc;
use tracing::warn;

use super::error::AuthError;
use super::password::{hash_password, verify_password};
use super::types::{CreateUserInput, NewUser, UpdateUserInput, UserAccount};

/// Minimum password length accepted at registration.
const MIN_PASSWORD_LEN: usize = 8;

/// Repository trait for user persistence.
pub trait UserRepository: Send + Sync {
    /// Find user by username.
    fn find_by_username(
        &self,
        username: &str,
    ) -> impl std::future::Future<Output = Result<Option<UserAccount>, AuthError>> + Send;

    /// Find user by ID.
    fn find_user(
        &self,
        id: i32,
    ) -> impl std::future::Future<Output = Result<Option<UserAccount>, AuthError>> + Send;

    /// All users ordered by ID.
    fn list_users(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<UserAccount>, AuthError>> + Send;

    /// Insert a user, assigning the next ID.
    ///
    /// A duplicate username must surface as `AuthError::UsernameTaken`.
    fn insert_user(
        &self,
        user: NewUser,
    ) -> impl std::future::Future<Output = Result<UserAccount, AuthError>> + Send;

    /// Persist profile changes to an existing user.
    ///
    /// A username clash must surface as `AuthError::UsernameTaken`.
    fn update_user(
        &self,
        user: UserAccount,
    ) -> impl std::future::Future<Output = Result<UserAccount, AuthError>> + Send;

    /// Delete user by ID, returning whether a row was removed.
    ///
    /// The user's participant rows go with it.
    fn delete_user(
        &self,
        id: i32,
    ) -> impl std::future::Future<Output = Result<bool, AuthError>> + Send;
}

/// Account service.
pub struct AuthService<R: UserRepository> {
    repo: Arc<R>,
}

impl<R: UserRepository> AuthService<R> {
    /// Create a new account service.
    #[must_use]
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Check a username/password pair.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCredentials` for an unknown user, a wrong password, or
    /// an inactive account.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<UserAccount, AuthError> {
        let user = self
            .repo
            .find_by_username(username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !user.is_active {
            return Err(AuthError::InvalidCredentials);
        }

        match verify_password(password, &user.password_hash) {
            Ok(true) => Ok(user),
            Ok(false) => Err(AuthError::InvalidCredentials),
            Err(e) => {
                warn!(user_id = user.id, error = %e, "Stored password hash is unusable");
                Err(AuthError::InvalidCredentials)
            }
        }
    }

    /// Register a new active user.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank username or short password, or
    /// `UsernameTaken` if the name is in use.
    pub async fn register(&self, input: CreateUserInput) -> Result<UserAccount, AuthError> {
        let username = input.username.trim();
        if username.is_empty() {
            return Err(AuthError::validation(
                "username",
                "This field may not be blank.",
            ));
        }
        if input.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::validation(
                "password",
                format!("Ensure this field has at least {MIN_PASSWORD_LEN} characters."),
            ));
        }
        if self.repo.find_by_username(username).await?.is_some() {
            return Err(AuthError::UsernameTaken(username.to_string()));
        }

        let password_hash = hash_password(&input.password)?;
        self.repo
            .insert_user(NewUser {
                username: username.to_string(),
                email: input.email,
                first_name: input.first_name,
                last_name: input.last_name,
                password_hash,
                is_active: true,
                date_joined: Utc::now(),
            })
            .await
    }

    /// One user.
    ///
    /// # Errors
    ///
    /// Returns `UserNotFound` if the ID is unknown.
    pub async fn get(&self, id: i32) -> Result<UserAccount, AuthError> {
        self.repo
            .find_user(id)
            .await?
            .ok_or(AuthError::UserNotFound(id))
    }

    /// All users.
    pub async fn list(&self) -> Result<Vec<UserAccount>, AuthError> {
        self.repo.list_users().await
    }

    /// Change a user's profile fields.
    ///
    /// # Errors
    ///
    /// Returns `UserNotFound` for an unknown ID, a validation error for a
    /// blank username, or `UsernameTaken` if another user holds the new name.
    pub async fn update(
        &self,
        id: i32,
        mut patch: UpdateUserInput,
    ) -> Result<UserAccount, AuthError> {
        if let Some(username) = patch.username.as_mut() {
            let trimmed = username.trim();
            if trimmed.is_empty() {
                return Err(AuthError::validation(
                    "username",
                    "This field may not be blank.",
                ));
            }
            *username = trimmed.to_string();
        }

        let mut user = self.get(id).await?;

        if let Some(username) = patch.username.as_deref()
            && username != user.username
            && self.repo.find_by_username(username).await?.is_some()
        {
            return Err(AuthError::UsernameTaken(username.to_string()));
        }

        user.apply(patch);
        self.repo.update_user(user).await
    }

    /// Remove a user along with their participant rows.
    ///
    /// # Errors
    ///
    /// Returns `UserNotFound` if nothing was deleted.
    pub async fn delete(&self, id: i32) -> Result<(), AuthError> {
        if self.repo.delete_user(id).await? {
            Ok(())
        } else {
            Err(AuthError::UserNotFound(id))
        }
    }
}
