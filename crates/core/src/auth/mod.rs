//! Accounts, credentials and password hashing.
//!
//! This module provides:
//! - Password hashing with Argon2id
//! - Credential checks for token issuance
//! - User registration, lookup, profile updates and removal

mod error;
mod password;
mod service;
mod types;

pub use error::AuthError;
pub use password::{PasswordError, hash_password, verify_password};
pub use service::{AuthService, UserRepository};
pub use types::{CreateUserInput, NewUser, UpdateUserInput, UserAccount};
