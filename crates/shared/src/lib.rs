//! Shared errors, configuration, and authentication primitives for Herkey.
//!
//! This crate provides common types used across all other crates:
//! - Application-wide error types
//! - Configuration management
//! - JWT issuing and validation
//! - Authentication request/response payloads

pub mod auth;
pub mod config;
pub mod error;
pub mod jwt;


pub use auth::{Claims, TokenType};
pub use config::AppConfig;
pub use error::AppError;
pub use jwt::{JwtError, JwtService};
