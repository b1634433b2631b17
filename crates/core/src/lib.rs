//! Domain services for Herkey.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Persistence is reached through repository traits implemented by `herkey-db`.
//!
//! # Modules
//!
//! - `event` - Event lifecycle and nested reads
//! - `participant` - Event membership and roles
//! - `attachment` - Attachment records, upload targets, download URLs
//! - `storage` - Presigned object-storage URLs via OpenDAL
//! - `realtime` - Agora RTC/RTM token issuance
//! - `auth` - Accounts, credentials, and password hashing

pub mod attachment;
pub mod auth;
pub mod event;
pub mod participant;
pub mod realtime;
pub mod storage;

#[cfg(test)]
mod testing;
