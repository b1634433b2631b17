//! Events: schedulable or live sessions that own participants and attachments.
//!
//! This module provides:
//! - Event creation with generated IDs and system-managed timestamps
//! - Partial updates with activation bookkeeping
//! - Nested reads (event + participants + attachments)
//! - Cascading deletes through the repository

mod error;
mod service;
mod types;

pub use error::EventError;
pub use service::{EventRepository, EventService};
pub use types::{
    CreateEventInput, Event, EventDetails, EventStatus, EventType, STREAM_SESSION_ID_MAX_LEN,
    TITLE_MAX_LEN, UpdateEventInput,
};
