//! Event participants and their roles.

mod error;
mod service;
mod types;

pub use error::ParticipantError;
pub use service::{ParticipantRepository, ParticipantService};
pub use types::{CreateParticipantInput, Participant, ParticipantType};
