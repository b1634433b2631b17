//! Participant types.

use chrono::{DateTime, Utc};
use herkey_shared::auth::UserInfo;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role a user plays in an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParticipantType {
    /// Presents and may publish media.
    Host,
    /// Watches.
    #[default]
    Participant,
}

impl ParticipantType {
    /// Wire/database string value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Host => "HOST",
            Self::Participant => "PARTICIPANT",
        }
    }

    /// Parse from the wire/database string value.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "HOST" => Some(Self::Host),
            "PARTICIPANT" => Some(Self::Participant),
            _ => None,
        }
    }
}

/// A user's membership in an event.
#[derive(Debug, Clone, PartialEq)]
pub struct Participant {
    /// Unique identifier (UUID v7).
    pub id: Uuid,
    /// Owning event.
    pub event_id: Uuid,
    /// Member user.
    pub user_id: i32,
    /// User summary, filled on nested reads.
    pub user: Option<UserInfo>,
    /// Active flag.
    pub active: bool,
    /// Role.
    pub participant_type: ParticipantType,
    /// Creation timestamp.
    pub created: DateTime<Utc>,
    /// Last modification timestamp.
    pub modified: DateTime<Utc>,
}

impl Participant {
    /// Builds a new active membership.
    #[must_use]
    pub fn new(input: CreateParticipantInput, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::now_v7(),
            event_id: input.event_id,
            user_id: input.user_id,
            user: None,
            active: true,
            participant_type: input.participant_type,
            created: now,
            modified: now,
        }
    }

    /// Whether this row grants the host role.
    #[must_use]
    pub fn is_host(&self) -> bool {
        self.participant_type == ParticipantType::Host
    }
}

/// Input for adding a participant.
#[derive(Debug, Clone)]
pub struct CreateParticipantInput {
    /// Event to join.
    pub event_id: Uuid,
    /// Joining user.
    pub user_id: i32,
    /// Role.
    pub participant_type: ParticipantType,
}
