//! Event types and data structures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::attachment::Attachment;
use crate::participant::Participant;

/// Maximum title length in characters.
pub const TITLE_MAX_LEN: usize = 255;
/// Maximum stream session ID length in characters.
pub const STREAM_SESSION_ID_MAX_LEN: usize = 100;

/// Where an event is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    /// Announced for a future date.
    #[default]
    Scheduled,
    /// Currently streaming.
    Live,
    /// Finished.
    Completed,
}

impl EventType {
    /// Wire/database string value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "SCHEDULED",
            Self::Live => "LIVE",
            Self::Completed => "COMPLETED",
        }
    }

    /// Parse from the wire/database string value.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "SCHEDULED" => Some(Self::Scheduled),
            "LIVE" => Some(Self::Live),
            "COMPLETED" => Some(Self::Completed),
            _ => None,
        }
    }
}

/// Activation status of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    /// Visible and joinable.
    #[default]
    Active,
    /// Switched off.
    Inactive,
}

impl EventStatus {
    /// Wire/database string value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Inactive => "INACTIVE",
        }
    }

    /// Parse from the wire/database string value.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ACTIVE" => Some(Self::Active),
            "INACTIVE" => Some(Self::Inactive),
            _ => None,
        }
    }
}

/// Event domain model.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Unique identifier (UUID v7).
    pub id: Uuid,
    /// Title.
    pub title: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Activation status.
    pub status: EventStatus,
    /// When the event was last activated.
    pub activate_date: Option<DateTime<Utc>>,
    /// When the event was last deactivated.
    pub deactivate_date: Option<DateTime<Utc>>,
    /// Lifecycle type.
    pub event_type: EventType,
    /// Planned start.
    pub scheduled_date: Option<DateTime<Utc>>,
    /// Active flag.
    pub active: bool,
    /// External streaming session name.
    pub stream_session_id: Option<String>,
    /// Creation timestamp.
    pub created: DateTime<Utc>,
    /// Last modification timestamp.
    pub modified: DateTime<Utc>,
}

impl Event {
    /// Builds a new event with a fresh ID; all timestamps share `now`.
    #[must_use]
    pub fn new(input: CreateEventInput, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::now_v7(),
            title: input.title,
            description: input.description,
            status: EventStatus::Active,
            activate_date: Some(now),
            deactivate_date: None,
            event_type: input.event_type,
            scheduled_date: input.scheduled_date,
            active: input.active,
            stream_session_id: input.stream_session_id,
            created: now,
            modified: now,
        }
    }

    /// Applies the provided fields and bumps `modified`.
    pub fn apply(&mut self, patch: UpdateEventInput, now: DateTime<Utc>) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = Some(description);
        }
        if let Some(event_type) = patch.event_type {
            self.event_type = event_type;
        }
        if let Some(scheduled_date) = patch.scheduled_date {
            self.scheduled_date = Some(scheduled_date);
        }
        if let Some(active) = patch.active {
            self.active = active;
        }
        if let Some(stream_session_id) = patch.stream_session_id {
            self.stream_session_id = Some(stream_session_id);
        }
        if let Some(status) = patch.status {
            if status != self.status {
                match status {
                    EventStatus::Active => self.activate_date = Some(now),
                    EventStatus::Inactive => self.deactivate_date = Some(now),
                }
                self.status = status;
            }
        }
        self.modified = now;
    }
}

/// Input for creating an event.
#[derive(Debug, Clone, Default)]
pub struct CreateEventInput {
    /// Title (required, non-blank).
    pub title: String,
    /// Description.
    pub description: Option<String>,
    /// Lifecycle type.
    pub event_type: EventType,
    /// Planned start.
    pub scheduled_date: Option<DateTime<Utc>>,
    /// External streaming session name.
    pub stream_session_id: Option<String>,
    /// Active flag.
    pub active: bool,
}

/// Partial update; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateEventInput {
    /// New title.
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New lifecycle type.
    pub event_type: Option<EventType>,
    /// New planned start.
    pub scheduled_date: Option<DateTime<Utc>>,
    /// New active flag.
    pub active: Option<bool>,
    /// New streaming session name.
    pub stream_session_id: Option<String>,
    /// New activation status.
    pub status: Option<EventStatus>,
}

/// An event with its participants and attachments.
#[derive(Debug, Clone)]
pub struct EventDetails {
    /// The event itself.
    pub event: Event,
    /// Participants, each with a user summary when available.
    pub participants: Vec<Participant>,
    /// Attachments.
    pub attachments: Vec<Attachment>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_event_type_parse() {
        assert_eq!(EventType::parse("SCHEDULED"), Some(EventType::Scheduled));
        assert_eq!(EventType::parse("LIVE"), Some(EventType::Live));
        assert_eq!(EventType::parse("COMPLETED"), Some(EventType::Completed));
        assert_eq!(EventType::parse("scheduled"), None);
        assert_eq!(EventType::Live.as_str(), "LIVE");
    }

    #[test]
    fn test_new_event_defaults() {
        let now = Utc::now();
        let event = Event::new(
            CreateEventInput {
                title: "Webinar".to_string(),
                active: true,
                ..Default::default()
            },
            now,
        );

        assert_eq!(event.status, EventStatus::Active);
        assert_eq!(event.event_type, EventType::Scheduled);
        assert_eq!(event.created, now);
        assert_eq!(event.modified, now);
        assert_eq!(event.activate_date, Some(now));
        assert!(event.deactivate_date.is_none());
    }

    #[test]
    fn test_apply_only_touches_given_fields() {
        let created = Utc::now();
        let mut event = Event::new(
            CreateEventInput {
                title: "Webinar".to_string(),
                description: Some("intro".to_string()),
                active: true,
                ..Default::default()
            },
            created,
        );

        let later = created + Duration::minutes(5);
        event.apply(
            UpdateEventInput {
                event_type: Some(EventType::Live),
                ..Default::default()
            },
            later,
        );

        assert_eq!(event.title, "Webinar");
        assert_eq!(event.description.as_deref(), Some("intro"));
        assert_eq!(event.event_type, EventType::Live);
        assert_eq!(event.created, created);
        assert_eq!(event.modified, later);
    }

    #[test]
    fn test_deactivation_stamps_date() {
        let created = Utc::now();
        let mut event = Event::new(
            CreateEventInput {
                title: "Webinar".to_string(),
                ..Default::default()
            },
            created,
        );

        let later = created + Duration::hours(1);
        event.apply(
            UpdateEventInput {
                status: Some(EventStatus::Inactive),
                ..Default::default()
            },
            later,
        );

        assert_eq!(event.status, EventStatus::Inactive);
        assert_eq!(event.deactivate_date, Some(later));
        assert_eq!(event.activate_date, Some(created));
    }
}
