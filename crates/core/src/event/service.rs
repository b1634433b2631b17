//! Event service implementation.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use super::error::EventError;
use super::types::{
    CreateEventInput, Event, EventDetails, STREAM_SESSION_ID_MAX_LEN, TITLE_MAX_LEN,
    UpdateEventInput,
};
use crate::participant::{
    CreateParticipantInput, Participant, ParticipantError, ParticipantRepository,
    ParticipantService, ParticipantType,
};

/// Repository trait for event persistence.
///
/// Deleting an event must also delete its participants and attachments.
pub trait EventRepository: Send + Sync {
    /// Insert a new event.
    fn insert(
        &self,
        event: Event,
    ) -> impl std::future::Future<Output = Result<Event, EventError>> + Send;

    /// Persist changes to an existing event.
    fn update(
        &self,
        event: Event,
    ) -> impl std::future::Future<Output = Result<Event, EventError>> + Send;

    /// Find event by ID.
    fn find_by_id(
        &self,
        id: Uuid,
    ) -> impl std::future::Future<Output = Result<Option<Event>, EventError>> + Send;

    /// Find event by ID together with its participants and attachments.
    fn find_details(
        &self,
        id: Uuid,
    ) -> impl std::future::Future<Output = Result<Option<EventDetails>, EventError>> + Send;

    /// All events with participants and attachments.
    fn list_details(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<EventDetails>, EventError>> + Send;

    /// Delete event by ID, returning whether a row was removed.
    fn delete(&self, id: Uuid)
    -> impl std::future::Future<Output = Result<bool, EventError>> + Send;
}

/// Event service.
pub struct EventService<E: EventRepository, P: ParticipantRepository> {
    events: Arc<E>,
    participants: Arc<P>,
}

impl<E: EventRepository, P: ParticipantRepository> EventService<E, P> {
    /// Create a new event service.
    #[must_use]
    pub fn new(events: Arc<E>, participants: Arc<P>) -> Self {
        Self {
            events,
            participants,
        }
    }

    /// Create an event.
    ///
    /// # Errors
    ///
    /// Returns `EventError::Validation` if the title is blank or a field is too long.
    pub async fn create(&self, input: CreateEventInput) -> Result<Event, EventError> {
        validate_title(&input.title)?;
        if let Some(stream_session_id) = &input.stream_session_id {
            validate_stream_session_id(stream_session_id)?;
        }

        let event = Event::new(input, Utc::now());
        self.events.insert(event).await
    }

    /// Apply a partial update to an event.
    ///
    /// # Errors
    ///
    /// Returns `EventError::NotFound` for an unknown ID, or a validation error.
    pub async fn update(&self, id: Uuid, patch: UpdateEventInput) -> Result<Event, EventError> {
        if let Some(title) = &patch.title {
            validate_title(title)?;
        }
        if let Some(stream_session_id) = &patch.stream_session_id {
            validate_stream_session_id(stream_session_id)?;
        }

        let mut event = self
            .events
            .find_by_id(id)
            .await?
            .ok_or(EventError::NotFound(id))?;

        event.apply(patch, Utc::now());
        self.events.update(event).await
    }

    /// All events with nested participants and attachments.
    pub async fn list(&self) -> Result<Vec<EventDetails>, EventError> {
        self.events.list_details().await
    }

    /// One event with nested participants and attachments.
    ///
    /// # Errors
    ///
    /// Returns `EventError::NotFound` if the event does not exist.
    pub async fn get(&self, id: Uuid) -> Result<EventDetails, EventError> {
        self.events
            .find_details(id)
            .await?
            .ok_or(EventError::NotFound(id))
    }

    /// Delete an event and, through the store, its participants and attachments.
    ///
    /// # Errors
    ///
    /// Returns `EventError::NotFound` if nothing was deleted.
    pub async fn delete(&self, id: Uuid) -> Result<(), EventError> {
        if self.events.delete(id).await? {
            Ok(())
        } else {
            Err(EventError::NotFound(id))
        }
    }

    /// Register a user on an event with the given role.
    ///
    /// # Errors
    ///
    /// Returns `ParticipantError::EventNotFound` or `UserNotFound`.
    pub async fn add_participant(
        &self,
        event_id: Uuid,
        user_id: i32,
        participant_type: ParticipantType,
    ) -> Result<Participant, ParticipantError> {
        ParticipantService::new(self.participants.clone())
            .create(CreateParticipantInput {
                event_id,
                user_id,
                participant_type,
            })
            .await
    }

    /// Participants of one event.
    ///
    /// # Errors
    ///
    /// Returns `ParticipantError::EventNotFound` if the event does not exist.
    pub async fn list_participants(
        &self,
        event_id: Uuid,
    ) -> Result<Vec<Participant>, ParticipantError> {
        ParticipantService::new(self.participants.clone())
            .list_by_event(event_id)
            .await
    }
}

fn validate_title(title: &str) -> Result<(), EventError> {
    if title.trim().is_empty() {
        return Err(EventError::validation(
            "title",
            "This field may not be blank.",
        ));
    }
    if title.chars().count() > TITLE_MAX_LEN {
        return Err(EventError::validation(
            "title",
            format!("Ensure this field has no more than {TITLE_MAX_LEN} characters."),
        ));
    }
    Ok(())
}

fn validate_stream_session_id(value: &str) -> Result<(), EventError> {
    if value.chars().count() > STREAM_SESSION_ID_MAX_LEN {
        return Err(EventError::validation(
            "stream_session_id",
            format!("Ensure this field has no more than {STREAM_SESSION_ID_MAX_LEN} characters."),
        ));
    }
    Ok(())
}
