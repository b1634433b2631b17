//! Participant service implementation.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use super::error::ParticipantError;
use super::types::{CreateParticipantInput, Participant};

/// Repository trait for participant persistence.
pub trait ParticipantRepository: Send + Sync {
    /// Check if an event exists.
    fn event_exists(
        &self,
        event_id: Uuid,
    ) -> impl std::future::Future<Output = Result<bool, ParticipantError>> + Send;

    /// Check if a user exists.
    fn user_exists(
        &self,
        user_id: i32,
    ) -> impl std::future::Future<Output = Result<bool, ParticipantError>> + Send;

    /// Insert a participant row.
    fn insert(
        &self,
        participant: Participant,
    ) -> impl std::future::Future<Output = Result<Participant, ParticipantError>> + Send;

    /// Participants of an event, with user summaries.
    fn list_by_event(
        &self,
        event_id: Uuid,
    ) -> impl std::future::Future<Output = Result<Vec<Participant>, ParticipantError>> + Send;

    /// Rows a given user holds on an event.
    fn list_by_event_and_user(
        &self,
        event_id: Uuid,
        user_id: i32,
    ) -> impl std::future::Future<Output = Result<Vec<Participant>, ParticipantError>> + Send;

    /// Delete participant by ID, returning whether a row was removed.
    fn delete(
        &self,
        id: Uuid,
    ) -> impl std::future::Future<Output = Result<bool, ParticipantError>> + Send;
}

/// Participant service.
pub struct ParticipantService<R: ParticipantRepository> {
    repo: Arc<R>,
}

impl<R: ParticipantRepository> ParticipantService<R> {
    /// Create a new participant service.
    #[must_use]
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Add a user to an event.
    ///
    /// # Errors
    ///
    /// Returns `EventNotFound` or `UserNotFound` when a reference is dangling.
    pub async fn create(
        &self,
        input: CreateParticipantInput,
    ) -> Result<Participant, ParticipantError> {
        if !self.repo.event_exists(input.event_id).await? {
            return Err(ParticipantError::EventNotFound(input.event_id));
        }
        if !self.repo.user_exists(input.user_id).await? {
            return Err(ParticipantError::UserNotFound(input.user_id));
        }

        self.repo
            .insert(Participant::new(input, Utc::now()))
            .await
    }

    /// Remove a participant row.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the row does not exist.
    pub async fn delete(&self, id: Uuid) -> Result<(), ParticipantError> {
        if self.repo.delete(id).await? {
            Ok(())
        } else {
            Err(ParticipantError::NotFound(id))
        }
    }

    /// Participants of one event.
    ///
    /// # Errors
    ///
    /// Returns `EventNotFound` if the event does not exist.
    pub async fn list_by_event(&self, event_id: Uuid) -> Result<Vec<Participant>, ParticipantError> {
        if !self.repo.event_exists(event_id).await? {
            return Err(ParticipantError::EventNotFound(event_id));
        }
        self.repo.list_by_event(event_id).await
    }

    /// Rows the user holds on the event; empty if none.
    ///
    /// # Errors
    ///
    /// Returns `EventNotFound` if the event does not exist.
    pub async fn memberships(
        &self,
        event_id: Uuid,
        user_id: i32,
    ) -> Result<Vec<Participant>, ParticipantError> {
        if !self.repo.event_exists(event_id).await? {
            return Err(ParticipantError::EventNotFound(event_id));
        }
        self.repo.list_by_event_and_user(event_id, user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{CreateEventInput, EventService};
    use crate::participant::ParticipantType;
    use crate::testing::InMemoryStore;

    async fn seeded() -> (Arc<InMemoryStore>, Uuid) {
        let store = Arc::new(InMemoryStore::new());
        store.add_user(7, "ada");
        let event = EventService::new(store.clone(), store.clone())
            .create(CreateEventInput {
                title: "Standup".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        (store, event.id)
    }

    #[tokio::test]
    async fn test_create_defaults_to_active() {
        let (store, event_id) = seeded().await;
        let service = ParticipantService::new(store);

        let participant = service
            .create(CreateParticipantInput {
                event_id,
                user_id: 7,
                participant_type: ParticipantType::default(),
            })
            .await
            .unwrap();

        assert!(participant.active);
        assert_eq!(participant.participant_type, ParticipantType::Participant);
        assert_eq!(participant.created, participant.modified);
    }

    #[tokio::test]
    async fn test_create_unknown_event() {
        let (store, _) = seeded().await;
        let result = ParticipantService::new(store)
            .create(CreateParticipantInput {
                event_id: Uuid::now_v7(),
                user_id: 7,
                participant_type: ParticipantType::Host,
            })
            .await;

        assert!(matches!(result, Err(ParticipantError::EventNotFound(_))));
    }

    #[tokio::test]
    async fn test_same_user_may_join_twice() {
        let (store, event_id) = seeded().await;
        let service = ParticipantService::new(store);

        for participant_type in [ParticipantType::Participant, ParticipantType::Host] {
            service
                .create(CreateParticipantInput {
                    event_id,
                    user_id: 7,
                    participant_type,
                })
                .await
                .unwrap();
        }

        let rows = service.memberships(event_id, 7).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().any(Participant::is_host));
    }

    #[tokio::test]
    async fn test_delete_missing() {
        let (store, _) = seeded().await;
        let result = ParticipantService::new(store).delete(Uuid::now_v7()).await;
        assert!(matches!(result, Err(ParticipantError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_memberships_empty_for_stranger() {
        let (store, event_id) = seeded().await;
        let rows = ParticipantService::new(store)
            .memberships(event_id, 7)
            .await
            .unwrap();
        assert!(rows.is_empty());
    }
}
