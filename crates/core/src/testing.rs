//! In-memory store shared by the service tests.
//!
//! Mirrors the database rules the services rely on: cascading deletes from
//! events and users, one banner per event, unique usernames.

use std::collections::BTreeMap;
use std::sync::Mutex;

use chrono::Utc;
use uuid::Uuid;

use crate::attachment::{Attachment, AttachmentError, AttachmentRepository, AttachmentType};
use crate::auth::{AuthError, NewUser, UserAccount, UserRepository};
use crate::event::{Event, EventDetails, EventError, EventRepository};
use crate::participant::{Participant, ParticipantError, ParticipantRepository};

#[derive(Default)]
struct State {
    users: BTreeMap<i32, UserAccount>,
    events: BTreeMap<Uuid, Event>,
    participants: Vec<Participant>,
    attachments: Vec<Attachment>,
}

impl State {
    fn participants_of(&self, event_id: Uuid) -> Vec<Participant> {
        self.participants
            .iter()
            .filter(|p| p.event_id == event_id)
            .map(|p| Participant {
                user: self.users.get(&p.user_id).map(UserAccount::info),
                ..p.clone()
            })
            .collect()
    }

    fn details(&self, event: &Event) -> EventDetails {
        EventDetails {
            event: event.clone(),
            participants: self.participants_of(event.id),
            attachments: self
                .attachments
                .iter()
                .filter(|a| a.event_id == event.id)
                .cloned()
                .collect(),
        }
    }
}

/// Repository fake backed by a mutex-guarded map.
#[derive(Default)]
pub(crate) struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Seed a user with a fixed ID and an unusable password hash.
    pub(crate) fn add_user(&self, id: i32, username: &str) {
        self.state.lock().unwrap().users.insert(
            id,
            UserAccount {
                id,
                username: username.to_string(),
                email: format!("{username}@herkey.test"),
                first_name: String::new(),
                last_name: String::new(),
                password_hash: String::new(),
                is_active: true,
                date_joined: Utc::now(),
            },
        );
    }

    pub(crate) fn deactivate_user(&self, id: i32) {
        if let Some(user) = self.state.lock().unwrap().users.get_mut(&id) {
            user.is_active = false;
        }
    }
}

impl EventRepository for InMemoryStore {
    async fn insert(&self, event: Event) -> Result<Event, EventError> {
        self.state
            .lock()
            .unwrap()
            .events
            .insert(event.id, event.clone());
        Ok(event)
    }

    async fn update(&self, event: Event) -> Result<Event, EventError> {
        let mut state = self.state.lock().unwrap();
        match state.events.get_mut(&event.id) {
            Some(stored) => {
                *stored = event.clone();
                Ok(event)
            }
            None => Err(EventError::NotFound(event.id)),
        }
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Event>, EventError> {
        Ok(self.state.lock().unwrap().events.get(&id).cloned())
    }

    async fn find_details(&self, id: Uuid) -> Result<Option<EventDetails>, EventError> {
        let state = self.state.lock().unwrap();
        Ok(state.events.get(&id).map(|e| state.details(e)))
    }

    async fn list_details(&self) -> Result<Vec<EventDetails>, EventError> {
        let state = self.state.lock().unwrap();
        Ok(state.events.values().map(|e| state.details(e)).collect())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, EventError> {
        let mut state = self.state.lock().unwrap();
        if state.events.remove(&id).is_none() {
            return Ok(false);
        }
        state.participants.retain(|p| p.event_id != id);
        state.attachments.retain(|a| a.event_id != id);
        Ok(true)
    }
}

impl ParticipantRepository for InMemoryStore {
    async fn event_exists(&self, event_id: Uuid) -> Result<bool, ParticipantError> {
        Ok(self.state.lock().unwrap().events.contains_key(&event_id))
    }

    async fn user_exists(&self, user_id: i32) -> Result<bool, ParticipantError> {
        Ok(self.state.lock().unwrap().users.contains_key(&user_id))
    }

    async fn insert(&self, participant: Participant) -> Result<Participant, ParticipantError> {
        self.state
            .lock()
            .unwrap()
            .participants
            .push(participant.clone());
        Ok(participant)
    }

    async fn list_by_event(&self, event_id: Uuid) -> Result<Vec<Participant>, ParticipantError> {
        Ok(self.state.lock().unwrap().participants_of(event_id))
    }

    async fn list_by_event_and_user(
        &self,
        event_id: Uuid,
        user_id: i32,
    ) -> Result<Vec<Participant>, ParticipantError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .participants_of(event_id)
            .into_iter()
            .filter(|p| p.user_id == user_id)
            .collect())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ParticipantError> {
        let mut state = self.state.lock().unwrap();
        let before = state.participants.len();
        state.participants.retain(|p| p.id != id);
        Ok(state.participants.len() < before)
    }
}

impl AttachmentRepository for InMemoryStore {
    async fn event_exists(&self, event_id: Uuid) -> Result<bool, AttachmentError> {
        Ok(self.state.lock().unwrap().events.contains_key(&event_id))
    }

    async fn banner_exists(&self, event_id: Uuid) -> Result<bool, AttachmentError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .attachments
            .iter()
            .any(|a| a.event_id == event_id && a.attachment_type == AttachmentType::Banner))
    }

    async fn insert(&self, attachment: Attachment) -> Result<Attachment, AttachmentError> {
        let mut state = self.state.lock().unwrap();
        let duplicate_banner = attachment.attachment_type == AttachmentType::Banner
            && state.attachments.iter().any(|a| {
                a.event_id == attachment.event_id && a.attachment_type == AttachmentType::Banner
            });
        if duplicate_banner {
            return Err(AttachmentError::BannerExists(attachment.event_id));
        }
        state.attachments.push(attachment.clone());
        Ok(attachment)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AttachmentError> {
        let mut state = self.state.lock().unwrap();
        let before = state.attachments.len();
        state.attachments.retain(|a| a.id != id);
        Ok(state.attachments.len() < before)
    }
}

impl UserRepository for InMemoryStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserAccount>, AuthError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_user(&self, id: i32) -> Result<Option<UserAccount>, AuthError> {
        Ok(self.state.lock().unwrap().users.get(&id).cloned())
    }

    async fn list_users(&self) -> Result<Vec<UserAccount>, AuthError> {
        Ok(self.state.lock().unwrap().users.values().cloned().collect())
    }

    async fn insert_user(&self, user: NewUser) -> Result<UserAccount, AuthError> {
        let mut state = self.state.lock().unwrap();
        if state.users.values().any(|u| u.username == user.username) {
            return Err(AuthError::UsernameTaken(user.username));
        }
        let id = state.users.keys().next_back().map_or(1, |last| last + 1);
        let account = UserAccount {
            id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            password_hash: user.password_hash,
            is_active: user.is_active,
            date_joined: user.date_joined,
        };
        state.users.insert(id, account.clone());
        Ok(account)
    }

    async fn update_user(&self, user: UserAccount) -> Result<UserAccount, AuthError> {
        let mut state = self.state.lock().unwrap();
        if state
            .users
            .values()
            .any(|u| u.id != user.id && u.username == user.username)
        {
            return Err(AuthError::UsernameTaken(user.username));
        }
        match state.users.get_mut(&user.id) {
            Some(stored) => {
                *stored = user.clone();
                Ok(user)
            }
            None => Err(AuthError::UserNotFound(user.id)),
        }
    }

    async fn delete_user(&self, id: i32) -> Result<bool, AuthError> {
        let mut state = self.state.lock().unwrap();
        let removed = state.users.remove(&id).is_some();
        state.participants.retain(|p| p.user_id != id);
        Ok(removed)
    }
}

#[cfg(test)]
mod scenario_tests {
    use std::sync::Arc;

    use super::*;
    use crate::attachment::{AttachmentService, CreateAttachmentInput};
    use crate::event::{CreateEventInput, EventService, EventType};
    use crate::participant::ParticipantType;
    use crate::realtime::{RealtimeConfig, RealtimeService, RtcRole};
    use crate::storage::{StorageConfig, StorageProvider, StorageService};

    #[tokio::test]
    async fn test_host_uploads_single_banner() {
        let store = Arc::new(InMemoryStore::new());
        store.add_user(1, "host");

        let storage = StorageService::from_config(StorageConfig::new(StorageProvider::s3(
            Some("http://127.0.0.1:9000".to_string()),
            "herkey-media",
            "minio",
            "minio-secret",
            "us-east-1",
        )))
        .unwrap();
        let events = EventService::new(store.clone(), store.clone());
        let attachments = AttachmentService::new(store.clone(), Some(Arc::new(storage)));

        let event = events
            .create(CreateEventInput {
                title: "Launch".to_string(),
                event_type: EventType::Live,
                active: true,
                ..Default::default()
            })
            .await
            .unwrap();
        events
            .add_participant(event.id, 1, ParticipantType::Host)
            .await
            .unwrap();

        let target = attachments.request_upload_target("logo.png").await.unwrap();
        assert!(target.cloud_id.starts_with("event_attachments/logo_"));

        let banner = |cloud_id: &str| CreateAttachmentInput {
            event_id: event.id,
            attachment_cloud_id: Some(cloud_id.to_string()),
            attachment_name: Some("logo.png".to_string()),
            attachment_type: AttachmentType::Banner,
        };
        attachments.create(banner(&target.cloud_id)).await.unwrap();
        let second = attachments.create(banner(&target.cloud_id)).await;
        assert!(matches!(second, Err(AttachmentError::BannerExists(_))));

        let token = RealtimeService::new(
            Arc::new(RealtimeConfig {
                app_id: "970CA35de60c44645bbae8a215061b33".to_string(),
                app_certificate: "5CFd2fd1755d40ecb72977518be15d3b".to_string(),
                token_expiry_secs: 3600,
            }),
            store.clone(),
        )
        .issue_rtc_token(event.id, 1)
        .await
        .unwrap();
        assert_eq!(token.role, RtcRole::Host);

        let details = events.get(event.id).await.unwrap();
        assert_eq!(details.attachments.len(), 1);
        assert_eq!(details.participants.len(), 1);
    }

    #[tokio::test]
    async fn test_store_rejects_racing_banner() {
        let store = InMemoryStore::new();
        let event_id = Uuid::now_v7();
        let banner = || {
            Attachment::new(
                CreateAttachmentInput {
                    event_id,
                    attachment_cloud_id: None,
                    attachment_name: None,
                    attachment_type: AttachmentType::Banner,
                },
                Utc::now(),
            )
        };

        AttachmentRepository::insert(&store, banner()).await.unwrap();
        let result = AttachmentRepository::insert(&store, banner()).await;
        assert!(matches!(result, Err(AttachmentError::BannerExists(_))));
    }
}
