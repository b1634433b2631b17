//! Realtime token issuance for event participants.

use std::sync::Arc;

use chrono::Utc;
use herkey_shared::config::AgoraConfig;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use super::error::RealtimeError;
use super::token::{RtcRole, build_rtc_token, build_rtm_token};
use crate::participant::{Participant, ParticipantRepository, ParticipantService};

/// Agora credentials and token lifetime.
#[derive(Clone)]
pub struct RealtimeConfig {
    /// Agora project app ID.
    pub app_id: String,
    /// Agora project certificate; signs every token.
    pub app_certificate: String,
    /// Seconds a granted privilege stays valid.
    pub token_expiry_secs: u32,
}

impl std::fmt::Debug for RealtimeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeConfig")
            .field("app_id", &self.app_id)
            .field("app_certificate", &"[hidden]")
            .field("token_expiry_secs", &self.token_expiry_secs)
            .finish()
    }
}

impl From<&AgoraConfig> for RealtimeConfig {
    fn from(config: &AgoraConfig) -> Self {
        Self {
            app_id: config.app_id.clone(),
            app_certificate: config.app_certificate.clone(),
            token_expiry_secs: config.token_expiry_secs,
        }
    }
}

/// Token handed to a client.
#[derive(Debug, Clone, Serialize)]
pub struct RealtimeToken {
    /// Encoded AccessToken.
    pub token: String,
    /// Channel name (the event ID).
    pub channel_name: String,
    /// Numeric uid the token is bound to.
    pub uid: u32,
    /// 1 for host, 2 for audience.
    pub role: RtcRole,
    /// Unix time the privileges expire.
    pub privilege_expire_time: u32,
}

/// Issues RTC and RTM tokens to participants of an event.
pub struct RealtimeService<P: ParticipantRepository> {
    config: Arc<RealtimeConfig>,
    participants: Arc<P>,
}

impl<P: ParticipantRepository> RealtimeService<P> {
    /// Create a new realtime service.
    #[must_use]
    pub fn new(config: Arc<RealtimeConfig>, participants: Arc<P>) -> Self {
        Self {
            config,
            participants,
        }
    }

    /// RTC token for the caller on the event's channel.
    ///
    /// # Errors
    ///
    /// Returns `EventNotFound`, or `NotParticipant` when the caller holds no
    /// participant row on the event.
    pub async fn issue_rtc_token(
        &self,
        event_id: Uuid,
        user_id: i32,
    ) -> Result<RealtimeToken, RealtimeError> {
        let grant = self.resolve(event_id, user_id).await?;
        let channel_name = event_id.to_string();

        let token = build_rtc_token(
            &self.config.app_id,
            &self.config.app_certificate,
            &channel_name,
            grant.uid,
            grant.role,
            grant.expire,
        )?;

        debug!(%event_id, user_id, role = grant.role.code(), "RTC token issued");
        Ok(grant.into_token(token, channel_name))
    }

    /// RTM login token for the caller, scoped by the same participation rules.
    ///
    /// # Errors
    ///
    /// Same as [`Self::issue_rtc_token`].
    pub async fn issue_rtm_token(
        &self,
        event_id: Uuid,
        user_id: i32,
    ) -> Result<RealtimeToken, RealtimeError> {
        let grant = self.resolve(event_id, user_id).await?;

        let token = build_rtm_token(
            &self.config.app_id,
            &self.config.app_certificate,
            &grant.uid.to_string(),
            grant.expire,
        )?;

        debug!(%event_id, user_id, "RTM token issued");
        Ok(grant.into_token(token, event_id.to_string()))
    }

    async fn resolve(&self, event_id: Uuid, user_id: i32) -> Result<Grant, RealtimeError> {
        let rows = ParticipantService::new(self.participants.clone())
            .memberships(event_id, user_id)
            .await?;

        if rows.is_empty() {
            return Err(RealtimeError::NotParticipant { event_id, user_id });
        }

        let role = if rows.iter().any(Participant::is_host) {
            RtcRole::Host
        } else {
            RtcRole::Audience
        };

        let now = u32::try_from(Utc::now().timestamp()).unwrap_or(u32::MAX);

        Ok(Grant {
            uid: u32::try_from(user_id).unwrap_or(0),
            role,
            expire: now.saturating_add(self.config.token_expiry_secs),
        })
    }
}

struct Grant {
    uid: u32,
    role: RtcRole,
    expire: u32,
}

impl Grant {
    fn into_token(self, token: String, channel_name: String) -> RealtimeToken {
        RealtimeToken {
            token,
            channel_name,
            uid: self.uid,
            role: self.role,
            privilege_expire_time: self.expire,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{CreateEventInput, EventService};
    use crate::participant::ParticipantType;
    use crate::realtime::token::tests::{APP_CERTIFICATE, APP_ID, decode};
    use crate::testing::InMemoryStore;

    fn config() -> Arc<RealtimeConfig> {
        Arc::new(RealtimeConfig {
            app_id: APP_ID.to_string(),
            app_certificate: APP_CERTIFICATE.to_string(),
            token_expiry_secs: 86_400,
        })
    }

    async fn event_with(members: &[(i32, ParticipantType)]) -> (Arc<InMemoryStore>, Uuid) {
        let store = Arc::new(InMemoryStore::new());
        let events = EventService::new(store.clone(), store.clone());
        let event = events
            .create(CreateEventInput {
                title: "Town hall".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        for (user_id, participant_type) in members {
            store.add_user(*user_id, &format!("user{user_id}"));
            events
                .add_participant(event.id, *user_id, *participant_type)
                .await
                .unwrap();
        }
        (store, event.id)
    }

    fn now() -> i64 {
        Utc::now().timestamp()
    }

    #[tokio::test]
    async fn test_host_gets_role_one() {
        let (store, event_id) = event_with(&[(5, ParticipantType::Host)]).await;
        let service = RealtimeService::new(config(), store);

        let before = now();
        let token = service.issue_rtc_token(event_id, 5).await.unwrap();

        assert_eq!(token.role, RtcRole::Host);
        assert_eq!(token.uid, 5);
        assert_eq!(token.channel_name, event_id.to_string());
        let expire = i64::from(token.privilege_expire_time);
        assert!(expire >= before + 86_400 && expire <= now() + 86_400);

        let decoded = decode(&token.token, APP_ID);
        assert_eq!(decoded.privileges.len(), 4);
        assert_eq!(
            decoded.crc_channel,
            crc32fast::hash(event_id.to_string().as_bytes())
        );
    }

    #[tokio::test]
    async fn test_participant_gets_audience() {
        let (store, event_id) = event_with(&[(6, ParticipantType::Participant)]).await;
        let token = RealtimeService::new(config(), store)
            .issue_rtc_token(event_id, 6)
            .await
            .unwrap();

        assert_eq!(token.role, RtcRole::Audience);
        assert_eq!(decode(&token.token, APP_ID).privileges.len(), 1);
    }

    #[tokio::test]
    async fn test_any_host_row_wins() {
        let (store, event_id) = event_with(&[
            (8, ParticipantType::Participant),
            (8, ParticipantType::Host),
        ])
        .await;
        let token = RealtimeService::new(config(), store)
            .issue_rtc_token(event_id, 8)
            .await
            .unwrap();

        assert_eq!(token.role, RtcRole::Host);
    }

    #[tokio::test]
    async fn test_non_participant_is_rejected() {
        let (store, event_id) = event_with(&[(5, ParticipantType::Host)]).await;
        store.add_user(9, "stranger");
        let result = RealtimeService::new(config(), store)
            .issue_rtc_token(event_id, 9)
            .await;

        assert!(matches!(
            result,
            Err(RealtimeError::NotParticipant { user_id: 9, .. })
        ));
    }

    #[tokio::test]
    async fn test_unknown_event() {
        let (store, _) = event_with(&[]).await;
        let result = RealtimeService::new(config(), store)
            .issue_rtc_token(Uuid::now_v7(), 5)
            .await;

        assert!(matches!(result, Err(RealtimeError::EventNotFound(_))));
    }

    #[tokio::test]
    async fn test_rtm_token_binds_account() {
        let (store, event_id) = event_with(&[(12, ParticipantType::Participant)]).await;
        let token = RealtimeService::new(config(), store)
            .issue_rtm_token(event_id, 12)
            .await
            .unwrap();

        let decoded = decode(&token.token, APP_ID);
        assert_eq!(decoded.crc_channel, crc32fast::hash(b"12"));
        assert_eq!(decoded.crc_uid, crc32fast::hash(b""));
        assert_eq!(decoded.privileges.keys().copied().collect::<Vec<_>>(), vec![1000]);
    }
}
