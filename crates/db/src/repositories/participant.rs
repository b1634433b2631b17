//! Participant repository for database operations.

use chrono::Utc;
use herkey_core::participant::{
    Participant, ParticipantError, ParticipantRepository as ParticipantRepoTrait, ParticipantType,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use super::user::to_info;
use crate::entities::{
    event_participants, events, sea_orm_active_enums::ParticipantType as DbParticipantType, users,
};

/// Participant repository implementation.
#[derive(Debug, Clone)]
pub struct ParticipantRepository {
    db: DatabaseConnection,
}

impl ParticipantRepository {
    /// Create a new participant repository.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl ParticipantRepoTrait for ParticipantRepository {
    async fn event_exists(&self, event_id: Uuid) -> Result<bool, ParticipantError> {
        let count = events::Entity::find_by_id(event_id)
            .count(&self.db)
            .await
            .map_err(|e| ParticipantError::repository(e.to_string()))?;

        Ok(count > 0)
    }

    async fn user_exists(&self, user_id: i32) -> Result<bool, ParticipantError> {
        let count = users::Entity::find_by_id(user_id)
            .count(&self.db)
            .await
            .map_err(|e| ParticipantError::repository(e.to_string()))?;

        Ok(count > 0)
    }

    async fn insert(&self, participant: Participant) -> Result<Participant, ParticipantError> {
        let active_model = event_participants::ActiveModel {
            id: Set(participant.id),
            event_id: Set(participant.event_id),
            user_id: Set(participant.user_id),
            active: Set(participant.active),
            participant_type: Set(to_db_participant_type(participant.participant_type)),
            created: Set(participant.created.into()),
            modified: Set(participant.modified.into()),
        };

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(|e| ParticipantError::repository(e.to_string()))?;

        Ok(to_domain(model, None))
    }

    async fn list_by_event(&self, event_id: Uuid) -> Result<Vec<Participant>, ParticipantError> {
        let rows = event_participants::Entity::find()
            .filter(event_participants::Column::EventId.eq(event_id))
            .order_by_asc(event_participants::Column::Created)
            .find_also_related(users::Entity)
            .all(&self.db)
            .await
            .map_err(|e| ParticipantError::repository(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|(participant, user)| to_domain(participant, user))
            .collect())
    }

    async fn list_by_event_and_user(
        &self,
        event_id: Uuid,
        user_id: i32,
    ) -> Result<Vec<Participant>, ParticipantError> {
        let models = event_participants::Entity::find()
            .filter(event_participants::Column::EventId.eq(event_id))
            .filter(event_participants::Column::UserId.eq(user_id))
            .all(&self.db)
            .await
            .map_err(|e| ParticipantError::repository(e.to_string()))?;

        Ok(models.into_iter().map(|m| to_domain(m, None)).collect())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ParticipantError> {
        let result = event_participants::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| ParticipantError::repository(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }
}

/// Convert domain participant type to database enum.
fn to_db_participant_type(t: ParticipantType) -> DbParticipantType {
    match t {
        ParticipantType::Host => DbParticipantType::Host,
        ParticipantType::Participant => DbParticipantType::Participant,
    }
}

/// Convert database participant type to domain enum.
fn from_db_participant_type(t: DbParticipantType) -> ParticipantType {
    match t {
        DbParticipantType::Host => ParticipantType::Host,
        DbParticipantType::Participant => ParticipantType::Participant,
    }
}

/// Convert a participant row, with its user if loaded, to the domain model.
pub(crate) fn to_domain(
    model: event_participants::Model,
    user: Option<users::Model>,
) -> Participant {
    Participant {
        id: model.id,
        event_id: model.event_id,
        user_id: model.user_id,
        user: user.map(to_info),
        active: model.active,
        participant_type: from_db_participant_type(model.participant_type),
        created: model.created.with_timezone(&Utc),
        modified: model.modified.with_timezone(&Utc),
    }
}
