//! Event repository for database operations.
//!
//! Nested reads load participants (with their users) and attachments in two
//! extra queries per call, not per event.

use std::collections::HashMap;

use chrono::Utc;
use herkey_core::attachment::Attachment;
use herkey_core::event::{
    Event, EventDetails, EventError, EventRepository as EventRepoTrait, EventStatus, EventType,
};
use herkey_core::participant::Participant;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::debug;
use uuid::Uuid;

use super::{attachment, participant};
use crate::entities::{
    event_attachments, event_participants, events,
    sea_orm_active_enums::{EventStatus as DbEventStatus, EventType as DbEventType},
    users,
};

/// Event repository implementation.
#[derive(Debug, Clone)]
pub struct EventRepository {
    db: DatabaseConnection,
}

impl EventRepository {
    /// Create a new event repository.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Participants and attachments for the given events, grouped by event ID.
    async fn load_children(
        &self,
        event_ids: Vec<Uuid>,
    ) -> Result<HashMap<Uuid, (Vec<Participant>, Vec<Attachment>)>, EventError> {
        let mut children: HashMap<Uuid, (Vec<Participant>, Vec<Attachment>)> = HashMap::new();
        if event_ids.is_empty() {
            return Ok(children);
        }

        let participants = event_participants::Entity::find()
            .filter(event_participants::Column::EventId.is_in(event_ids.clone()))
            .order_by_asc(event_participants::Column::Created)
            .find_also_related(users::Entity)
            .all(&self.db)
            .await
            .map_err(|e| EventError::repository(e.to_string()))?;

        let attachments = event_attachments::Entity::find()
            .filter(event_attachments::Column::EventId.is_in(event_ids))
            .order_by_asc(event_attachments::Column::Created)
            .all(&self.db)
            .await
            .map_err(|e| EventError::repository(e.to_string()))?;

        for (model, user) in participants {
            children
                .entry(model.event_id)
                .or_default()
                .0
                .push(participant::to_domain(model, user));
        }
        for model in attachments {
            children
                .entry(model.event_id)
                .or_default()
                .1
                .push(attachment::to_domain(model));
        }

        Ok(children)
    }
}

impl EventRepoTrait for EventRepository {
    async fn insert(&self, event: Event) -> Result<Event, EventError> {
        let model = to_active_model(event)
            .insert(&self.db)
            .await
            .map_err(|e| EventError::repository(e.to_string()))?;

        Ok(to_domain(model))
    }

    async fn update(&self, event: Event) -> Result<Event, EventError> {
        let id = event.id;
        let model = to_active_model(event)
            .update(&self.db)
            .await
            .map_err(|e| match e {
                DbErr::RecordNotUpdated => EventError::NotFound(id),
                other => EventError::repository(other.to_string()),
            })?;

        Ok(to_domain(model))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Event>, EventError> {
        let model = events::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| EventError::repository(e.to_string()))?;

        Ok(model.map(to_domain))
    }

    async fn find_details(&self, id: Uuid) -> Result<Option<EventDetails>, EventError> {
        let Some(event) = self.find_by_id(id).await? else {
            return Ok(None);
        };

        let mut children = self.load_children(vec![id]).await?;
        let (participants, attachments) = children.remove(&id).unwrap_or_default();

        Ok(Some(EventDetails {
            event,
            participants,
            attachments,
        }))
    }

    async fn list_details(&self) -> Result<Vec<EventDetails>, EventError> {
        let models = events::Entity::find()
            .order_by_asc(events::Column::Created)
            .all(&self.db)
            .await
            .map_err(|e| EventError::repository(e.to_string()))?;

        let mut children = self
            .load_children(models.iter().map(|m| m.id).collect())
            .await?;

        Ok(models
            .into_iter()
            .map(|model| {
                let (participants, attachments) = children.remove(&model.id).unwrap_or_default();
                EventDetails {
                    event: to_domain(model),
                    participants,
                    attachments,
                }
            })
            .collect())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, EventError> {
        // Participants and attachments go with it via ON DELETE CASCADE
        let result = events::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| EventError::repository(e.to_string()))?;

        debug!(event_id = %id, rows = result.rows_affected, "Deleted event");
        Ok(result.rows_affected > 0)
    }
}

fn to_active_model(event: Event) -> events::ActiveModel {
    events::ActiveModel {
        id: Set(event.id),
        title: Set(event.title),
        description: Set(event.description),
        status: Set(to_db_status(event.status)),
        activate_date: Set(event.activate_date.map(Into::into)),
        deactivate_date: Set(event.deactivate_date.map(Into::into)),
        event_type: Set(to_db_event_type(event.event_type)),
        scheduled_date: Set(event.scheduled_date.map(Into::into)),
        active: Set(event.active),
        stream_session_id: Set(event.stream_session_id),
        created: Set(event.created.into()),
        modified: Set(event.modified.into()),
    }
}

fn to_db_status(status: EventStatus) -> DbEventStatus {
    match status {
        EventStatus::Active => DbEventStatus::Active,
        EventStatus::Inactive => DbEventStatus::Inactive,
    }
}

fn from_db_status(status: DbEventStatus) -> EventStatus {
    match status {
        DbEventStatus::Active => EventStatus::Active,
        DbEventStatus::Inactive => EventStatus::Inactive,
    }
}

fn to_db_event_type(t: EventType) -> DbEventType {
    match t {
        EventType::Scheduled => DbEventType::Scheduled,
        EventType::Live => DbEventType::Live,
        EventType::Completed => DbEventType::Completed,
    }
}

fn from_db_event_type(t: DbEventType) -> EventType {
    match t {
        DbEventType::Scheduled => EventType::Scheduled,
        DbEventType::Live => EventType::Live,
        DbEventType::Completed => EventType::Completed,
    }
}

/// Convert database model to domain model.
fn to_domain(model: events::Model) -> Event {
    Event {
        id: model.id,
        title: model.title,
        description: model.description,
        status: from_db_status(model.status),
        activate_date: model.activate_date.map(|d| d.with_timezone(&Utc)),
        deactivate_date: model.deactivate_date.map(|d| d.with_timezone(&Utc)),
        event_type: from_db_event_type(model.event_type),
        scheduled_date: model.scheduled_date.map(|d| d.with_timezone(&Utc)),
        active: model.active,
        stream_session_id: model.stream_session_id,
        created: model.created.with_timezone(&Utc),
        modified: model.modified.with_timezone(&Utc),
    }
}
