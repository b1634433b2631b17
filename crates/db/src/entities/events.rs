//! `SeaORM` Entity for events table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{EventStatus, EventType};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "events")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub status: EventStatus,
    pub activate_date: Option<DateTimeWithTimeZone>,
    pub deactivate_date: Option<DateTimeWithTimeZone>,
    #[sea_orm(column_name = "type")]
    pub event_type: EventType,
    pub scheduled_date: Option<DateTimeWithTimeZone>,
    pub active: bool,
    pub stream_session_id: Option<String>,
    pub created: DateTimeWithTimeZone,
    pub modified: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::event_participants::Entity")]
    EventParticipants,
    #[sea_orm(has_many = "super::event_attachments::Entity")]
    EventAttachments,
}

impl Related<super::event_participants::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EventParticipants.def()
    }
}

impl Related<super::event_attachments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EventAttachments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
