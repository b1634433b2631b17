//! `SeaORM` entities.

pub mod prelude;

pub mod event_attachments;
pub mod event_participants;
pub mod events;
pub mod sea_orm_active_enums;
pub mod users;
