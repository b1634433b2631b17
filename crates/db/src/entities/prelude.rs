//! `SeaORM` entity prelude.

pub use super::event_attachments::Entity as EventAttachments;
pub use super::event_participants::Entity as EventParticipants;
pub use super::events::Entity as Events;
pub use super::users::Entity as Users;
