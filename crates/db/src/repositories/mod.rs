//! Repository implementations of the `herkey-core` persistence traits.
//!
//! Repositories hide the `SeaORM` details from the rest of the application;
//! each one maps between entity models and domain types.

pub mod attachment;
pub mod event;
pub mod participant;
pub mod user;

pub use attachment::AttachmentRepository;
pub use event::EventRepository;
pub use participant::ParticipantRepository;
pub use user::UserRepository;
