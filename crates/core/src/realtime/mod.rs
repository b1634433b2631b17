//! Agora realtime tokens for event channels.
//!
//! Each event is an Agora channel named after its ID. Participants receive an
//! RTC token (host or audience) to join the channel and an RTM token to log in
//! to signalling. Tokens use the AccessToken `006` format.

mod error;
mod service;
mod token;

pub use error::RealtimeError;
pub use service::{RealtimeConfig, RealtimeService, RealtimeToken};
pub use token::{AccessToken, Privilege, RtcRole, build_rtc_token, build_rtm_token};
