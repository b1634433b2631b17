//! AccessToken `006` builder.
//!
//! Layout, all integers little-endian:
//!
//! ```text
//! token   = "006" || app_id || base64(content)
//! content = bytes(signature) || u32(crc32(channel)) || u32(crc32(uid)) || bytes(message)
//! message = u32(salt) || u32(ts) || u16(n) || n * (u16(privilege) || u32(expire))
//! signature = HMAC-SHA256(app_certificate, app_id || channel || uid || message)
//! bytes(x) = u16(len(x)) || x
//! ```

use std::collections::BTreeMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::Utc;
use hmac::{Hmac, Mac};
use rand::Rng;
use serde::{Serialize, Serializer};
use sha2::Sha256;

use super::error::RealtimeError;

/// Token format version prefix.
pub const VERSION: &str = "006";

/// Seconds a token message stays valid for the signalling server.
const MESSAGE_VALIDITY_SECS: i64 = 24 * 3600;

type HmacSha256 = Hmac<Sha256>;

/// Privileges that can be granted by a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u16)]
pub enum Privilege {
    /// Join an RTC channel.
    JoinChannel = 1,
    /// Publish an audio stream.
    PublishAudioStream = 2,
    /// Publish a video stream.
    PublishVideoStream = 3,
    /// Publish a data stream.
    PublishDataStream = 4,
    /// Log in to RTM signalling.
    RtmLogin = 1000,
}

/// Role inside an RTC channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RtcRole {
    /// May publish media.
    Host,
    /// Subscribe only.
    Audience,
}

impl RtcRole {
    /// Numeric role code (1 host, 2 audience).
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Self::Host => 1,
            Self::Audience => 2,
        }
    }

    fn privileges(self) -> &'static [Privilege] {
        match self {
            Self::Host => &[
                Privilege::JoinChannel,
                Privilege::PublishAudioStream,
                Privilege::PublishVideoStream,
                Privilege::PublishDataStream,
            ],
            Self::Audience => &[Privilege::JoinChannel],
        }
    }
}

impl Serialize for RtcRole {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

/// A token under construction.
#[derive(Clone)]
pub struct AccessToken<'a> {
    app_id: &'a str,
    app_certificate: &'a str,
    channel_name: &'a str,
    uid: String,
    salt: u32,
    ts: u32,
    privileges: BTreeMap<u16, u32>,
}

impl<'a> AccessToken<'a> {
    /// Start a token for `uid` on `channel_name`; uid `0` means any user.
    #[must_use]
    pub fn new(app_id: &'a str, app_certificate: &'a str, channel_name: &'a str, uid: u32) -> Self {
        let uid = if uid == 0 {
            String::new()
        } else {
            uid.to_string()
        };
        Self::with_account(app_id, app_certificate, channel_name, uid)
    }

    /// Start a token for a string account.
    #[must_use]
    pub fn with_account(
        app_id: &'a str,
        app_certificate: &'a str,
        channel_name: &'a str,
        account: impl Into<String>,
    ) -> Self {
        let ts = Utc::now().timestamp() + MESSAGE_VALIDITY_SECS;
        Self {
            app_id,
            app_certificate,
            channel_name,
            uid: account.into(),
            salt: rand::rng().random_range(1..=99_999_999),
            ts: u32::try_from(ts).unwrap_or(u32::MAX),
            privileges: BTreeMap::new(),
        }
    }

    /// Fix salt and message timestamp, for reproducible tokens.
    #[must_use]
    pub fn with_salt_and_ts(mut self, salt: u32, ts: u32) -> Self {
        self.salt = salt;
        self.ts = ts;
        self
    }

    /// Grant `privilege` until `expire_ts` (unix seconds, 0 = never).
    #[must_use]
    pub fn grant(mut self, privilege: Privilege, expire_ts: u32) -> Self {
        self.privileges.insert(privilege as u16, expire_ts);
        self
    }

    /// Sign and encode the token.
    ///
    /// # Errors
    ///
    /// Returns `RealtimeError::Signing` if the HMAC cannot be initialised.
    pub fn build(&self) -> Result<String, RealtimeError> {
        let message = self.pack_message();

        let mut mac = HmacSha256::new_from_slice(self.app_certificate.as_bytes())
            .map_err(|e| RealtimeError::Signing(e.to_string()))?;
        mac.update(self.app_id.as_bytes());
        mac.update(self.channel_name.as_bytes());
        mac.update(self.uid.as_bytes());
        mac.update(&message);
        let signature = mac.finalize().into_bytes();

        let mut content = Vec::with_capacity(signature.len() + message.len() + 12);
        pack_bytes(&mut content, &signature);
        content.extend_from_slice(&crc32fast::hash(self.channel_name.as_bytes()).to_le_bytes());
        content.extend_from_slice(&crc32fast::hash(self.uid.as_bytes()).to_le_bytes());
        pack_bytes(&mut content, &message);

        Ok(format!(
            "{VERSION}{}{}",
            self.app_id,
            STANDARD.encode(content)
        ))
    }

    fn pack_message(&self) -> Vec<u8> {
        let mut message = Vec::with_capacity(10 + self.privileges.len() * 6);
        message.extend_from_slice(&self.salt.to_le_bytes());
        message.extend_from_slice(&self.ts.to_le_bytes());
        // At most five privileges exist, so the count always fits.
        let count = u16::try_from(self.privileges.len()).unwrap_or(u16::MAX);
        message.extend_from_slice(&count.to_le_bytes());
        for (privilege, expire) in &self.privileges {
            message.extend_from_slice(&privilege.to_le_bytes());
            message.extend_from_slice(&expire.to_le_bytes());
        }
        message
    }
}

fn pack_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    let len = u16::try_from(bytes.len()).unwrap_or(u16::MAX);
    buf.extend_from_slice(&len.to_le_bytes());
    buf.extend_from_slice(bytes);
}

/// RTC token granting the privileges of `role` until `privilege_expire_ts`.
///
/// # Errors
///
/// Returns a validation error for an empty channel, or a configuration error
/// when the app credentials are missing.
pub fn build_rtc_token(
    app_id: &str,
    app_certificate: &str,
    channel_name: &str,
    uid: u32,
    role: RtcRole,
    privilege_expire_ts: u32,
) -> Result<String, RealtimeError> {
    check_inputs(app_id, app_certificate, channel_name)?;

    role.privileges()
        .iter()
        .fold(
            AccessToken::new(app_id, app_certificate, channel_name, uid),
            |token, privilege| token.grant(*privilege, privilege_expire_ts),
        )
        .build()
}

/// RTM login token for `user_account`.
///
/// # Errors
///
/// Returns a validation error for an empty account, or a configuration error
/// when the app credentials are missing.
pub fn build_rtm_token(
    app_id: &str,
    app_certificate: &str,
    user_account: &str,
    privilege_expire_ts: u32,
) -> Result<String, RealtimeError> {
    check_inputs(app_id, app_certificate, user_account)?;

    AccessToken::with_account(app_id, app_certificate, user_account, "")
        .grant(Privilege::RtmLogin, privilege_expire_ts)
        .build()
}

fn check_inputs(app_id: &str, app_certificate: &str, channel: &str) -> Result<(), RealtimeError> {
    if app_id.is_empty() || app_certificate.is_empty() {
        return Err(RealtimeError::Configuration(
            "agora.app_id and agora.app_certificate are required".to_string(),
        ));
    }
    if channel.is_empty() {
        return Err(RealtimeError::Validation(
            "channel name must not be empty".to_string(),
        ));
    }
    Ok(())
}


#[cfg(test)]
mod property_tests {
    use super::tests::{APP_CERTIFICATE, APP_ID, decode};
    use super::*;
    use proptest::prelude::*;

    proptest! {
        // The signature always verifies against the decoded message.
        #[test]
        fn prop_signature_verifies(
            channel in "[a-z0-9-]{1,64}",
            uid in 1u32..,
            salt in 1u32..99_999_999,
            ts in any::<u32>(),
            expire in any::<u32>(),
        ) {
            let token = AccessToken::new(APP_ID, APP_CERTIFICATE, &channel, uid)
                .with_salt_and_ts(salt, ts)
                .grant(Privilege::JoinChannel, expire)
                .build()
                .unwrap();
            let decoded = decode(&token, APP_ID);

            let mut message = Vec::new();
            message.extend_from_slice(&salt.to_le_bytes());
            message.extend_from_slice(&ts.to_le_bytes());
            message.extend_from_slice(&1u16.to_le_bytes());
            message.extend_from_slice(&1u16.to_le_bytes());
            message.extend_from_slice(&expire.to_le_bytes());

            let mut mac = HmacSha256::new_from_slice(APP_CERTIFICATE.as_bytes()).unwrap();
            mac.update(APP_ID.as_bytes());
            mac.update(channel.as_bytes());
            mac.update(uid.to_string().as_bytes());
            mac.update(&message);
            prop_assert!(mac.verify_slice(&decoded.signature).is_ok());
            prop_assert_eq!(decoded.salt, salt);
            prop_assert_eq!(decoded.ts, ts);
            prop_assert_eq!(decoded.crc_uid, crc32fast::hash(uid.to_string().as_bytes()));
        }
    }
}
