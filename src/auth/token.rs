//! The session token stored in the encrypted auth cookie.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, auth::UserID};

mod expiry_format {
    //! Serializes expiry times with a fixed width hour.
    //!
    //! `OffsetDateTime`'s `Display` prints midnight as "0:00:00.0", which the
    //! matching parser then rejects.
    use serde::{Deserialize, Deserializer, Serializer};
    use time::{
        OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description,
    };

    /// e.g. "2024-01-15 00:00:00.0 +09:00:00".
    const EXPIRY_FORMAT: &[BorrowedFormatItem] = format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond] [offset_hour \
             sign:mandatory]:[offset_minute]:[offset_second]"
    );

    pub fn serialize<S>(expires_at: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let formatted = expires_at
            .format(EXPIRY_FORMAT)
            .map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&formatted)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        OffsetDateTime::parse(&text, EXPIRY_FORMAT).map_err(serde::de::Error::custom)
    }
}

/// Identifies a logged in user until `expires_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// The user the session belongs to.
    pub user_id: UserID,
    /// When the session ends.
    #[serde(with = "expiry_format")]
    pub expires_at: OffsetDateTime,
}

impl Token {
    /// Whether the session has ended as of `now`.
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        self.expires_at <= now
    }

    /// Encode the token as the cookie value.
    ///
    /// # Errors
    ///
    /// Returns [Error::CookieError] if the expiry cannot be formatted.
    pub fn encode(&self) -> Result<String, Error> {
        serde_json::to_string(self).map_err(|error| Error::CookieError(error.to_string()))
    }

    /// Decode a cookie value created by [Token::encode].
    ///
    /// # Errors
    ///
    /// Returns [Error::Unauthorized] if `value` is not a token.
    pub fn decode(value: &str) -> Result<Self, Error> {
        serde_json::from_str(value).map_err(|error| {
            tracing::debug!("could not decode auth token: {error}");
            Error::Unauthorized
        })
    }
}
