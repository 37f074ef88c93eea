use derive_more::{Display, From, FromStr, Into};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime, PrimitiveDateTime};
use uuid::Uuid;

/// Identity-backend user identifier (UUID format).
///
/// Immutable, unique per account. The token record's primary key is always
/// this verified identity, never a value taken from a request body.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, FromStr, From, Into,
)]
#[serde(transparent)]
pub struct UserId(pub Uuid);

/// Provider tokens as forwarded by the relay and accepted by the endpoint.
///
/// All three fields are required and already validated: the relay only
/// builds one when both tokens are present, and the endpoint rejects any
/// body that cannot produce one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPayload {
    /// Provider-issued access token (opaque).
    pub access_token: String,
    /// Provider-issued refresh token (opaque).
    pub refresh_token: String,
    /// Token lifetime in seconds, as reported by the provider.
    pub expires_in: u64,
}

/// Persistent token record, one row per user.
///
/// Overwritten wholesale on every sign-in; no history, no partial updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    /// Primary key: the verified user's identifier.
    pub id: UserId,
    pub access_token: String,
    pub refresh_token: String,
    /// Absolute expiry, computed once at write time.
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

impl TokenRecord {
    /// Build a record from a validated payload, anchoring the expiry at `now`.
    ///
    /// Lifetimes that would push the expiry past the representable timestamp
    /// range saturate to the maximum timestamp instead of overflowing.
    #[must_use]
    pub fn from_payload(id: UserId, payload: TokenPayload, now: OffsetDateTime) -> Self {
        let lifetime = Duration::seconds(i64::try_from(payload.expires_in).unwrap_or(i64::MAX));
        let expires_at = now
            .checked_add(lifetime)
            .unwrap_or_else(|| PrimitiveDateTime::MAX.assume_utc());
        Self {
            id,
            access_token: payload.access_token,
            refresh_token: payload.refresh_token,
            expires_at,
        }
    }
}
