use serde::{Deserialize, Serialize};

use crate::types::{TokenPayload, UserId};

/// Auth-state notification kinds delivered by the identity backend.
///
/// Only [`SignedIn`](AuthEvent::SignedIn) marks a new interactive sign-in.
/// `InitialSession` (session restored on load) and `TokenRefreshed` also
/// carry a valid session but must never re-trigger the token relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum AuthEvent {
    InitialSession,
    SignedIn,
    SignedOut,
    TokenRefreshed,
    UserUpdated,
    PasswordRecovery,
}

/// The authenticated user as carried inside a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: UserId,
    #[serde(default)]
    pub email: Option<String>,
}

/// Ephemeral session issued by the identity backend.
///
/// Replaced on every auth-state change, discarded on sign-out. The crate
/// only reads it — ownership stays with the client-side session layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Local bearer credential proving the caller's identity to our own
    /// backend. Not the provider's token.
    pub access_token: String,
    /// Provider-issued access token, absent for non-OAuth sign-ins.
    #[serde(default)]
    pub provider_token: Option<String>,
    /// Provider-issued refresh token, absent for non-OAuth sign-ins.
    #[serde(default)]
    pub provider_refresh_token: Option<String>,
    /// Session lifetime in seconds.
    pub expires_in: u64,
    pub user: SessionUser,
}

impl Session {
    /// Provider tokens ready for relay, or `None` when the session has no
    /// provider linkage (plain email/password sign-in, restored session).
    #[must_use]
    pub fn provider_payload(&self) -> Option<TokenPayload> {
        let access_token = self.provider_token.as_deref().filter(|t| !t.is_empty())?;
        let refresh_token = self
            .provider_refresh_token
            .as_deref()
            .filter(|t| !t.is_empty())?;
        Some(TokenPayload {
            access_token: access_token.to_owned(),
            refresh_token: refresh_token.to_owned(),
            expires_in: self.expires_in,
        })
    }
}
