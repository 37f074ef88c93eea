use std::sync::Arc;

use url::Url;

use crate::error::Error;
use crate::observer::{AuthEventFeed, AuthSubscription};
use crate::session::{AuthEvent, Session};

/// Forwards provider tokens from a fresh sign-in to the token store endpoint.
///
/// Fire-and-forget by design: when attached to a feed, a failed relay is
/// logged and swallowed so a transient backend error never breaks the
/// sign-in experience. There is no retry and no pending-relay persistence —
/// callers needing durability must build that on top of
/// [`relay`](TokenRelay::relay).
pub struct TokenRelay {
    http: reqwest::Client,
    endpoint: Url,
}

/// What a single relay attempt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayOutcome {
    /// The session carried no provider tokens; no request was made.
    Skipped,
    /// The endpoint accepted the tokens.
    Delivered,
}

impl TokenRelay {
    /// Create a relay posting to the given token store endpoint.
    #[must_use]
    pub fn new(endpoint: Url) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint,
        }
    }

    /// Use a custom HTTP client (for connection pool reuse or testing).
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    /// Send the session's provider tokens to the endpoint.
    ///
    /// A no-op returning [`RelayOutcome::Skipped`] when the session lacks a
    /// provider access or refresh token — no request is attempted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] on network failure, or [`Error::Api`] if the
    /// endpoint rejects the tokens.
    pub async fn relay(&self, session: &Session) -> Result<RelayOutcome, Error> {
        let Some(payload) = session.provider_payload() else {
            return Ok(RelayOutcome::Skipped);
        };

        let response = self
            .http
            .post(self.endpoint.clone())
            .bearer_auth(&session.access_token)
            .json(&payload)
            .send()
            .await?;

        crate::error::ensure_success(response, "token relay").await?;
        Ok(RelayOutcome::Delivered)
    }

    /// Subscribe the relay to an auth-state feed.
    ///
    /// Triggers only on [`AuthEvent::SignedIn`] — never on
    /// `TokenRefreshed` or `InitialSession`, even though both carry a valid
    /// session, to avoid re-submitting already-stored credentials.
    pub fn attach(self: Arc<Self>, feed: &AuthEventFeed) -> AuthSubscription {
        let relay = self;
        feed.subscribe(move |event, session| {
            let relay = Arc::clone(&relay);
            async move {
                if event != AuthEvent::SignedIn {
                    return;
                }
                let Some(session) = session else {
                    return;
                };
                match relay.relay(&session).await {
                    Ok(RelayOutcome::Delivered) => {
                        tracing::debug!(user_id = %session.user.id, "provider tokens relayed");
                    }
                    Ok(RelayOutcome::Skipped) => {
                        tracing::debug!("session has no provider tokens; relay skipped");
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "token relay failed; sign-in continues");
                    }
                }
            }
        })
    }
}
