use serde::Deserialize;

use super::error::StoreError;
use crate::types::TokenPayload;

/// Incoming request body before field-presence validation.
///
/// Every field is optional at the wire level so that a missing field
/// surfaces as the endpoint's own `InvalidPayload` error rather than a
/// framework deserialization rejection.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTokenPayload {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

impl RawTokenPayload {
    /// Exhaustive field-presence check, performed before any state mutation.
    pub(super) fn validate(self) -> Result<TokenPayload, StoreError> {
        let access_token = self
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or(StoreError::InvalidPayload("missing or empty field: access_token"))?;
        let refresh_token = self
            .refresh_token
            .filter(|t| !t.is_empty())
            .ok_or(StoreError::InvalidPayload("missing or empty field: refresh_token"))?;
        let expires_in = self
            .expires_in
            .filter(|&secs| secs > 0)
            .ok_or(StoreError::InvalidPayload("missing or zero field: expires_in"))?;

        Ok(TokenPayload {
            access_token,
            refresh_token,
            expires_in,
        })
    }
}
