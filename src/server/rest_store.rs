use url::Url;

use super::traits::TokenStore;
use crate::error::{ensure_success, Error};
use crate::types::TokenRecord;

const DEFAULT_TOKENS_TABLE: &str = "user_tokens";

/// Token store backed by the hosted backend's REST storage layer.
///
/// Authenticates with the service-role key, not the caller's credential:
/// the elevated client is the only writer, and the record key comes from
/// the verified identity upstream. The upsert is a single request with
/// merge-on-conflict semantics, resolved atomically on the primary key by
/// the storage layer itself.
pub struct RestTokenStore {
    http: reqwest::Client,
    endpoint: Url,
    service_key: String,
}

impl RestTokenStore {
    /// Create a store writing to `table` under the backend's REST API.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the table name does not form a valid URL.
    pub fn new(
        base_url: Url,
        service_key: impl Into<String>,
        table: &str,
    ) -> Result<Self, Error> {
        let endpoint = base_url
            .join(&format!("/rest/v1/{table}"))
            .map_err(|e| Error::Config(format!("invalid tokens table {table}: {e}")))?;
        Ok(Self {
            http: reqwest::Client::new(),
            endpoint,
            service_key: service_key.into(),
        })
    }

    /// Create a store from environment variables.
    ///
    /// # Required env vars
    /// - `AUTH_BACKEND_URL`: base URL of the identity backend
    /// - `AUTH_SERVICE_ROLE_KEY`: service-role key for elevated storage access
    ///
    /// # Optional env vars
    /// - `TOKENS_TABLE`: token table name (default `user_tokens`)
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a required var is missing or invalid.
    pub fn from_env() -> Result<Self, Error> {
        let base_url_str = std::env::var("AUTH_BACKEND_URL")
            .map_err(|_| Error::Config("AUTH_BACKEND_URL is required".into()))?;
        let base_url: Url = base_url_str
            .parse()
            .map_err(|e| Error::Config(format!("AUTH_BACKEND_URL: {e}")))?;
        let service_key = std::env::var("AUTH_SERVICE_ROLE_KEY")
            .map_err(|_| Error::Config("AUTH_SERVICE_ROLE_KEY is required".into()))?;
        let table =
            std::env::var("TOKENS_TABLE").unwrap_or_else(|_| DEFAULT_TOKENS_TABLE.into());
        Self::new(base_url, service_key, &table)
    }

    /// Use a custom HTTP client (for connection pool reuse or testing).
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }
}

impl TokenStore for RestTokenStore {
    async fn upsert(
        &self,
        record: &TokenRecord,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            // Insert-or-replace on the primary key, resolved by storage.
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&[record])
            .send()
            .await
            .map_err(Error::from)?;

        ensure_success(response, "token upsert").await?;
        Ok(())
    }
}
