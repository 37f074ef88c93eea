use serde::Deserialize;
use url::Url;

use crate::error::{ensure_success, Error};
use crate::types::UserId;

/// The authenticated user resolved from a bearer credential.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[non_exhaustive]
pub struct AuthUser {
    pub id: UserId,
    #[serde(default)]
    pub email: Option<String>,
}

/// Client for the hosted identity backend's auth API.
///
/// Covers the three operations this crate consumes: resolving a bearer
/// credential to a user, building the hosted OAuth sign-in URL, and
/// signing out. Token exchange itself is delegated entirely to the backend.
///
/// ```rust,ignore
/// use tunelink::IdentityClient;
///
/// let client = IdentityClient::new("https://project.example.co".parse()?, anon_key);
/// let user = client.get_user(bearer).await?;
/// ```
pub struct IdentityClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: String,
}

impl IdentityClient {
    /// Create a client for the given backend with its public API key.
    #[must_use]
    pub fn new(base_url: Url, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            api_key: api_key.into(),
        }
    }

    /// Create a client from environment variables.
    ///
    /// # Required env vars
    /// - `AUTH_BACKEND_URL`: base URL of the identity backend
    /// - `AUTH_ANON_KEY`: public API key
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if either is missing or the URL is invalid.
    pub fn from_env() -> Result<Self, Error> {
        let base_url_str = std::env::var("AUTH_BACKEND_URL")
            .map_err(|_| Error::Config("AUTH_BACKEND_URL is required".into()))?;
        let base_url: Url = base_url_str
            .parse()
            .map_err(|e| Error::Config(format!("AUTH_BACKEND_URL: {e}")))?;
        let api_key = std::env::var("AUTH_ANON_KEY")
            .map_err(|_| Error::Config("AUTH_ANON_KEY is required".into()))?;
        Ok(Self::new(base_url, api_key))
    }

    /// Use a custom HTTP client (for connection pool reuse or testing).
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    /// Resolve a bearer credential to its user.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] on network failure, or [`Error::Api`] if the
    /// backend rejects the credential (missing, malformed, or expired).
    pub async fn get_user(&self, bearer: &str) -> Result<AuthUser, Error> {
        let url = self.endpoint("/auth/v1/user")?;
        let response = self
            .http
            .get(url)
            .header("apikey", &self.api_key)
            .bearer_auth(bearer)
            .send()
            .await?;

        let response = ensure_success(response, "user lookup").await?;
        response.json::<AuthUser>().await.map_err(Into::into)
    }

    /// Build the hosted OAuth sign-in URL for a streaming provider.
    ///
    /// The backend runs the whole OAuth dance; the resulting session carries
    /// the provider tokens this crate relays.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the base URL cannot take the auth path.
    pub fn authorize_url(
        &self,
        provider: &str,
        scopes: &[&str],
        redirect_to: Option<&Url>,
    ) -> Result<Url, Error> {
        let mut url = self.endpoint("/auth/v1/authorize")?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("provider", provider);
            if !scopes.is_empty() {
                pairs.append_pair("scopes", &scopes.join(" "));
            }
            if let Some(redirect_to) = redirect_to {
                pairs.append_pair("redirect_to", redirect_to.as_str());
            }
        }
        Ok(url)
    }

    /// Invalidate the caller's session on the backend.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] on network failure, or [`Error::Api`] if the
    /// backend refuses the sign-out.
    pub async fn sign_out(&self, bearer: &str) -> Result<(), Error> {
        let url = self.endpoint("/auth/v1/logout")?;
        let response = self
            .http
            .post(url)
            .header("apikey", &self.api_key)
            .bearer_auth(bearer)
            .send()
            .await?;

        ensure_success(response, "sign out").await?;
        Ok(())
    }

    fn endpoint(&self, path: &str) -> Result<Url, Error> {
        self.base_url
            .join(path)
            .map_err(|e| Error::Config(format!("invalid endpoint path {path}: {e}")))
    }
}
